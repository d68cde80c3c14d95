use crate::crypto::PublicKey;
use crate::sha256::Hash;
use crate::types::{Block, Blockchain, Transaction};
use crate::util::now_secs;
use crate::work::block_difficulty;
use crate::{BASE_REWARD, MAX_SAFE_INTEGER};
use rand::Rng;

/// One mining attempt against the current tip and pool snapshot.
///
/// Builds the candidate (pool transactions in arrival order, coinbase last,
/// collecting one fee unit per input), draws a random nonce, and keeps the
/// block only when its hash clears the required difficulty. The caller
/// retries on a timer; every attempt re-reads the chain, so a block accepted
/// from a peer between attempts simply becomes the new parent.
pub fn attempt(
    chain: &Blockchain,
    pool_txs: &[Transaction],
    reward_to: &PublicKey,
) -> Option<Block> {
    let tip = chain.tip();
    // strictly later than the parent, even when mining faster than the clock
    let time = now_secs().max(tip.time + 1);

    let mut txs: Vec<Transaction> = pool_txs.to_vec();
    let fees: u64 = txs.iter().map(|tx| tx.inputs.len() as u64).sum();
    txs.push(Transaction::coinbase(
        time,
        reward_to.clone(),
        BASE_REWARD + fees,
    ));

    let nonce = rand::thread_rng().gen_range(0..=MAX_SAFE_INTEGER);
    let mut block = Block {
        time,
        txs,
        nonce,
        hash: Hash::zero(),
    };
    block.hash = block.compute_hash(Some(&tip.hash));

    if block_difficulty(&block) >= chain.next_difficulty() {
        Some(block)
    } else {
        None
    }
}
