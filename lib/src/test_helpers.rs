//! Shared helper functions for unit tests.

use crate::crypto::{PrivateKey, PublicKey};
use crate::sha256::Hash;
use crate::types::{Block, Blockchain, OutPoint, Transaction, TransactionInput, TransactionOutput};
use crate::BASE_REWARD;
use std::ops::Range;

/// An output paying `amount` to `key`.
pub fn output_to(key: &PublicKey, amount: u64) -> TransactionOutput {
    TransactionOutput {
        public_key: key.clone(),
        amount,
    }
}

/// A signed transaction spending `outpoints` (all owned by `key`) into
/// `outputs`.
pub fn signed_tx(
    key: &PrivateKey,
    outpoints: &[OutPoint],
    outputs: Vec<TransactionOutput>,
) -> Transaction {
    let hash = Transaction::signing_hash(outpoints, &outputs);
    let signature = key.sign(&hash);
    let inputs = outpoints
        .iter()
        .map(|outpoint| TransactionInput {
            hash: outpoint.hash.clone(),
            index: outpoint.index,
            signature: signature.clone(),
        })
        .collect();
    Transaction {
        inputs,
        outputs,
        hash,
    }
}

/// The outpoint of the genesis output.
pub fn genesis_outpoint(chain: &Blockchain) -> OutPoint {
    let tx = &chain.blocks()[0].txs[0];
    OutPoint {
        hash: tx.hash.clone(),
        index: 0,
    }
}

/// Assemble a block of `txs` plus a coinbase to `reward_to` on top of
/// `chain`, walking nonces until the hash difficulty lands in `difficulty`.
/// Narrow ranges let tests force forks of known relative weight.
pub fn mine_block(
    chain: &Blockchain,
    txs: Vec<Transaction>,
    time: u64,
    reward_to: &PublicKey,
    difficulty: Range<u32>,
) -> Block {
    let fees: u64 = txs.iter().map(|tx| tx.inputs.len() as u64).sum();
    let mut all = txs;
    all.push(Transaction::coinbase(
        time,
        reward_to.clone(),
        BASE_REWARD + fees,
    ));
    let mut block = Block {
        time,
        txs: all,
        nonce: 0,
        hash: Hash::zero(),
    };
    loop {
        block.hash = block.compute_hash(Some(&chain.tip().hash));
        if difficulty.contains(&block.hash.leading_zero_bits()) {
            return block;
        }
        block.nonce += 1;
    }
}
