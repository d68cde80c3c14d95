use super::{Block, OutPoint, Transaction, UtxoSet};
use crate::crypto::PrivateKey;
use crate::error::{CoinError, Result};
use crate::sha256::Hash;
use crate::util::now_secs;
use crate::work::{block_difficulty, chain_work, next_difficulty};
use crate::{BASE_REWARD, MAX_SAFE_INTEGER, MAX_TIME_DRIFT_SECS, U512};
use std::cmp::Ordering;
use tracing::debug;

/// The phrase whose SHA-256 is the genesis private key. Every node derives
/// the same genesis block from it, so no chain data ever needs shipping.
pub const GENESIS_PHRASE: &str = "Those who have not learned history are doomed to repeat it.";

/// The well-known keypair that owns the genesis output.
pub fn genesis_key() -> PrivateKey {
    PrivateKey::from_phrase(GENESIS_PHRASE).expect("BUG: genesis phrase derives a valid scalar")
}

/// Builds the fixed genesis block: time 0, nonce 0, a single coinbase
/// minting the base reward to the genesis key. Its hash takes no
/// previous-hash prefix; there is nothing before it.
fn genesis_block() -> Block {
    let coinbase = Transaction::coinbase(0, genesis_key().public_key(), BASE_REWARD);
    let mut block = Block {
        time: 0,
        txs: vec![coinbase],
        nonce: 0,
        hash: Hash::zero(),
    };
    block.hash = block.compute_hash(None);
    block
}

/// The authoritative chain and the UTXO set it implies. The two are owned
/// together and only ever change together: `add_block` commits both or
/// neither, and `try_swap` replaces both or neither.
#[derive(Clone, Debug)]
pub struct Blockchain {
    blocks: Vec<Block>,
    utxos: UtxoSet,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// A chain holding only the deterministic genesis block.
    pub fn new() -> Self {
        let genesis = genesis_block();
        let mut utxos = UtxoSet::new();
        let tx = &genesis.txs[0];
        utxos.insert(
            OutPoint {
                hash: tx.hash.clone(),
                index: 0,
            },
            tx.outputs[0].clone(),
        );
        Blockchain {
            blocks: vec![genesis],
            utxos,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn utxos(&self) -> &UtxoSet {
        &self.utxos
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("BUG: chain always holds genesis")
    }

    pub fn block_height(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Required difficulty for whichever block extends the chain next.
    pub fn next_difficulty(&self) -> u32 {
        next_difficulty(&self.blocks)
    }

    /// Cumulative proof-of-work over all blocks.
    pub fn work(&self) -> U512 {
        chain_work(&self.blocks)
    }

    /// Timestamp gaps between consecutive blocks, oldest first.
    pub fn intervals(&self) -> Vec<u64> {
        self.blocks
            .windows(2)
            .map(|pair| pair[1].time.saturating_sub(pair[0].time))
            .collect()
    }

    /// Validate `block` as the next block and append it, replacing the UTXO
    /// set with the post-block state. Rejection leaves everything unchanged.
    pub fn add_block(&mut self, block: Block) -> Result<()> {
        if block.txs.is_empty() {
            return Err(CoinError::invalid_block("no transactions"));
        }
        if !block.hash.is_well_formed() {
            return Err(CoinError::invalid_block(
                "hash is not 64 lowercase hex characters",
            ));
        }
        if block.time > MAX_SAFE_INTEGER || block.nonce > MAX_SAFE_INTEGER {
            return Err(CoinError::invalid_block(
                "time or nonce outside the safe integer range",
            ));
        }

        // timestamps strictly advance and may not outrun our clock by much
        if block.time <= self.tip().time {
            return Err(CoinError::invalid_block("timestamp does not advance the chain"));
        }
        if block.time > now_secs() + MAX_TIME_DRIFT_SECS {
            return Err(CoinError::invalid_block("timestamp too far in the future"));
        }

        // replay every transaction into a fresh block against a working copy
        // of the UTXO set; nothing is committed until the whole block holds up
        let mut working = self.utxos.clone();
        let mut validated = Block::empty(block.time);
        let (coinbase, user_txs) = block
            .txs
            .split_last()
            .expect("BUG: emptiness checked above");
        for tx in user_txs {
            validated.push_tx(tx.clone(), &mut working)?;
        }
        validated.push_coinbase(coinbase.clone(), &mut working)?;

        validated.nonce = block.nonce;
        let expected = validated.compute_hash(Some(&self.tip().hash));
        if expected != block.hash {
            return Err(CoinError::invalid_block("hash does not match content"));
        }
        validated.hash = expected;

        if block_difficulty(&validated) < self.next_difficulty() {
            return Err(CoinError::invalid_block("insufficient difficulty"));
        }

        self.blocks.push(validated);
        self.utxos = working;
        debug!(
            "block {} appended at height {}",
            self.tip().hash,
            self.block_height()
        );
        Ok(())
    }

    /// Rebuild `candidate` from genesis and adopt it iff its cumulative work
    /// strictly exceeds ours. Returns how the candidate's work compares to
    /// the current chain; equal-work candidates are never adopted, so two
    /// nodes cannot flap between tied forks.
    pub fn try_swap(&mut self, candidate: Vec<Block>) -> Result<Ordering> {
        let mut rebuilt = Blockchain::new();
        for block in candidate.into_iter().skip(1) {
            rebuilt
                .add_block(block)
                .map_err(|e| CoinError::invalid_chain(e.to_string()))?;
        }
        let ordering = rebuilt.work().cmp(&self.work());
        if ordering == Ordering::Greater {
            debug!(
                "swapping to a heavier chain of {} blocks",
                rebuilt.block_height()
            );
            *self = rebuilt;
        }
        Ok(ordering)
    }
}
