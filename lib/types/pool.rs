use super::{Block, OutPoint, Transaction, UtxoSet};
use crate::error::Result;
use std::collections::HashSet;
use tracing::debug;

/// Validated transactions waiting for a block, plus the outpoints they
/// claim. First accepted wins: a later transaction claiming the same
/// outpoint is refused without ceremony, and nothing is reordered.
#[derive(Clone, Debug, Default)]
pub struct Mempool {
    txs: Vec<Transaction>,
    used: HashSet<OutPoint>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool::default()
    }

    pub fn txs(&self) -> &[Transaction] {
        &self.txs
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Admit `tx` if it validates against the confirmed set and claims no
    /// outpoint a pool member already holds. `Ok(false)` is the silent
    /// duplicate-claim rejection; validation problems surface as errors.
    ///
    /// The dry run goes through a scratch block and a copy of the UTXO set,
    /// so the confirmed state is never touched. A transaction spending
    /// another pool member's change fails here by design: the parent's
    /// outputs do not exist until a block confirms them.
    pub fn add_tx(&mut self, tx: Transaction, utxos: &UtxoSet) -> Result<bool> {
        let mut scratch = utxos.clone();
        let mut staging = Block::empty(0);
        staging.push_tx(tx.clone(), &mut scratch)?;

        if tx
            .inputs
            .iter()
            .any(|input| self.used.contains(&input.outpoint()))
        {
            debug!(
                "transaction {} claims an outpoint already in the pool",
                tx.hash
            );
            return Ok(false);
        }
        self.used
            .extend(tx.inputs.iter().map(|input| input.outpoint()));
        self.txs.push(tx);
        Ok(true)
    }

    /// Index of the pool member spending `outpoint`, if any.
    pub fn find_tx_index(&self, outpoint: &OutPoint) -> Option<usize> {
        self.txs.iter().position(|tx| {
            tx.inputs
                .iter()
                .any(|input| &input.outpoint() == outpoint)
        })
    }

    /// Evict every pool member that conflicts with a freshly confirmed
    /// block and release all claims the evicted members held. Pool members
    /// untouched by the block stay queued.
    pub fn remove_block_txs(&mut self, block: &Block) {
        for tx in block.txs.iter().filter(|tx| !tx.is_coinbase()) {
            for input in &tx.inputs {
                if let Some(index) = self.find_tx_index(&input.outpoint()) {
                    let evicted = self.txs.remove(index);
                    for claim in &evicted.inputs {
                        self.used.remove(&claim.outpoint());
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.txs.clear();
        self.used.clear();
    }
}
