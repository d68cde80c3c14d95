use super::{OutPoint, Transaction, UtxoSet};
use crate::error::{CoinError, Result};
use crate::sha256::Hash;
use crate::{BASE_REWARD, TX_BURN};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One block: a timestamp, an ordered transaction list whose final element
/// is the coinbase, and the nonce the miner searched for. The hash covers
/// the previous block's hash concatenated with the canonical serialization
/// of the other three fields.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub time: u64,
    pub txs: Vec<Transaction>,
    pub nonce: u64,
    pub hash: Hash,
}

#[derive(Serialize)]
struct BlockPayload<'a> {
    time: u64,
    txs: &'a [Transaction],
    nonce: u64,
}

impl Block {
    /// A fresh building block, before any transaction or nonce.
    pub fn empty(time: u64) -> Self {
        Block {
            time,
            txs: vec![],
            nonce: 0,
            hash: Hash::zero(),
        }
    }

    /// Hash over `prev_hash` (absent only for genesis) concatenated with the
    /// canonical serialization, the hash field itself omitted.
    pub fn compute_hash(&self, prev_hash: Option<&Hash>) -> Hash {
        let payload = BlockPayload {
            time: self.time,
            txs: &self.txs,
            nonce: self.nonce,
        };
        let json =
            serde_json::to_string(&payload).expect("BUG: in-memory serialization cannot fail");
        match prev_hash {
            Some(prev) => Hash::digest(&format!("{prev}{json}")),
            None => Hash::digest(&json),
        }
    }

    /// Validate a user transaction against `utxos`; on success append it to
    /// this block, consume its inputs from `utxos` and add its outputs as
    /// fresh entries. Any failure leaves block and UTXO set untouched.
    pub fn push_tx(&mut self, tx: Transaction, utxos: &mut UtxoSet) -> Result<()> {
        if tx.inputs.is_empty() {
            return Err(CoinError::invalid_transaction("no inputs"));
        }
        if tx.outputs.is_empty() || tx.outputs.len() > 2 {
            return Err(CoinError::invalid_transaction("output count must be 1 or 2"));
        }
        for input in &tx.inputs {
            input.check_structure()?;
        }

        // every input must reference a distinct live UTXO
        let mut claimed: HashSet<OutPoint> = HashSet::new();
        let mut total_in: u64 = 0;
        for input in &tx.inputs {
            let outpoint = input.outpoint();
            let Some(spent) = utxos.get(&outpoint) else {
                return Err(CoinError::invalid_transaction(
                    "input references no unspent output",
                ));
            };
            total_in = total_in
                .checked_add(spent.amount)
                .ok_or_else(|| CoinError::invalid_transaction("input amounts overflow"))?;
            if !claimed.insert(outpoint) {
                return Err(CoinError::invalid_transaction(
                    "output spent twice in one transaction",
                ));
            }
        }

        let mut total_out: u64 = 0;
        for output in &tx.outputs {
            output.check()?;
            // bounded by two JSON-safe amounts, cannot overflow u64
            total_out += output.amount;
        }

        // one unit burned per transaction plus one unit of fee per input
        let fees = tx.inputs.len() as u64 + TX_BURN;
        if total_in != total_out + fees {
            return Err(CoinError::invalid_transaction(
                "input and output amounts do not balance",
            ));
        }

        if tx.compute_hash() != tx.hash {
            return Err(CoinError::invalid_transaction("hash does not match content"));
        }

        for input in &tx.inputs {
            let owner = &utxos
                .get(&input.outpoint())
                .expect("BUG: presence checked above")
                .public_key;
            if !input.signature.verify(&tx.hash, owner) {
                return Err(CoinError::InvalidSignature);
            }
        }

        // commit
        for input in &tx.inputs {
            utxos.remove(&input.outpoint());
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            utxos.insert(
                OutPoint {
                    hash: tx.hash.clone(),
                    index: index as u64,
                },
                output.clone(),
            );
        }
        self.txs.push(tx);
        Ok(())
    }

    /// Validate and append the block's single coinbase. Must come after all
    /// user transactions: the reward collects their per-input fees.
    pub fn push_coinbase(&mut self, tx: Transaction, utxos: &mut UtxoSet) -> Result<()> {
        if !tx.inputs.is_empty() {
            return Err(CoinError::invalid_transaction("coinbase cannot spend inputs"));
        }
        if tx.outputs.len() != 1 {
            return Err(CoinError::invalid_transaction(
                "coinbase must have exactly one output",
            ));
        }
        let output = &tx.outputs[0];
        output.check()?;

        let fees: u64 = self.txs.iter().map(|t| t.inputs.len() as u64).sum();
        if output.amount != BASE_REWARD + fees {
            return Err(CoinError::invalid_transaction(
                "coinbase amount does not match reward plus fees",
            ));
        }

        if Transaction::coinbase_hash(self.time, &tx.outputs) != tx.hash {
            return Err(CoinError::invalid_transaction(
                "coinbase hash does not match content",
            ));
        }

        utxos.insert(
            OutPoint {
                hash: tx.hash.clone(),
                index: 0,
            },
            output.clone(),
        );
        self.txs.push(tx);
        Ok(())
    }
}
