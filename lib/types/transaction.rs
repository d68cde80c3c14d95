use crate::crypto::{PublicKey, Signature};
use crate::error::{CoinError, Result};
use crate::sha256::Hash;
use crate::{MAX_SAFE_INTEGER, MIN_OUTPUT_AMOUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where an input points: a confirmed output, addressed by the hash of the
/// transaction that created it and the position among its outputs.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TransactionInput {
    pub hash: Hash,
    pub index: u64,
    pub signature: Signature,
}

impl TransactionInput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            hash: self.hash.clone(),
            index: self.index,
        }
    }

    /// Shape checks: well-formed referenced hash, index 0 or 1 (outputs per
    /// transaction are capped at two), plausibly hex-encoded signature.
    pub fn check_structure(&self) -> Result<()> {
        if !self.hash.is_well_formed() {
            return Err(CoinError::invalid_transaction(
                "input hash is not 64 lowercase hex characters",
            ));
        }
        if self.index > 1 {
            return Err(CoinError::invalid_transaction("input index out of range"));
        }
        if !self.signature.is_well_formed() {
            return Err(CoinError::invalid_transaction(
                "input signature is not plausible DER hex",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionOutput {
    pub public_key: PublicKey,
    pub amount: u64,
}

impl TransactionOutput {
    /// The key must be a canonical compressed point and the amount must
    /// clear the dust floor while staying JSON-safe.
    pub fn check(&self) -> Result<()> {
        self.public_key.verifying_key()?;
        if self.amount < MIN_OUTPUT_AMOUNT {
            return Err(CoinError::invalid_transaction("output below the dust floor"));
        }
        if self.amount > MAX_SAFE_INTEGER {
            return Err(CoinError::invalid_transaction(
                "output amount outside the safe integer range",
            ));
        }
        Ok(())
    }
}

/// A transfer of confirmed outputs to fresh ones. The `hash` commits to the
/// signing view (inputs stripped of signatures, then outputs); it doubles as
/// the message every input signature covers.
///
/// A coinbase is the same shape with no inputs; the field disappears from
/// its serialized form entirely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub hash: Hash,
}

#[derive(Serialize)]
struct UnsignedInput<'a> {
    hash: &'a Hash,
    index: u64,
}

#[derive(Serialize)]
struct UnsignedTransaction<'a> {
    inputs: Vec<UnsignedInput<'a>>,
    outputs: &'a [TransactionOutput],
}

#[derive(Serialize)]
struct CoinbasePayload<'a> {
    outputs: &'a [TransactionOutput],
}

impl Transaction {
    /// Hash of the signing view. Field order follows declaration order, which
    /// is the serialization contract peers must agree on.
    pub fn signing_hash(outpoints: &[OutPoint], outputs: &[TransactionOutput]) -> Hash {
        let view = UnsignedTransaction {
            inputs: outpoints
                .iter()
                .map(|outpoint| UnsignedInput {
                    hash: &outpoint.hash,
                    index: outpoint.index,
                })
                .collect(),
            outputs,
        };
        let json = serde_json::to_string(&view).expect("BUG: in-memory serialization cannot fail");
        Hash::digest(&json)
    }

    /// Recompute this transaction's hash from its own content.
    pub fn compute_hash(&self) -> Hash {
        let outpoints: Vec<OutPoint> = self.inputs.iter().map(TransactionInput::outpoint).collect();
        Self::signing_hash(&outpoints, &self.outputs)
    }

    /// Coinbase identity: the block time, rendered as a decimal integer,
    /// prefixes the canonical serialization. Ties the coinbase to its block,
    /// so the same miner key never mints two identical outputs.
    pub fn coinbase_hash(time: u64, outputs: &[TransactionOutput]) -> Hash {
        let payload = CoinbasePayload { outputs };
        let json =
            serde_json::to_string(&payload).expect("BUG: in-memory serialization cannot fail");
        Hash::digest(&format!("{time}{json}"))
    }

    /// Build the coinbase for a block at `time` minting `amount` to `key`.
    pub fn coinbase(time: u64, key: PublicKey, amount: u64) -> Self {
        let outputs = vec![TransactionOutput {
            public_key: key,
            amount,
        }];
        let hash = Self::coinbase_hash(time, &outputs);
        Transaction {
            inputs: vec![],
            outputs,
            hash,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The set of confirmed, unspent outputs, keyed by (hash, index).
///
/// An ordered map keeps iteration deterministic, which both the wallet's
/// greedy coin selection and the control surface rely on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoSet {
    entries: BTreeMap<OutPoint, TransactionOutput>,
}

impl UtxoSet {
    pub fn new() -> Self {
        UtxoSet::default()
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.entries.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(outpoint)
    }

    pub fn insert(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        self.entries.insert(outpoint, output);
    }

    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        self.entries.remove(outpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TransactionOutput)> {
        self.entries.iter()
    }

    /// Total amount held by `key`.
    pub fn balance(&self, key: &PublicKey) -> u64 {
        self.entries
            .values()
            .filter(|output| &output.public_key == key)
            .map(|output| output.amount)
            .sum()
    }
}
