use crate::crypto::{PrivateKey, PublicKey};
use crate::error::{CoinError, Result};
use crate::types::{OutPoint, Transaction, TransactionInput, TransactionOutput, UtxoSet};
use crate::{MIN_OUTPUT_AMOUNT, TX_BURN};

/// One keypair, held for the life of the process.
pub struct Wallet {
    key: PrivateKey,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl Wallet {
    pub fn new() -> Self {
        Wallet {
            key: PrivateKey::new_key(),
        }
    }

    pub fn from_key(key: PrivateKey) -> Self {
        Wallet { key }
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Total confirmed amount this wallet controls.
    pub fn balance(&self, utxos: &UtxoSet) -> u64 {
        utxos.balance(&self.public_key())
    }

    /// Build and sign a transaction paying `amount` to `recipient`.
    ///
    /// Greedy selection over our confirmed outputs until they cover the
    /// amount, the burn, and one fee unit per selected input. Leftover value
    /// returns as a change output when it clears the dust floor; a leftover
    /// of exactly one unit can satisfy neither the dust floor nor the
    /// balance equation, so selection keeps pulling inputs past it.
    pub fn make_tx(
        &self,
        amount: u64,
        recipient: &PublicKey,
        utxos: &UtxoSet,
    ) -> Result<Transaction> {
        if amount <= MIN_OUTPUT_AMOUNT {
            return Err(CoinError::invalid_transaction(
                "amount must exceed the dust floor",
            ));
        }

        let own = self.public_key();
        let mut mine = utxos.iter().filter(|(_, output)| output.public_key == own);
        let mut selected: Vec<OutPoint> = vec![];
        let mut total: u64 = 0;
        loop {
            let needed = amount + TX_BURN + selected.len() as u64;
            if total >= needed && total - needed != 1 {
                break;
            }
            match mine.next() {
                Some((outpoint, output)) => {
                    selected.push(outpoint.clone());
                    total += output.amount;
                }
                None => {
                    return Err(CoinError::InsufficientFunds {
                        needed,
                        available: total,
                    })
                }
            }
        }

        let change = total - (amount + TX_BURN + selected.len() as u64);
        let mut outputs = vec![TransactionOutput {
            public_key: recipient.clone(),
            amount,
        }];
        if change > 1 {
            outputs.push(TransactionOutput {
                public_key: own,
                amount: change,
            });
        }

        let hash = Transaction::signing_hash(&selected, &outputs);
        let signature = self.key.sign(&hash);
        let inputs = selected
            .into_iter()
            .map(|outpoint| TransactionInput {
                hash: outpoint.hash,
                index: outpoint.index,
                signature: signature.clone(),
            })
            .collect();

        Ok(Transaction {
            inputs,
            outputs,
            hash,
        })
    }
}
