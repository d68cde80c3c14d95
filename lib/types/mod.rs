mod block;
mod blockchain;
mod pool;
mod transaction;

pub use block::Block;
pub use blockchain::{genesis_key, Blockchain, GENESIS_PHRASE};
pub use pool::Mempool;
pub use transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput, UtxoSet};

#[cfg(test)]
mod tests;
