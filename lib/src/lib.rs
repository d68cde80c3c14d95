//! # TinyLib - Minimal Proof-of-Work Cryptocurrency Library
//!
//! Consensus machinery for a deliberately small UTXO cryptocurrency: hashing
//! and signatures, the difficulty schedule, transaction and block validation,
//! the chain with its fork-choice rule, the pending-transaction pool, an
//! in-process wallet and miner, and the three-message peer protocol codec.
//!
//! Everything is in-memory; a restarting node re-derives the genesis block
//! and rejoins the network empty-handed.

use uint::construct_uint;
construct_uint! {
    /// Unsigned 512-bit integer, wide enough to hold cumulative chain work
    /// (a sum of 2^difficulty terms with difficulty up to 256 bits).
    pub struct U512(8);
}

/// Block reward before collected fees.
pub const BASE_REWARD: u64 = 10;

/// Smallest amount an output may carry (anti-dust floor).
pub const MIN_OUTPUT_AMOUNT: u64 = 2;

/// Amount destroyed per transaction, on top of the one-unit fee per input.
pub const TX_BURN: u64 = 1;

/// Inter-block intervals below this raise the required difficulty by one bit.
pub const FAST_INTERVAL_SECS: u64 = 5;

/// Inter-block intervals above this lower the required difficulty by one bit.
pub const SLOW_INTERVAL_SECS: u64 = 20;

/// Required difficulty never leaves [0, MAX_DIFFICULTY] bits.
pub const MAX_DIFFICULTY: u32 = 256;

/// How far into the future a block timestamp may run ahead of our clock.
pub const MAX_TIME_DRIFT_SECS: u64 = 10;

/// Largest integer that survives a round trip through a JSON number (2^53 - 1).
/// Amounts, timestamps and nonces all stay within it.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

pub mod config;
pub mod crypto;
pub mod error;
pub mod miner;
pub mod network;
pub mod sha256;
pub mod util;
pub mod wallet;
pub mod work;

#[cfg(test)]
pub mod test_helpers;

#[path = "../types/mod.rs"]
pub mod types;
