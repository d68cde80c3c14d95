use serde::{Deserialize, Serialize};
use std::fmt;

/// A SHA-256 digest in the only form this chain ever handles one: 64
/// lowercase hexadecimal characters. Hashed payloads, wire messages and the
/// proof-of-work check all operate on this textual encoding.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(transparent)]
pub struct Hash(String);

impl Hash {
    /// SHA-256 over the UTF-8 bytes of `payload`.
    pub fn digest(payload: &str) -> Self {
        Hash(::sha256::digest(payload))
    }

    /// The all-zero placeholder hash.
    pub fn zero() -> Self {
        Hash("0".repeat(64))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True iff the value matches `^[0-9a-f]{64}$`.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 64
            && self
                .0
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Number of leading zero bits in the hex-to-binary expansion.
    pub fn leading_zero_bits(&self) -> u32 {
        let mut bits = 0;
        for c in self.0.chars() {
            match c.to_digit(16) {
                Some(0) => bits += 4,
                Some(d) => return bits + d.leading_zeros() - 28,
                None => return bits,
            }
        }
        bits
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
