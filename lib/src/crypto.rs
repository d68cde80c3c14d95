use crate::error::{CoinError, Result};
use crate::sha256::Hash;
use ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compressed SEC1 points are 33 bytes: 66 hex characters.
pub const PUBLIC_KEY_HEX_LEN: usize = 66;

/// DER signatures vary in length; the wire accepts 20 to 144 hex characters.
pub const MIN_SIGNATURE_HEX_LEN: usize = 20;
pub const MAX_SIGNATURE_HEX_LEN: usize = 144;

#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    pub fn new_key() -> Self {
        PrivateKey(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Deterministic key whose scalar is the SHA-256 of `phrase`.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let digest = ::sha256::digest(phrase);
        let bytes = hex::decode(digest).expect("BUG: digest is valid hex");
        SigningKey::from_slice(&bytes)
            .map(PrivateKey)
            .map_err(|_| CoinError::invalid_private_key("phrase digest is not a valid scalar"))
    }

    pub fn public_key(&self) -> PublicKey {
        let point = self.0.verifying_key().to_encoded_point(true);
        PublicKey(hex::encode(point.as_bytes()))
    }

    /// ECDSA over the UTF-8 bytes of the hash's hex form, DER-encoded.
    pub fn sign(&self, message: &Hash) -> Signature {
        let signature: EcdsaSignature = self.0.sign(message.as_str().as_bytes());
        Signature(hex::encode(signature.to_der().as_bytes()))
    }
}

/// A compressed secp256k1 public key as it travels on the wire: 66 hex
/// characters. Kept as text; point validity is checked where validation
/// demands it, so a malformed key fails the transaction, not the parse.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse, requiring the canonical compressed encoding.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        if self.0.len() != PUBLIC_KEY_HEX_LEN {
            return Err(CoinError::invalid_public_key(
                "must be 66 hex characters of a compressed point",
            ));
        }
        let bytes = hex::decode(&self.0)
            .map_err(|_| CoinError::invalid_public_key("not valid hex"))?;
        if !matches!(bytes.first(), Some(0x02 | 0x03)) {
            return Err(CoinError::invalid_public_key("not a compressed point"));
        }
        VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|_| CoinError::invalid_public_key("not a point on the curve"))
    }
}

impl FromStr for PublicKey {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self> {
        let key = PublicKey(s.to_string());
        key.verifying_key()?;
        Ok(key)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DER-encoded ECDSA signature as hex text.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Length and character-set check; DER structure is left to `verify`.
    pub fn is_well_formed(&self) -> bool {
        (MIN_SIGNATURE_HEX_LEN..=MAX_SIGNATURE_HEX_LEN).contains(&self.0.len())
            && self
                .0
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Check this signature over `message` against `key`.
    pub fn verify(&self, message: &Hash, key: &PublicKey) -> bool {
        let Ok(verifying_key) = key.verifying_key() else {
            return false;
        };
        let Ok(der) = hex::decode(&self.0) else {
            return false;
        };
        let Ok(signature) = EcdsaSignature::from_der(&der) else {
            return false;
        };
        verifying_key
            .verify(message.as_str().as_bytes(), &signature)
            .is_ok()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
