use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoinError {
    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },
    #[error("invalid block: {reason}")]
    InvalidBlock { reason: String },
    #[error("invalid chain: {reason}")]
    InvalidChain { reason: String },
    #[error("invalid public key: {reason}")]
    InvalidPublicKey { reason: String },
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey { reason: String },
    #[error("invalid signature: signature verification failed")]
    InvalidSignature,
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
}

// Convenience methods for creating errors
impl CoinError {
    pub fn invalid_transaction<S: Into<String>>(reason: S) -> Self {
        CoinError::InvalidTransaction {
            reason: reason.into(),
        }
    }

    pub fn invalid_block<S: Into<String>>(reason: S) -> Self {
        CoinError::InvalidBlock {
            reason: reason.into(),
        }
    }

    pub fn invalid_chain<S: Into<String>>(reason: S) -> Self {
        CoinError::InvalidChain {
            reason: reason.into(),
        }
    }

    pub fn invalid_public_key<S: Into<String>>(reason: S) -> Self {
        CoinError::InvalidPublicKey {
            reason: reason.into(),
        }
    }

    pub fn invalid_private_key<S: Into<String>>(reason: S) -> Self {
        CoinError::InvalidPrivateKey {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoinError>;
