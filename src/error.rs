use crate::TransactionId;
use thiserror::Error;

/// Failures of operations that are not validity checks.
/// Transaction validity itself is never reported through this type, a rejected
/// transaction is simply left out of the accepted set.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length for {what}: expected {expected} bytes but got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("input index {index} is out of range for a transaction with {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },

    #[error("failed to encode transaction data: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("transaction id mismatch: stated {stated} but content hashes to {computed}")]
    IdMismatch {
        stated: TransactionId,
        computed: TransactionId,
    },

    #[error("failed to decode epoch file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
