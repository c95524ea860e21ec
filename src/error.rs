//! Error taxonomy for the deposit pipeline.

use thiserror::Error;

/// Errors returned by every fallible step of a deposit run.
#[derive(Debug, Error)]
pub enum DepositError {
    /// Deposit file unreadable, unparsable, empty or with malformed fields.
    #[error("deposit data error: {0}")]
    Data(String),

    /// Node endpoint invalid or unreachable.
    #[error("connection error: {0}")]
    Connection(String),

    /// Nonce, gas price, chain id, receipt or transaction lookup failed.
    #[error("query error: {0}")]
    Query(String),

    /// ABI packing or transaction assembly failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Malformed private key or sender mismatch.
    #[error("key error: {0}")]
    Key(String),

    /// The node rejected the raw transaction.
    #[error("submission error: {0}")]
    Submission(String),

    /// The read-only replay of a reverted transaction failed to execute.
    #[error("revert diagnosis error: {0}")]
    RevertDiagnosis(String),

    /// Invalid runtime parameters.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DepositError {
    fn from(e: serde_json::Error) -> Self {
        DepositError::Data(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DepositError>;
