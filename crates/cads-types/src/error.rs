use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}
