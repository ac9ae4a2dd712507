use std::time::Duration;

use thiserror::Error;

/// Unified error type for the swap engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("stale result from generation {generation} (latest is {latest})")]
    StaleResult { generation: u64, latest: u64 },

    #[error("cannot swap: {0}")]
    Precondition(String),

    #[error("signature rejected: {0}")]
    SignerRejected(String),

    #[error("wallet error: {0}")]
    Signer(String),

    #[error("transaction {hash} reverted")]
    Reverted { hash: String },

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("swap abandoned before completion")]
    Abandoned,

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Errors reported by the aggregator gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors reported by the wallet signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

impl From<SignerError> for Error {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Rejected(reason) => Error::SignerRejected(reason),
            other => Error::Signer(other.to_string()),
        }
    }
}

impl Error {
    /// Whether this error should be written to `last_error`.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Error::StaleResult { .. })
    }
}
