//! Access oracle error types.

use thiserror::Error;

/// Errors raised while asking the lock contract for a balance.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("`{0}` is not a 0x-prefixed 20-byte hex address")]
    InvalidAddress(String),

    #[error("RPC transport error")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("cannot decode contract response: {0}")]
    Decode(String),

    #[error("RPC endpoint serves chain {actual}, lock lives on chain {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl AccessError {
    /// Short reason suitable for showing next to the gated article.
    pub fn reason(&self) -> String {
        match self {
            Self::Transport(err) if err.is_timeout() => "the membership check timed out".into(),
            Self::Transport(_) => "the membership contract could not be reached".into(),
            other => other.to_string(),
        }
    }
}
