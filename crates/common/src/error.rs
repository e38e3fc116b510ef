use thiserror::Error;

use crate::types::ProviderKind;

/// Failure modes of a single webhook delivery.
///
/// None of these escape a `send_*` call; they are logged and collapsed into
/// a `false` return at the notifier boundary.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP client unavailable: {0}")]
    ClientUnavailable(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} rejected the message (code {code:?}): {message}")]
    Provider {
        provider: ProviderKind,
        code: Option<i64>,
        message: String,
    },
}

pub type NotifyResult<T> = Result<T, NotifyError>;
