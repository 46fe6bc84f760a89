use thiserror::Error;

/// Failure talking to the metrics source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport error (connection refused, DNS failure, non-2xx status).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// JSON-RPC error object returned by the API.
    #[error("Zabbix API error {code}: {message} {data}")]
    Api {
        code: i64,
        message: String,
        data: String,
    },

    /// Response body did not match the expected shape; keeps the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// History was requested for an item whose value type has no numeric channel.
    #[error("Unsupported history value type: {0}")]
    UnsupportedValueType(u8),

    #[error("Missing API token")]
    MissingToken,
}

impl SourceError {
    /// Maps reqwest timeouts onto [`SourceError::Timeout`] so callers see one timeout variant.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if this is a transient error a caller might retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
