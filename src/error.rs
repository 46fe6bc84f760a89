// Report pipeline errors and their HTTP status mapping

use axum::http::StatusCode;
use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Missing or malformed request parameters.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Host, interface or instrumentation items do not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Queries succeeded but neither direction has samples in the window.
    #[error("no history data found for interface {interface} in the last {period_minutes} minutes")]
    NoData {
        interface: String,
        period_minutes: u32,
    },

    /// Metrics source call failed or timed out.
    #[error("metrics source error: {0}")]
    Upstream(#[from] SourceError),

    /// Chart or document generation failed.
    #[error("render error: {0}")]
    Render(String),
}

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoData { .. } => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ReportError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReportError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ReportError::NoData {
                interface: "eth0".into(),
                period_minutes: 15
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ReportError::Upstream(SourceError::Timeout { timeout_secs: 30 }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ReportError::Render("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
