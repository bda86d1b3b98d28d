//! Error types for shellpilot operations.
//!
//! [`PilotError`] covers the failure classes that need distinct handling:
//! configuration problems are fatal at startup, provider and parse failures
//! abort the current request only. Execution timeouts and non-zero exits are
//! not errors at all; they live on
//! [`ExecutionResult`](crate::executor::ExecutionResult).

use thiserror::Error;

/// Failure classes for a suggestion request.
#[derive(Debug, Error)]
pub enum PilotError {
    /// Missing or unusable provider credential. Fatal at startup (exit 1).
    #[error("configuration error: {0}")]
    Config(String),

    /// The language-model backend could not be reached or refused the
    /// request (network, auth, quota). Aborts the current request only.
    #[error("provider request failed: {0}")]
    Provider(String),

    /// The backend answered, but not with the structured suggestion format.
    /// Surfaced as-is; never retried or repaired.
    #[error("could not parse provider response: {0}")]
    ResponseParse(String),
}

/// Result alias for shellpilot operations.
pub type Result<T> = std::result::Result<T, PilotError>;

impl From<reqwest::Error> for PilotError {
    fn from(err: reqwest::Error) -> Self {
        PilotError::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_the_class() {
        let err = PilotError::Config("no API key set".to_string());
        assert_eq!(err.to_string(), "configuration error: no API key set");
    }

    #[test]
    fn parse_error_carries_detail() {
        let err = PilotError::ResponseParse("expected JSON object".to_string());
        assert!(err.to_string().contains("expected JSON object"));
    }
}
