// Portal client error types
use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the session core and the API client.
///
/// `Unauthorized` is the only variant that has already mutated global session
/// state by the time the caller sees it; every other variant is local to the
/// screen that raised it.
#[derive(Error, Debug)]
pub enum PortalError {
    /// Login or OAuth redirect did not carry every session field.
    #[error("login information is incomplete (missing: {})", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    /// Backend rejected the bearer credential. The session has been cleared.
    #[error("session is no longer valid, please log in again")]
    Unauthorized,

    /// A protected operation was attempted without a session.
    #[error("not logged in")]
    Anonymous,

    /// Non-401 failure status from the backend.
    #[error("request failed with status {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Submission gating failed before any network call was made.
    #[error("invalid fields: {}", .fields.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation { fields: BTreeMap<String, String> },

    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl PortalError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        PortalError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn validation(fields: BTreeMap<String, String>) -> Self {
        PortalError::Validation { fields }
    }

    /// Machine-readable code, used by the CLI's JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::MissingCredentials { .. } => "MISSING_CREDENTIALS",
            PortalError::Unauthorized => "UNAUTHORIZED",
            PortalError::Anonymous => "NOT_LOGGED_IN",
            PortalError::Http { .. } => "HTTP_ERROR",
            PortalError::Network(_) => "NETWORK_ERROR",
            PortalError::Validation { .. } => "VALIDATION_ERROR",
            PortalError::Store(_) => "STORE_ERROR",
            PortalError::Decode(_) => "DECODE_ERROR",
            PortalError::Url(_) => "INVALID_URL",
        }
    }

    /// Whether the calling screen may offer a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            PortalError::Network(_) => true,
            PortalError::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session store lock poisoned")]
    Poisoned,
}

pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_lists_fields() {
        let err = PortalError::MissingCredentials {
            missing: vec!["id", "status"],
        };
        assert_eq!(
            err.to_string(),
            "login information is incomplete (missing: id, status)"
        );
        assert_eq!(err.error_code(), "MISSING_CREDENTIALS");
    }

    #[test]
    fn only_server_errors_are_retryable() {
        assert!(PortalError::http(StatusCode::BAD_GATEWAY, "down").is_retryable());
        assert!(!PortalError::http(StatusCode::NOT_FOUND, "gone").is_retryable());
        assert!(!PortalError::Unauthorized.is_retryable());
    }
}
