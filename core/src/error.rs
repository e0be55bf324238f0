//! Error types for the AutoDNS client.
//!
//! # Design
//! Every failure is a variant of one `ApiError`, so callers can match a single
//! kind (`Authentication`, `NotFound`, `RateLimit`) or treat the whole enum as
//! "the request failed". Non-2xx statuses without a dedicated variant and
//! network failures both count as the generic kind; see
//! [`ApiError::is_generic`].

use thiserror::Error;

/// Errors returned by connection, collection and entity operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401.
    #[error("Invalid credentials")]
    Authentication,

    /// The server returned 404.
    #[error("Resource not found")]
    NotFound,

    /// The server returned 429. AutoDNS allows 3 requests per second.
    #[error("Rate limit exceeded (3 requests/second)")]
    RateLimit,

    /// Any other non-2xx status, carrying the server's message.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// A request body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A collection was used after its owning client was dropped.
    #[error("the owning client has been dropped")]
    ClientReleased,
}

impl ApiError {
    /// True for the generic error kind: unmapped statuses and network failures.
    pub fn is_generic(&self) -> bool {
        matches!(self, ApiError::Api { .. } | ApiError::Transport(_))
    }

    /// HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::RateLimit => Some(429),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_kinds_report_their_status() {
        assert_eq!(ApiError::Authentication.status(), Some(401));
        assert_eq!(ApiError::NotFound.status(), Some(404));
        assert_eq!(ApiError::RateLimit.status(), Some(429));
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
    }

    #[test]
    fn generic_kind_covers_unmapped_status_and_network() {
        let api = ApiError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(api.is_generic());
        assert!(ApiError::Transport("timeout".into()).is_generic());
        assert!(!ApiError::NotFound.is_generic());
        assert_eq!(api.to_string(), "API error (500): boom");
    }
}
