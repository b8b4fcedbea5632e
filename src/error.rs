//! Error types
//!
//! Every accessor call returns [`Error`]. Errors are never recovered locally;
//! they are classified with [`Error::kind`] for metric tagging and returned
//! to the caller as-is.

use std::fmt;
use std::time::Duration;

/// Result alias used by the accessor layer
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification of an [`Error`], used as the failure label of a metric
/// observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedVersion,
    NotFound,
    Conflict,
    DeadlineExceeded,
    Cancelled,
    Transient,
    Unknown,
}

impl ErrorKind {
    /// All kinds, in label order
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::InvalidArgument,
        ErrorKind::UnsupportedVersion,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::DeadlineExceeded,
        ErrorKind::Cancelled,
        ErrorKind::Transient,
        ErrorKind::Unknown,
    ];

    /// Metric label for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Transient => "transient",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Position in [`ErrorKind::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Classify an HTTP status code returned by the compute API
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::InvalidArgument,
            404 => ErrorKind::NotFound,
            409 | 412 => ErrorKind::Conflict,
            408 | 429 | 500 | 502 | 503 | 504 => ErrorKind::Transient,
            _ => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by resource accessors and their transports
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported API version: {0}")]
    UnsupportedVersion(String),

    #[error("call deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("call cancelled")]
    Cancelled,

    /// Error reported by the remote API
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        reason: Option<String>,
    },

    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode API response")]
    Decode(#[from] serde_json::Error),

    #[error("authentication failed")]
    Auth(#[source] anyhow::Error),
}

impl Error {
    /// Build a remote error without a reason
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
            reason: None,
        }
    }

    /// Shorthand for a remote 404
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::api(404, message)
    }

    /// Shorthand for a remote 409
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::api(409, message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Error::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Api { status, .. } => ErrorKind::from_status(*status),
            Error::Transport(err) => {
                if err.is_timeout() || err.is_connect() {
                    ErrorKind::Transient
                } else if let Some(status) = err.status() {
                    ErrorKind::from_status(status.as_u16())
                } else {
                    ErrorKind::Unknown
                }
            }
            Error::Decode(_) | Error::Auth(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Format an error for display to a user
/// Security: raw API messages are not echoed back, only a short summary.
pub fn format_error(error: &Error) -> String {
    match error.kind() {
        ErrorKind::NotFound => "Resource not found.".to_string(),
        ErrorKind::Conflict => {
            "Resource conflict. The resource may already exist or be in use.".to_string()
        }
        ErrorKind::Transient => "Compute API temporarily unavailable. Please try again.".to_string(),
        ErrorKind::DeadlineExceeded => "Request timed out.".to_string(),
        ErrorKind::Cancelled => "Request cancelled.".to_string(),
        ErrorKind::UnsupportedVersion | ErrorKind::InvalidArgument => error.to_string(),
        ErrorKind::Unknown => match error {
            Error::Api { status: 401, .. } | Error::Auth(_) => {
                "Authentication failed. Run 'gcloud auth application-default login'.".to_string()
            }
            Error::Api { status: 403, .. } => {
                "Permission denied. Check your GCP IAM permissions.".to_string()
            }
            _ => "Request failed. Check your network connection and try again.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(412), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Transient);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::Transient);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::InvalidArgument);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Unknown);
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_format_error_hides_api_message() {
        let err = Error::api(403, "projects/secret-project denied");
        let msg = format_error(&err);
        assert!(!msg.contains("secret-project"));
        assert!(msg.contains("Permission denied"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = Error::not_found("backendBuckets/missing");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
