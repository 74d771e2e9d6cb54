//! Error types for backend access.

use std::fmt;

/// Failure of a single call against a [`DataSource`](crate::source::DataSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached (DNS, connection refused, timeout)
    Transport(String),
    /// The server answered with a status >= 400
    Http { status: u16, body: String },
    /// The body of a successful response could not be decoded
    Decode(String),
    /// A fetch-by-id found nothing
    NotFound(String),
    /// Only GET, POST, PUT and DELETE are supported
    UnsupportedMethod(String),
}

impl ApiError {
    /// `true` for failures where the server was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Connection error: {msg}"),
            ApiError::Http { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP error {status}")
                } else {
                    write!(f, "HTTP error {status}: {body}")
                }
            }
            ApiError::Decode(msg) => write!(f, "Decode error: {msg}"),
            ApiError::NotFound(what) => write!(f, "Not found: {what}"),
            ApiError::UnsupportedMethod(method) => {
                write!(f, "Unsupported HTTP method: {method}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
