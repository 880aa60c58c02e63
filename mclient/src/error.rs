//! Client error kinds and error value helpers.
//!
//! ```rust
//! use mclient::ClientError;
//!
//! let auth = ClientError::authentication("bad key");
//! assert!(!auth.retryable);
//!
//! let timeout = ClientError::timeout("temporary timeout");
//! assert!(timeout.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Unavailable, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Other, message, false)
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ClientError {}
