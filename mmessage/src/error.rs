//! Message-layer errors and classification.
//!
//! ```rust
//! use mmessage::{MessageError, MessageErrorKind};
//!
//! let err = MessageError::validation("tool-result turn requires an originating call name");
//! assert_eq!(err.kind, MessageErrorKind::Validation);
//! assert!(err.to_string().contains("originating call name"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageErrorKind {
    Validation,
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageError {
    pub kind: MessageErrorKind,
    pub message: String,
}

impl MessageError {
    pub fn new(kind: MessageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(MessageErrorKind::Validation, message)
    }

    pub fn merge(message: impl Into<String>) -> Self {
        Self::new(MessageErrorKind::Merge, message)
    }
}

impl Display for MessageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for MessageError {}
