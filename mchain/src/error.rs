//! Chain-level errors, run phases, and conversion helpers.
//!
//! ```rust
//! use mchain::{ChainError, ChainErrorKind};
//!
//! let err = ChainError::conversation("cannot run an empty conversation");
//! assert_eq!(err.kind, ChainErrorKind::Conversation);
//! assert!(err.to_string().contains("empty conversation"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use mclient::{AssembleError, ClientError};
use mmessage::{MessageError, MessageErrorKind};

/// The orchestration state a run was in when an event occurred. The run
/// loop itself is the state machine; this enum labels its transitions
/// for hooks and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    AwaitingSend,
    SentAwaitingResult,
    ToolCallPending,
    ToolExecuted,
    ResponseComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorKind {
    InvalidConfig,
    Validation,
    Merge,
    Client,
    Conversation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainErrorSource {
    Client(ClientError),
    Message(MessageError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
    pub phase: Option<ChainPhase>,
    pub source: Option<ChainErrorSource>,
}

impl ChainError {
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            source: None,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::InvalidConfig, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Validation, message)
    }

    pub fn merge(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Merge, message)
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Client, message)
    }

    pub fn conversation(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Conversation, message)
    }

    pub fn with_phase(mut self, phase: ChainPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_source(mut self, source: ChainErrorSource) -> Self {
        self.source = Some(source);
        self
    }
}

impl Display for ChainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{:?} [{:?}]: {}", self.kind, phase, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChainError {}

impl From<ClientError> for ChainError {
    fn from(value: ClientError) -> Self {
        ChainError::client(value.to_string()).with_source(ChainErrorSource::Client(value))
    }
}

impl From<MessageError> for ChainError {
    fn from(value: MessageError) -> Self {
        let kind = match value.kind {
            MessageErrorKind::Validation => ChainErrorKind::Validation,
            MessageErrorKind::Merge => ChainErrorKind::Merge,
        };

        ChainError::new(kind, value.to_string()).with_source(ChainErrorSource::Message(value))
    }
}

impl From<AssembleError> for ChainError {
    fn from(value: AssembleError) -> Self {
        match value {
            AssembleError::Client(client) => client.into(),
            AssembleError::Merge(merge) => merge.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_source() {
        let err: ChainError = ClientError::timeout("timed out").into();

        assert_eq!(err.kind, ChainErrorKind::Client);
        match err.source {
            Some(ChainErrorSource::Client(client)) => assert!(client.retryable),
            _ => panic!("expected a client source"),
        }
    }

    #[test]
    fn message_errors_map_kind_by_their_own_kind() {
        let merge: ChainError = MessageError::merge("bad stream").into();
        assert_eq!(merge.kind, ChainErrorKind::Merge);

        let validation: ChainError = MessageError::validation("bad turn").into();
        assert_eq!(validation.kind, ChainErrorKind::Validation);
    }

    #[test]
    fn phase_is_included_in_display_when_present() {
        let err = ChainError::client("boom").with_phase(ChainPhase::SentAwaitingResult);
        assert!(err.to_string().contains("SentAwaitingResult"));
    }
}
