//! Function execution errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionErrorKind {
    DuplicateName,
    NotFound,
    InvalidArguments,
    Execution,
    Unauthorized,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionError {
    pub kind: FunctionErrorKind,
    pub message: String,
    pub retryable: bool,
    pub function_name: Option<String>,
}

impl FunctionError {
    pub fn new(kind: FunctionErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            function_name: None,
        }
    }

    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::DuplicateName, message, false)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::NotFound, message, false)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::InvalidArguments, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::Execution, message, false)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::Unauthorized, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::Other, message, false)
    }

    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            FunctionErrorKind::InvalidArguments
                | FunctionErrorKind::NotFound
                | FunctionErrorKind::Unauthorized
        )
    }
}

impl Display for FunctionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.function_name {
            Some(function_name) => write!(
                f,
                "{:?} [function={}]: {}",
                self.kind, function_name, self.message
            ),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for FunctionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_methods_report_retryable_and_user_error() {
        let execution = FunctionError::execution("exploded");
        assert!(!execution.is_retryable());
        assert!(!execution.is_user_error());

        let invalid = FunctionError::invalid_arguments("bad args");
        assert!(!invalid.is_retryable());
        assert!(invalid.is_user_error());
    }

    #[test]
    fn function_name_is_included_in_display() {
        let error = FunctionError::not_found("missing").with_function_name("lookup");

        let rendered = error.to_string();
        assert!(rendered.contains("lookup"));
        assert!(rendered.contains("missing"));
    }
}
