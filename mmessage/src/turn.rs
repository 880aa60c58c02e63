//! Conversation turn types and validated construction.
//!
//! ```rust
//! use mmessage::{Role, Turn, TurnStatus};
//!
//! let call = Turn::tool_call("lookup_weather", mmessage::ArgumentMap::new());
//! assert_eq!(call.role, Role::Assistant);
//! assert_eq!(call.status, TurnStatus::ToolCallPending);
//!
//! let result = Turn::tool_result("lookup_weather", "22C, clear");
//! assert_eq!(result.role, Role::ToolResult);
//! ```

use serde_json::{Map, Value};

use crate::MessageError;

pub type ArgumentMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    ToolResult,
}

/// Completion status of a turn. `ToolCallPending` marks an assistant turn
/// that still needs a host function executed before the exchange can
/// continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Complete,
    Incomplete,
    LengthLimited,
    ToolCallPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }

    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: Option<String>,
    pub status: TurnStatus,
    pub tool_call_name: Option<String>,
    pub tool_call_arguments: Option<ArgumentMap>,
    pub index: u32,
    pub usage: Option<TokenUsage>,
}

impl Turn {
    /// General validated constructor. The convenience constructors below
    /// build only valid combinations and cannot fail.
    pub fn new(
        role: Role,
        content: Option<String>,
        tool_call_name: Option<String>,
        tool_call_arguments: Option<ArgumentMap>,
        status: TurnStatus,
    ) -> Result<Self, MessageError> {
        if tool_call_arguments.is_some() && tool_call_name.is_none() {
            return Err(MessageError::validation(
                "tool-call arguments require a tool-call name",
            ));
        }

        match role {
            Role::System | Role::User => {
                if tool_call_name.is_some() {
                    return Err(MessageError::validation(
                        "system and user turns may not carry a tool call",
                    ));
                }

                if content.is_none() {
                    return Err(MessageError::validation(
                        "system and user turns require content",
                    ));
                }

                if status == TurnStatus::ToolCallPending {
                    return Err(MessageError::validation(
                        "only assistant turns may be tool-call-pending",
                    ));
                }
            }
            Role::Assistant => {
                if status == TurnStatus::ToolCallPending && tool_call_name.is_none() {
                    return Err(MessageError::validation(
                        "a tool-call-pending turn requires a tool-call name",
                    ));
                }

                if tool_call_name.is_some() && status != TurnStatus::ToolCallPending {
                    return Err(MessageError::validation(
                        "an assistant turn carrying a tool call must be tool-call-pending",
                    ));
                }

                if content.is_none() && tool_call_name.is_none() {
                    return Err(MessageError::validation(
                        "an assistant turn requires content or a tool call",
                    ));
                }
            }
            Role::ToolResult => {
                if tool_call_name.is_none() {
                    return Err(MessageError::validation(
                        "a tool-result turn requires the originating call name",
                    ));
                }

                if tool_call_arguments.is_some() {
                    return Err(MessageError::validation(
                        "a tool-result turn may not carry call arguments",
                    ));
                }

                if content.is_none() {
                    return Err(MessageError::validation(
                        "a tool-result turn requires content",
                    ));
                }

                if status == TurnStatus::ToolCallPending {
                    return Err(MessageError::validation(
                        "only assistant turns may be tool-call-pending",
                    ));
                }
            }
        }

        // Pending calls always expose a parsed mapping, possibly empty.
        let tool_call_arguments = if status == TurnStatus::ToolCallPending {
            Some(tool_call_arguments.unwrap_or_default())
        } else {
            tool_call_arguments
        };

        Ok(Self {
            role,
            content,
            status,
            tool_call_name,
            tool_call_arguments,
            index: 0,
            usage: None,
        })
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// An assistant turn requesting execution of a host function.
    pub fn tool_call(name: impl Into<String>, arguments: ArgumentMap) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            status: TurnStatus::ToolCallPending,
            tool_call_name: Some(name.into()),
            tool_call_arguments: Some(arguments),
            index: 0,
            usage: None,
        }
    }

    /// The outcome of executing a host function, referencing the call it
    /// answers by name.
    pub fn tool_result(origin: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            role: Role::ToolResult,
            content: Some(output.into()),
            status: TurnStatus::Complete,
            tool_call_name: Some(origin.into()),
            tool_call_arguments: None,
            index: 0,
            usage: None,
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            status: TurnStatus::Complete,
            tool_call_name: None,
            tool_call_arguments: None,
            index: 0,
            usage: None,
        }
    }

    pub fn with_status(mut self, status: TurnStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn is_tool_call_pending(&self) -> bool {
        self.status == TurnStatus::ToolCallPending
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}
