//! Streamed turn fragments and fragment/turn conversion.
//!
//! A fragment is one increment of an eventual turn. Fragments sharing an
//! `index` belong to the same turn and concatenate in arrival order;
//! tool-call argument text is parsed as JSON exactly once, after the full
//! sequence has been observed.
//!
//! ```rust
//! use mmessage::{Fragment, Turn};
//!
//! let fragments = vec![
//!     Fragment::content(0, "hello"),
//!     Fragment::content(0, " world"),
//!     Fragment::completion(0),
//! ];
//!
//! let turn = Turn::from_fragments(&fragments).expect("fragments should merge");
//! assert_eq!(turn.content_str(), "hello world");
//! ```

use serde_json::Value;

use crate::{ArgumentMap, MessageError, Role, TokenUsage, Turn, TurnStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub index: u32,
    pub role: Option<Role>,
    pub content: Option<String>,
    pub tool_call_name: Option<String>,
    pub arguments_fragment: Option<String>,
    pub status: Option<TurnStatus>,
    pub usage: Option<TokenUsage>,
}

impl Fragment {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn content(index: u32, content: impl Into<String>) -> Self {
        Self::new(index).with_content(content)
    }

    pub fn tool_call(index: u32, name: impl Into<String>) -> Self {
        Self::new(index).with_tool_call_name(name)
    }

    pub fn arguments(index: u32, fragment: impl Into<String>) -> Self {
        Self::new(index).with_arguments_fragment(fragment)
    }

    /// A bare completion marker for the turn at `index`.
    pub fn completion(index: u32) -> Self {
        Self::new(index).with_status(TurnStatus::Complete)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tool_call_name(mut self, name: impl Into<String>) -> Self {
        self.tool_call_name = Some(name.into());
        self
    }

    pub fn with_arguments_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.arguments_fragment = Some(fragment.into());
        self
    }

    pub fn with_status(mut self, status: TurnStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

impl Turn {
    /// Reconstitutes a turn from its fragments.
    ///
    /// Content and argument text concatenate in arrival order. The role and
    /// call name are taken from their first announcement, status and usage
    /// from their last. A sequence that never announces a role is treated
    /// as assistant output, and one that never announces a status is
    /// incomplete unless it carries a call name.
    pub fn from_fragments(fragments: &[Fragment]) -> Result<Turn, MessageError> {
        let first = fragments
            .first()
            .ok_or_else(|| MessageError::merge("cannot merge an empty fragment sequence"))?;

        let index = first.index;
        if fragments.iter().any(|fragment| fragment.index != index) {
            return Err(MessageError::merge(format!(
                "fragment sequence for turn {index} mixes in other turn indexes",
            )));
        }

        let mut role = None;
        let mut content: Option<String> = None;
        let mut tool_call_name = None;
        let mut arguments_text: Option<String> = None;
        let mut status = None;
        let mut usage = None;

        for fragment in fragments {
            if role.is_none() {
                role = fragment.role;
            }

            if let Some(piece) = &fragment.content {
                content.get_or_insert_with(String::new).push_str(piece);
            }

            if tool_call_name.is_none() {
                tool_call_name = fragment.tool_call_name.clone();
            }

            if let Some(piece) = &fragment.arguments_fragment {
                arguments_text
                    .get_or_insert_with(String::new)
                    .push_str(piece);
            }

            if let Some(value) = fragment.status {
                status = Some(value);
            }

            if let Some(value) = fragment.usage {
                usage = Some(value);
            }
        }

        let role = role.unwrap_or(Role::Assistant);
        let arguments = arguments_text.map(parse_arguments).transpose()?;
        let status = status.unwrap_or({
            if role == Role::Assistant && tool_call_name.is_some() {
                TurnStatus::ToolCallPending
            } else {
                TurnStatus::Incomplete
            }
        });

        let mut turn = Turn::new(role, content, tool_call_name, arguments, status)
            .map_err(|err| {
                MessageError::merge(format!(
                    "merged fragments form an invalid turn: {}",
                    err.message
                ))
            })?
            .with_index(index);
        turn.usage = usage;
        Ok(turn)
    }

    /// Splits a turn into fragments of at most `granularity` characters of
    /// content or argument text per fragment. Inverse of
    /// [`Turn::from_fragments`] at any granularity.
    pub fn into_fragments(&self, granularity: usize) -> Vec<Fragment> {
        let granularity = granularity.max(1);
        let mut fragments = Vec::new();

        let mut opening = Fragment::new(self.index).with_role(self.role);
        if let Some(name) = &self.tool_call_name {
            opening = opening.with_tool_call_name(name.clone());
        }

        fragments.push(opening);

        if let Some(content) = &self.content {
            if content.is_empty() {
                fragments.push(Fragment::content(self.index, String::new()));
            } else {
                for chunk in chunk_chars(content, granularity) {
                    fragments.push(Fragment::content(self.index, chunk));
                }
            }
        }

        if let Some(arguments) = &self.tool_call_arguments {
            let text = Value::Object(arguments.clone()).to_string();
            for chunk in chunk_chars(&text, granularity) {
                fragments.push(Fragment::arguments(self.index, chunk));
            }
        }

        let mut closing = Fragment::new(self.index).with_status(self.status);
        if let Some(usage) = self.usage {
            closing = closing.with_usage(usage);
        }

        fragments.push(closing);
        fragments
    }
}

fn parse_arguments(text: String) -> Result<ArgumentMap, MessageError> {
    let value: Value = serde_json::from_str(&text).map_err(|err| {
        MessageError::merge(format!("tool-call arguments are not well-formed JSON: {err}"))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(MessageError::merge(format!(
            "tool-call arguments must be a JSON object, got {other}",
        ))),
    }
}

fn chunk_chars(text: &str, granularity: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == granularity {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
