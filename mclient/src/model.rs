//! Function advertisement and client reply types.
//!
//! ```rust
//! use mclient::FunctionSpec;
//!
//! let spec = FunctionSpec::new("lookup_weather", "Looks up current weather")
//!     .with_parameters_schema(r#"{"type":"object","properties":{"city":{"type":"string"}}}"#);
//!
//! assert_eq!(spec.name, "lookup_weather");
//! assert!(spec.parameters_schema.is_some());
//! ```

use mmessage::Turn;

/// What the model is told about one host function. The schema is
/// advisory; nothing in this workspace enforces it against arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: Option<String>,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
        }
    }

    pub fn with_parameters_schema(mut self, schema: impl Into<String>) -> Self {
        self.parameters_schema = Some(schema.into());
        self
    }
}

/// A successful model exchange: one turn normally, several when the model
/// requests parallel tool calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientReply {
    pub turns: Vec<Turn>,
}

impl ClientReply {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn of_turn(turn: Turn) -> Self {
        Self { turns: vec![turn] }
    }
}
