//! Host-supplied execution context for function invocations.
//!
//! The context is threaded verbatim to every executor and is never sent
//! to the model or mutated by the engine. It carries whatever identity
//! and authorization data host functions need.

use mcommon::{MetadataMap, TraceId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionContext {
    pub principal: Option<String>,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The acting identity, e.g. the current user.
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
