//! Conversation chain orchestration over a model client and a function
//! registry.
//!
//! A chain owns the transcript, drives the request/response/function
//! loop, and normalizes buffered and streamed replies into the same turn
//! representation before appending them to history.

mod chain;
mod error;
mod hooks;
mod types;

pub mod prelude {
    pub use crate::{
        Chain, ChainBuilder, ChainError, ChainErrorKind, ChainErrorSource, ChainHooks, ChainPhase,
        NoopChainHooks, RunOutcome, RunPolicy,
    };
    pub use mclient::{
        CannedClient, CannedReply, ClientError, ClientReply, FunctionSpec, ModelClient,
    };
    pub use mcommon::{MetadataMap, TraceId};
    pub use mfunction::{ExecutionContext, FunctionError, FunctionRegistry};
    pub use mmessage::{Fragment, Role, TokenUsage, Turn, TurnStatus};
}

pub use chain::{Chain, ChainBuilder};
pub use error::{ChainError, ChainErrorKind, ChainErrorSource, ChainPhase};
pub use hooks::{ChainHooks, NoopChainHooks};
pub use mcommon::{MetadataMap, TraceId};
pub use types::{RunOutcome, RunPolicy};
