//! Unified facade over the marionette workspace crates.
//!
//! This crate is designed to be the single dependency for most
//! applications. It re-exports the core marionette crates and provides
//! convenience utilities and macros for common setup and turn-building
//! flows.

mod macros;

pub mod prelude;
pub mod util;

pub use mchain;
pub use mclient;
pub use mcommon;
pub use mfunction;
pub use mmessage;
pub use mobserve;

pub use mchain::{
    Chain, ChainBuilder, ChainError, ChainErrorKind, ChainErrorSource, ChainHooks, ChainPhase,
    NoopChainHooks, RunOutcome, RunPolicy,
};
pub use mclient::{
    AssembleError, AssembledReply, BoxedFragmentStream, CannedClient, CannedReply, ClientError,
    ClientErrorKind, ClientFuture, ClientOperationHooks, ClientReply, FragmentObserver,
    FragmentStream, FunctionSpec, ModelClient, NoopOperationHooks, RetryPolicy, RetryingClient,
    StreamEnd, StreamItem, VecFragmentStream, assemble, execute_with_retry,
};
pub use mcommon::{BoxFuture, MetadataMap, Registry, TraceId};
pub use mfunction::{
    ClosureFunction, ExecutionContext, FunctionError, FunctionErrorKind, FunctionFuture,
    FunctionRegistry, HostFunction, optional_str, required_str, required_u64,
};
pub use mmessage::{
    ArgumentMap, Fragment, MessageError, MessageErrorKind, Role, TokenUsage, Turn, TurnStatus,
};
pub use mobserve::{
    MetricsObservabilityHooks, SafeChainHooks, SafeOperationHooks, TracingObservabilityHooks,
};

pub use util::{
    assistant_turn, canned_text_client, system_turn, tool_call_turn, tool_result_turn, user_turn,
};
