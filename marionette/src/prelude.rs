//! Common imports for most marionette applications.

pub use crate::{
    assistant_turn, canned_text_client, system_turn, tool_call_turn, tool_result_turn, user_turn,
};
pub use crate::{mar_turn, mar_turns};
pub use crate::{
    ArgumentMap, BoxFuture, CannedClient, CannedReply, Chain, ChainBuilder, ChainError,
    ChainErrorKind, ChainHooks, ChainPhase, ClientError, ClientReply, ClosureFunction,
    ExecutionContext, Fragment, FunctionError, FunctionRegistry, FunctionSpec, HostFunction,
    MessageError, ModelClient, NoopChainHooks, RetryPolicy, RetryingClient, Role, RunOutcome,
    RunPolicy, TokenUsage, TraceId, TracingObservabilityHooks, Turn, TurnStatus,
};
