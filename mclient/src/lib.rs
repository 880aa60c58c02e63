//! Capability layer for talking to a model, buffered or streamed.
//!
//! The engine consumes this abstraction; it never implements a concrete
//! transport. A client yields either complete turns or a fragment stream
//! that the assembler normalizes into the same turn representation.

mod assemble;
mod canned;
mod client;
mod error;
mod model;
mod resilience;
mod stream;

pub use assemble::{AssembleError, AssembledReply, FragmentObserver, assemble};
pub use canned::{CannedClient, CannedReply};
pub use client::{ClientFuture, ModelClient};
pub use error::{ClientError, ClientErrorKind};
pub use model::{ClientReply, FunctionSpec};
pub use resilience::{
    ClientOperationHooks, NoopOperationHooks, RetryPolicy, RetryingClient, execute_with_retry,
};
pub use stream::{BoxedFragmentStream, FragmentStream, StreamEnd, StreamItem, VecFragmentStream};
