use std::future::Future;
use std::pin::Pin;

use mmessage::Turn;

use crate::{BoxedFragmentStream, ClientError, ClientReply, FunctionSpec};

pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The capability the orchestrator consumes. Implementations must
/// tolerate an empty `functions` slice and answer direct questions with
/// assistant turns.
///
/// `send` blocks until the full response is available; `open_stream`
/// yields the same response incrementally as fragments, normalized back
/// into turns by [`crate::assemble`].
pub trait ModelClient: Send + Sync {
    fn send<'a>(
        &'a self,
        transcript: &'a [Turn],
        functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<ClientReply, ClientError>>;

    fn open_stream<'a>(
        &'a self,
        transcript: &'a [Turn],
        functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<BoxedFragmentStream<'a>, ClientError>>;
}
