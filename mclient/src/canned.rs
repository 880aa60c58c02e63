//! Scripted client for tests and demos.
//!
//! A `CannedClient` substitutes a pre-supplied reply for each model call,
//! bypassing any real network or inference work, while still driving the
//! fragment path so downstream logic observes the same side effects as a
//! live call. Substitution is chain-scoped: hand the chain a canned
//! client instead of a live one.
//!
//! ```rust
//! use mclient::{CannedClient, CannedReply};
//! use mmessage::Turn;
//!
//! let client = CannedClient::new(vec![
//!     CannedReply::buffered(vec![Turn::assistant("canned answer")]),
//! ]);
//! assert_eq!(client.remaining(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use mmessage::Turn;

use crate::{
    BoxedFragmentStream, ClientError, ClientFuture, ClientReply, FunctionSpec, ModelClient,
    StreamEnd, StreamItem, VecFragmentStream, assemble,
};

const SPLIT_GRANULARITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
enum Script {
    Buffered(Vec<Turn>),
    Streamed(Vec<Result<StreamItem, ClientError>>),
    Error(ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CannedReply {
    script: Script,
}

impl CannedReply {
    /// A complete reply, delivered whole on the buffered path and split
    /// into fragments on the streaming path.
    pub fn buffered(turns: Vec<Turn>) -> Self {
        Self {
            script: Script::Buffered(turns),
        }
    }

    /// An explicit fragment script, assembled back into turns on the
    /// buffered path.
    pub fn streamed(items: Vec<StreamItem>) -> Self {
        Self::streamed_results(items.into_iter().map(Ok).collect())
    }

    /// A fragment script that may fail mid-stream.
    pub fn streamed_results(items: Vec<Result<StreamItem, ClientError>>) -> Self {
        Self {
            script: Script::Streamed(items),
        }
    }

    pub fn error(error: ClientError) -> Self {
        Self {
            script: Script::Error(error),
        }
    }
}

pub struct CannedClient {
    replies: Mutex<VecDeque<CannedReply>>,
}

impl CannedClient {
    pub fn new(replies: Vec<CannedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn push(&self, reply: CannedReply) {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(reply);
        }
    }

    fn pop(&self) -> Result<CannedReply, ClientError> {
        let mut queue = self
            .replies
            .lock()
            .map_err(|_| ClientError::other("canned reply queue lock poisoned"))?;

        queue
            .pop_front()
            .ok_or_else(|| ClientError::unavailable("canned reply script exhausted"))
    }
}

impl ModelClient for CannedClient {
    fn send<'a>(
        &'a self,
        _transcript: &'a [Turn],
        _functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<ClientReply, ClientError>> {
        Box::pin(async move {
            match self.pop()?.script {
                Script::Buffered(turns) => Ok(ClientReply::new(turns)),
                Script::Streamed(items) => {
                    let stream: BoxedFragmentStream<'_> =
                        Box::pin(VecFragmentStream::new(items));
                    let assembled = assemble(stream, None).await.map_err(|err| match err {
                        crate::AssembleError::Client(client) => client,
                        crate::AssembleError::Merge(merge) => {
                            ClientError::other(format!("canned fragment script is corrupt: {merge}"))
                        }
                    })?;

                    Ok(ClientReply::new(assembled.turns))
                }
                Script::Error(error) => Err(error),
            }
        })
    }

    fn open_stream<'a>(
        &'a self,
        _transcript: &'a [Turn],
        _functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<BoxedFragmentStream<'a>, ClientError>> {
        Box::pin(async move {
            match self.pop()?.script {
                Script::Buffered(turns) => {
                    let mut items = Vec::new();
                    for (position, turn) in turns.into_iter().enumerate() {
                        let turn = turn.with_index(position as u32);
                        items.extend(
                            turn.into_fragments(SPLIT_GRANULARITY)
                                .into_iter()
                                .map(|fragment| Ok(StreamItem::Delta(fragment))),
                        );
                    }

                    items.push(Ok(StreamItem::Done(StreamEnd::new())));
                    Ok(Box::pin(VecFragmentStream::new(items)) as BoxedFragmentStream<'a>)
                }
                Script::Streamed(items) => {
                    Ok(Box::pin(VecFragmentStream::new(items)) as BoxedFragmentStream<'a>)
                }
                Script::Error(error) => Err(error),
            }
        })
    }
}
