//! Fragment stream contracts and in-memory stream utilities.
//!
//! ```rust
//! use mclient::{BoxedFragmentStream, StreamItem, VecFragmentStream};
//! use mmessage::Fragment;
//!
//! let stream = VecFragmentStream::new(vec![Ok(StreamItem::Delta(Fragment::content(0, "hi")))]);
//! let _boxed: BoxedFragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use mmessage::{Fragment, TokenUsage, TurnStatus};

use crate::ClientError;

/// Terminal marker of a fragment stream. May carry the final status of
/// the highest-index turn and the token usage for the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamEnd {
    pub status: Option<TurnStatus>,
    pub usage: Option<TokenUsage>,
}

impl StreamEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete() -> Self {
        Self {
            status: Some(TurnStatus::Complete),
            usage: None,
        }
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

#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Delta(Fragment),
    Done(StreamEnd),
}

/// Fragment stream contract.
///
/// Invariants for consumers:
/// - Deltas arrive in non-decreasing turn-index order.
/// - `Done`, when present, is the last item observed.
/// - Once the stream yields `None`, it must not yield additional items.
/// - The stream is observed once; it is not restartable.
pub trait FragmentStream: Stream<Item = Result<StreamItem, ClientError>> + Send {}

impl<T> FragmentStream for T where T: Stream<Item = Result<StreamItem, ClientError>> + Send {}

pub type BoxedFragmentStream<'a> = Pin<Box<dyn FragmentStream + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    items: VecDeque<Result<StreamItem, ClientError>>,
}

impl VecFragmentStream {
    pub fn new(items: Vec<Result<StreamItem, ClientError>>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<StreamItem, ClientError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamItem, ClientError>>> {
        Poll::Ready(self.items.pop_front())
    }
}
