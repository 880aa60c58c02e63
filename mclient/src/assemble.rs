//! Reduces a fragment stream into complete turns, buffered or live.
//!
//! In buffered mode the stream is drained silently; in live mode the
//! caller-supplied observer sees every delta synchronously, in arrival
//! order, before the same merge produces the canonical turns for history.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use futures_util::StreamExt;
use mmessage::{Fragment, MessageError, TokenUsage, Turn};

use crate::{BoxedFragmentStream, ClientError, StreamEnd, StreamItem};

pub type FragmentObserver = dyn Fn(&Fragment) + Send + Sync;

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledReply {
    pub turns: Vec<Turn>,
    pub usage: Option<TokenUsage>,
}

/// Transport failures keep their client identity; corrupt fragment
/// sequences surface as merge failures. The orchestrator maps each to
/// its own terminal error kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleError {
    Client(ClientError),
    Merge(MessageError),
}

impl Display for AssembleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(err) => write!(f, "client: {err}"),
            Self::Merge(err) => write!(f, "merge: {err}"),
        }
    }
}

impl Error for AssembleError {}

impl From<ClientError> for AssembleError {
    fn from(value: ClientError) -> Self {
        Self::Client(value)
    }
}

impl From<MessageError> for AssembleError {
    fn from(value: MessageError) -> Self {
        Self::Merge(value)
    }
}

/// Drains `stream` exactly once and merges its deltas into turns.
///
/// Deltas are grouped by turn index; observed indexes must form a
/// contiguous run starting at zero. The done marker's status and usage
/// apply to the highest-index turn. Items after the done marker, and
/// streams that produce no deltas at all, are corrupt.
pub async fn assemble(
    mut stream: BoxedFragmentStream<'_>,
    observer: Option<&FragmentObserver>,
) -> Result<AssembledReply, AssembleError> {
    let mut groups: BTreeMap<u32, Vec<Fragment>> = BTreeMap::new();
    let mut end: Option<StreamEnd> = None;

    while let Some(item) = stream.next().await {
        let item = item?;

        if end.is_some() {
            return Err(MessageError::merge(
                "fragment stream yielded items after the done marker",
            )
            .into());
        }

        match item {
            StreamItem::Delta(fragment) => {
                if let Some(observer) = observer {
                    observer(&fragment);
                }

                groups.entry(fragment.index).or_default().push(fragment);
            }
            StreamItem::Done(marker) => end = Some(marker),
        }
    }

    if groups.is_empty() {
        return Err(MessageError::merge("fragment stream produced no turns").into());
    }

    let first_index = *groups.keys().next().unwrap_or(&0);
    let last_index = *groups.keys().next_back().unwrap_or(&0);
    if first_index != 0 || last_index as usize != groups.len() - 1 {
        return Err(MessageError::merge(format!(
            "fragment turn indexes are non-contiguous: observed {}..={} across {} turns",
            first_index,
            last_index,
            groups.len(),
        ))
        .into());
    }

    let usage = end.as_ref().and_then(|marker| marker.usage);
    if let Some(marker) = end {
        let closing = groups.entry(last_index).or_default();
        let mut terminal = Fragment::new(last_index);
        if let Some(status) = marker.status {
            terminal = terminal.with_status(status);
        }

        if let Some(usage) = marker.usage {
            terminal = terminal.with_usage(usage);
        }

        closing.push(terminal);
    }

    let mut turns = Vec::with_capacity(groups.len());
    for fragments in groups.values() {
        turns.push(Turn::from_fragments(fragments)?);
    }

    Ok(AssembledReply { turns, usage })
}
