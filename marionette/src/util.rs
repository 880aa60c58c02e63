//! Small convenience constructors for common types.

use std::sync::Arc;

use crate::{ArgumentMap, CannedClient, CannedReply, Turn};

pub fn system_turn(content: impl Into<String>) -> Turn {
    Turn::system(content)
}

pub fn user_turn(content: impl Into<String>) -> Turn {
    Turn::user(content)
}

pub fn assistant_turn(content: impl Into<String>) -> Turn {
    Turn::assistant(content)
}

pub fn tool_call_turn(name: impl Into<String>, arguments: ArgumentMap) -> Turn {
    Turn::tool_call(name, arguments)
}

pub fn tool_result_turn(origin: impl Into<String>, output: impl Into<String>) -> Turn {
    Turn::tool_result(origin, output)
}

/// A client that answers every exchange with the same canned text. Handy
/// for demos and chain wiring tests.
pub fn canned_text_client(replies: impl IntoIterator<Item = String>) -> Arc<CannedClient> {
    Arc::new(CannedClient::new(
        replies
            .into_iter()
            .map(|text| CannedReply::buffered(vec![Turn::assistant(text)]))
            .collect(),
    ))
}
