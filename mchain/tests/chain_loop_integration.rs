use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mchain::prelude::*;
use mclient::{
    BoxedFragmentStream, ClientFuture, StreamEnd, StreamItem, VecFragmentStream,
};
use mmessage::ArgumentMap;
use serde_json::json;

/// Requests one tool call, then answers once a tool result is in the
/// transcript.
#[derive(Debug, Default)]
struct ToolLoopClient {
    calls: AtomicUsize,
}

impl ToolLoopClient {
    fn reply_for(&self, transcript: &[Turn]) -> Vec<Turn> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let answered = transcript
            .iter()
            .any(|turn| turn.role == Role::ToolResult);

        if answered {
            vec![Turn::assistant("done").with_usage(TokenUsage::new(6, 2))]
        } else {
            let mut arguments = ArgumentMap::new();
            arguments.insert("text".to_string(), json!("hello"));
            vec![Turn::tool_call("echo", arguments).with_usage(TokenUsage::new(5, 2))]
        }
    }
}

impl ModelClient for ToolLoopClient {
    fn send<'a>(
        &'a self,
        transcript: &'a [Turn],
        _functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<ClientReply, ClientError>> {
        Box::pin(async move { Ok(ClientReply::new(self.reply_for(transcript))) })
    }

    fn open_stream<'a>(
        &'a self,
        transcript: &'a [Turn],
        _functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<BoxedFragmentStream<'a>, ClientError>> {
        Box::pin(async move {
            let mut items = Vec::new();
            for turn in self.reply_for(transcript) {
                items.extend(
                    turn.into_fragments(4)
                        .into_iter()
                        .map(|fragment| Ok(StreamItem::Delta(fragment))),
                );
            }

            items.push(Ok(StreamItem::Done(StreamEnd::new())));
            Ok(Box::pin(VecFragmentStream::new(items)) as BoxedFragmentStream<'a>)
        })
    }
}

fn echo_registry() -> Arc<FunctionRegistry> {
    let mut functions = FunctionRegistry::new();
    functions
        .register_sync_fn(
            FunctionSpec::new("echo", "Echoes text").with_parameters_schema(
                r#"{"type":"object","properties":{"text":{"type":"string"}}}"#,
            ),
            |arguments, _context| {
                mfunction::required_str(&arguments, "text").map(ToString::to_string)
            },
        )
        .expect("echo registers");

    Arc::new(functions)
}

#[tokio::test]
async fn while_needs_response_runs_the_full_tool_loop() {
    let client = Arc::new(ToolLoopClient::default());
    let mut chain = Chain::builder(client.clone())
        .functions(echo_registry())
        .policy(RunPolicy::WhileNeedsResponse)
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    let outcome = chain.run().await.expect("run should work");

    // initial + tool-call + tool-result + final answer
    assert_eq!(chain.transcript().len(), 4);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);

    assert_eq!(outcome.last_turn.role, Role::Assistant);
    assert_eq!(outcome.last_turn.status, TurnStatus::Complete);
    assert!(!outcome.last_turn.content_str().is_empty());

    let transcript = chain.transcript();
    assert_eq!(transcript[1].status, TurnStatus::ToolCallPending);
    assert_eq!(transcript[2].role, Role::ToolResult);
    assert_eq!(transcript[2].content_str(), "hello");
    assert_eq!(transcript[2].tool_call_name.as_deref(), Some("echo"));

    // usage aggregated across both rounds
    assert_eq!(outcome.usage, TokenUsage::new(11, 4));
}

#[tokio::test]
async fn streaming_tool_loop_matches_buffered_behavior_and_observes_fragments() {
    let client = Arc::new(ToolLoopClient::default());
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();

    let mut chain = Chain::builder(client)
        .functions(echo_registry())
        .policy(RunPolicy::WhileNeedsResponse)
        .streaming(true)
        .on_fragment(move |fragment| {
            sink.lock().expect("observed lock").push(fragment.clone());
        })
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    let outcome = chain.run().await.expect("run should work");

    assert_eq!(outcome.last_turn.content_str(), "done");
    assert_eq!(chain.transcript().len(), 4);

    let fragments = observed.lock().expect("observed lock");
    assert!(!fragments.is_empty());
    assert!(
        fragments
            .iter()
            .any(|fragment| fragment.tool_call_name.as_deref() == Some("echo"))
    );
}

#[tokio::test]
async fn failing_executor_becomes_conversational_error_text() {
    let client = Arc::new(ToolLoopClient::default());

    let mut functions = FunctionRegistry::new();
    functions
        .register_sync_fn(FunctionSpec::new("echo", "Always fails"), |_, _| {
            Err(FunctionError::execution("tool exploded"))
        })
        .expect("echo registers");

    let mut chain = Chain::builder(client)
        .functions(Arc::new(functions))
        .policy(RunPolicy::WhileNeedsResponse)
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    let outcome = chain.run().await.expect("run should still complete");

    let transcript = chain.transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[2].role, Role::ToolResult);
    assert!(transcript[2].content_str().contains("tool exploded"));
    assert_eq!(outcome.last_turn.content_str(), "done");
}

#[tokio::test]
async fn unregistered_function_name_lets_the_model_react() {
    let client = Arc::new(ToolLoopClient::default());

    // No functions registered at all; the model's call cannot resolve.
    let mut chain = Chain::builder(client)
        .policy(RunPolicy::WhileNeedsResponse)
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    let outcome = chain.run().await.expect("run should still complete");

    let transcript = chain.transcript();
    assert!(transcript[2].content_str().contains("not registered"));
    assert_eq!(outcome.last_turn.content_str(), "done");
}

#[tokio::test]
async fn execution_context_reaches_executors_unchanged() {
    let client = Arc::new(ToolLoopClient::default());

    let mut functions = FunctionRegistry::new();
    functions
        .register_sync_fn(FunctionSpec::new("echo", "Reports the caller"), |_, context| {
            Ok(format!(
                "ran for {}",
                context.principal.unwrap_or_default()
            ))
        })
        .expect("echo registers");

    let mut chain = Chain::builder(client)
        .functions(Arc::new(functions))
        .context(ExecutionContext::new().with_principal("user-42"))
        .policy(RunPolicy::WhileNeedsResponse)
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    chain.run().await.expect("run should work");

    assert_eq!(chain.transcript()[2].content_str(), "ran for user-42");
    assert_eq!(
        chain.context().principal.as_deref(),
        Some("user-42"),
        "the engine never mutates the context"
    );
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl ChainHooks for RecordingHooks {
    fn on_send_start(&self, round: u32, transcript_len: usize) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("send:{round}:{transcript_len}"));
    }

    fn on_function_start(&self, round: u32, name: &str) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("fn-start:{round}:{name}"));
    }

    fn on_function_success(
        &self,
        round: u32,
        name: &str,
        _output: &str,
        _elapsed: std::time::Duration,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("fn-ok:{round}:{name}"));
    }

    fn on_run_complete(&self, rounds: u32, _last_turn: &Turn) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("complete:{rounds}"));
    }
}

#[tokio::test]
async fn verbose_chains_emit_hook_events_and_quiet_chains_do_not() {
    let hooks = Arc::new(RecordingHooks::default());

    let mut verbose_chain = Chain::builder(Arc::new(ToolLoopClient::default()))
        .functions(echo_registry())
        .policy(RunPolicy::WhileNeedsResponse)
        .verbose(true)
        .hooks(hooks.clone())
        .build()
        .expect("chain builds");

    verbose_chain.add_turn(Turn::user("go"));
    verbose_chain.run().await.expect("run should work");

    {
        let events = hooks.events.lock().expect("events lock");
        assert!(events.contains(&"send:1:1".to_string()));
        assert!(events.contains(&"fn-start:1:echo".to_string()));
        assert!(events.contains(&"fn-ok:1:echo".to_string()));
        assert!(events.contains(&"complete:2".to_string()));
    }

    let quiet_hooks = Arc::new(RecordingHooks::default());
    let mut quiet_chain = Chain::builder(Arc::new(ToolLoopClient::default()))
        .functions(echo_registry())
        .policy(RunPolicy::WhileNeedsResponse)
        .hooks(quiet_hooks.clone())
        .build()
        .expect("chain builds");

    quiet_chain.add_turn(Turn::user("go"));
    quiet_chain.run().await.expect("run should work");

    assert!(quiet_hooks.events.lock().expect("events lock").is_empty());
}

#[tokio::test]
async fn parallel_tool_calls_execute_in_emitted_order() {
    let client = Arc::new(CannedClient::new(vec![
        CannedReply::buffered(vec![
            Turn::tool_call("first", ArgumentMap::new()),
            Turn::tool_call("second", ArgumentMap::new()).with_index(1),
        ]),
        CannedReply::buffered(vec![Turn::assistant("both done")]),
    ]));

    let order = Arc::new(Mutex::new(Vec::new()));
    let mut functions = FunctionRegistry::new();
    for name in ["first", "second"] {
        let order = order.clone();
        functions
            .register_sync_fn(FunctionSpec::new(name, "Records its order"), move |_, _| {
                order.lock().expect("order lock").push(name.to_string());
                Ok(name.to_string())
            })
            .expect("function registers");
    }

    let mut chain = Chain::builder(client)
        .functions(Arc::new(functions))
        .policy(RunPolicy::WhileNeedsResponse)
        .build()
        .expect("chain builds");

    chain.add_turn(Turn::user("go"));
    let outcome = chain.run().await.expect("run should work");

    assert_eq!(*order.lock().expect("order lock"), vec!["first", "second"]);
    // user + 2 calls + 2 results + final
    assert_eq!(chain.transcript().len(), 6);
    assert_eq!(chain.transcript()[3].role, Role::ToolResult);
    assert_eq!(chain.transcript()[3].tool_call_name.as_deref(), Some("first"));
    assert_eq!(outcome.last_turn.content_str(), "both done");
}
