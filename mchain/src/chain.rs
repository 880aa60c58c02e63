//! Chain state and the request/response/function-execution loop.

use std::sync::Arc;
use std::time::Instant;

use mclient::{FragmentObserver, FunctionSpec, ModelClient, assemble};
use mfunction::{ExecutionContext, FunctionRegistry};
use mmessage::{ArgumentMap, Fragment, TokenUsage, Turn};

use crate::{ChainError, ChainHooks, ChainPhase, NoopChainHooks, RunOutcome, RunPolicy};

pub struct ChainBuilder {
    client: Arc<dyn ModelClient>,
    functions: Arc<FunctionRegistry>,
    context: ExecutionContext,
    streaming: bool,
    on_fragment: Option<Arc<FragmentObserver>>,
    verbose: bool,
    policy: RunPolicy,
    hooks: Arc<dyn ChainHooks>,
}

impl ChainBuilder {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            functions: Arc::new(FunctionRegistry::new()),
            context: ExecutionContext::new(),
            streaming: false,
            on_fragment: None,
            verbose: false,
            policy: RunPolicy::default(),
            hooks: Arc::new(NoopChainHooks),
        }
    }

    pub fn functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = functions;
        self
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Observer for live fragment delivery. Requires streaming.
    pub fn on_fragment<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Fragment) + Send + Sync + 'static,
    {
        self.on_fragment = Some(Arc::new(observer));
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChainHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validates the configuration once; a chain that builds can run.
    pub fn build(self) -> Result<Chain, ChainError> {
        if self.on_fragment.is_some() && !self.streaming {
            return Err(ChainError::invalid_config(
                "a fragment observer requires streaming to be enabled",
            ));
        }

        Ok(Chain {
            client: self.client,
            functions: self.functions,
            context: self.context,
            streaming: self.streaming,
            on_fragment: self.on_fragment,
            verbose: self.verbose,
            policy: self.policy,
            hooks: self.hooks,
            transcript: Vec::new(),
            queued: Vec::new(),
        })
    }
}

pub struct Chain {
    client: Arc<dyn ModelClient>,
    functions: Arc<FunctionRegistry>,
    context: ExecutionContext,
    streaming: bool,
    on_fragment: Option<Arc<FragmentObserver>>,
    verbose: bool,
    policy: RunPolicy,
    hooks: Arc<dyn ChainHooks>,
    transcript: Vec<Turn>,
    queued: Vec<Turn>,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("streaming", &self.streaming)
            .field("on_fragment", &self.on_fragment.is_some())
            .field("verbose", &self.verbose)
            .field("policy", &self.policy)
            .field("transcript_len", &self.transcript.len())
            .field("queued_len", &self.queued.len())
            .finish_non_exhaustive()
    }
}

impl Chain {
    pub fn builder(client: Arc<dyn ModelClient>) -> ChainBuilder {
        ChainBuilder::new(client)
    }

    /// Queues a turn for the next run.
    pub fn add_turn(&mut self, turn: Turn) -> &mut Self {
        self.queued.push(turn);
        self
    }

    pub fn add_turns(&mut self, turns: impl IntoIterator<Item = Turn>) -> &mut Self {
        self.queued.extend(turns);
        self
    }

    /// The transcript accumulated so far, including everything appended
    /// by failed runs.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn into_transcript(self) -> Vec<Turn> {
        self.transcript
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Drives the conversation until the current policy is satisfied.
    ///
    /// Each round sends the transcript and the registered function specs
    /// to the client, appends the returned turns, and executes any
    /// pending tool calls in the order the model emitted them. Executor
    /// failures become tool-result turns the model can react to; client,
    /// validation, and merge failures terminate the run with the partial
    /// transcript retained on the chain.
    ///
    /// Under `WhileNeedsResponse` the loop repeats until a round yields
    /// no pending tool calls. There is no internal round cap; callers
    /// wanting one wrap the run in their own counter.
    pub async fn run(&mut self) -> Result<RunOutcome, ChainError> {
        match self.run_rounds().await {
            Ok(outcome) => {
                self.emit(|hooks| hooks.on_run_complete(outcome.rounds, &outcome.last_turn));
                Ok(outcome)
            }
            Err(error) => {
                // Terminal failures always reach the hooks, verbose or not.
                self.hooks.on_run_error(&error);
                Err(error)
            }
        }
    }

    async fn run_rounds(&mut self) -> Result<RunOutcome, ChainError> {
        self.transcript.append(&mut self.queued);
        if self.transcript.is_empty() {
            return Err(ChainError::conversation("cannot run an empty conversation")
                .with_phase(ChainPhase::AwaitingSend));
        }

        let specs = self.functions.specs();
        let mut rounds = 0_u32;
        let mut usage = TokenUsage::default();

        loop {
            rounds += 1;
            self.emit(|hooks| {
                hooks.on_phase(rounds, ChainPhase::AwaitingSend);
                hooks.on_send_start(rounds, self.transcript.len());
            });

            let turns = self.exchange(&specs).await?;
            self.emit(|hooks| {
                hooks.on_phase(rounds, ChainPhase::SentAwaitingResult);
                hooks.on_reply(rounds, &turns);
            });

            if turns.is_empty() {
                return Err(ChainError::conversation("model reply contained no turns")
                    .with_phase(ChainPhase::SentAwaitingResult));
            }

            let mut pending = Vec::new();
            for turn in turns {
                if let Some(turn_usage) = turn.usage {
                    usage.accumulate(turn_usage);
                }

                if turn.is_tool_call_pending() {
                    pending.push((
                        turn.tool_call_name.clone(),
                        turn.tool_call_arguments.clone().unwrap_or_default(),
                    ));
                }

                self.transcript.push(turn);
            }

            if pending.is_empty() {
                return Ok(self.complete(rounds, usage));
            }

            for (name, arguments) in pending {
                self.emit(|hooks| hooks.on_phase(rounds, ChainPhase::ToolCallPending));
                let result = self.execute_call(rounds, name.as_deref(), &arguments).await;
                self.transcript.push(result);
                self.emit(|hooks| hooks.on_phase(rounds, ChainPhase::ToolExecuted));
            }

            if !self.policy.loops() {
                return Ok(self.complete(rounds, usage));
            }
        }
    }

    async fn exchange(&self, specs: &[FunctionSpec]) -> Result<Vec<Turn>, ChainError> {
        if self.streaming {
            let stream = self
                .client
                .open_stream(&self.transcript, specs)
                .await
                .map_err(|error| ChainError::from(error).with_phase(ChainPhase::AwaitingSend))?;

            let assembled = assemble(stream, self.on_fragment.as_deref())
                .await
                .map_err(|error| {
                    ChainError::from(error).with_phase(ChainPhase::SentAwaitingResult)
                })?;

            Ok(assembled.turns)
        } else {
            let reply = self
                .client
                .send(&self.transcript, specs)
                .await
                .map_err(|error| {
                    ChainError::from(error).with_phase(ChainPhase::SentAwaitingResult)
                })?;

            Ok(reply.turns)
        }
    }

    async fn execute_call(
        &self,
        round: u32,
        name: Option<&str>,
        arguments: &ArgumentMap,
    ) -> Turn {
        // A pending turn without a name cannot resolve; the registry turns
        // the empty name into not-found error text the model can react to.
        let name = name.unwrap_or_default();
        self.emit(|hooks| hooks.on_function_start(round, name));
        let started = Instant::now();

        match self.functions.execute(name, arguments, &self.context).await {
            Ok(output) => {
                self.emit(|hooks| {
                    hooks.on_function_success(round, name, &output, started.elapsed());
                });
                Turn::tool_result(name, output)
            }
            Err(error) => {
                self.emit(|hooks| {
                    hooks.on_function_failure(round, name, &error, started.elapsed());
                });
                Turn::tool_result(name, error.to_string())
            }
        }
    }

    fn complete(&self, rounds: u32, usage: TokenUsage) -> RunOutcome {
        self.emit(|hooks| hooks.on_phase(rounds, ChainPhase::ResponseComplete));

        // The transcript cannot be empty here; every path that reaches
        // completion has appended at least one turn this round.
        let last_turn = self
            .transcript
            .last()
            .cloned()
            .unwrap_or_else(|| Turn::assistant(String::new()));

        RunOutcome {
            last_turn,
            rounds,
            usage,
        }
    }

    fn emit(&self, f: impl FnOnce(&dyn ChainHooks)) {
        if self.verbose {
            f(self.hooks.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use mclient::{CannedClient, CannedReply, ClientError};
    use mmessage::Role;

    use super::*;
    use crate::ChainErrorKind;

    fn canned(replies: Vec<CannedReply>) -> Arc<CannedClient> {
        Arc::new(CannedClient::new(replies))
    }

    #[test]
    fn builder_rejects_an_observer_without_streaming() {
        let client = canned(Vec::new());
        let error = Chain::builder(client)
            .on_fragment(|_fragment| {})
            .build()
            .expect_err("build must fail");

        assert_eq!(error.kind, ChainErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn running_an_empty_chain_fails_before_any_client_call() {
        let client = canned(vec![CannedReply::buffered(vec![Turn::assistant("unused")])]);
        let mut chain = Chain::builder(client.clone()).build().expect("chain builds");

        let error = chain.run().await.expect_err("run must fail");
        assert_eq!(error.kind, ChainErrorKind::Conversation);
        assert_eq!(client.remaining(), 1);
    }

    #[tokio::test]
    async fn plain_text_reply_completes_in_one_round() {
        let client = canned(vec![CannedReply::buffered(vec![Turn::assistant("hi there")])]);
        let mut chain = Chain::builder(client).build().expect("chain builds");
        chain.add_turn(Turn::user("hello"));

        let outcome = chain.run().await.expect("run should work");
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.last_turn.role, Role::Assistant);
        assert_eq!(outcome.last_turn.content_str(), "hi there");
        assert_eq!(chain.transcript().len(), 2);
    }

    #[tokio::test]
    async fn client_failure_retains_the_partial_transcript() {
        let client = canned(vec![CannedReply::error(ClientError::unavailable(
            "backend down",
        ))]);
        let mut chain = Chain::builder(client).build().expect("chain builds");
        chain.add_turn(Turn::user("hello"));

        let error = chain.run().await.expect_err("run must fail");
        assert_eq!(error.kind, ChainErrorKind::Client);
        assert_eq!(error.phase, Some(ChainPhase::SentAwaitingResult));
        assert_eq!(chain.transcript().len(), 1);
        assert_eq!(chain.transcript()[0].role, Role::User);
    }

    #[tokio::test]
    async fn single_turn_policy_executes_tools_but_does_not_loop() {
        let client = canned(vec![
            CannedReply::buffered(vec![Turn::tool_call("echo", ArgumentMap::new())]),
            CannedReply::buffered(vec![Turn::assistant("never requested")]),
        ]);

        let mut functions = FunctionRegistry::new();
        functions
            .register_sync_fn(
                mclient::FunctionSpec::new("echo", "Echoes"),
                |_, _| Ok("echoed".to_string()),
            )
            .expect("echo registers");

        let mut chain = Chain::builder(client.clone())
            .functions(Arc::new(functions))
            .build()
            .expect("chain builds");
        chain.add_turn(Turn::user("go"));

        let outcome = chain.run().await.expect("run should work");

        // Exactly one client call; the pending exchange is left for the
        // caller to continue.
        assert_eq!(client.remaining(), 1);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.last_turn.role, Role::ToolResult);
        assert_eq!(outcome.last_turn.content_str(), "echoed");
        assert_eq!(chain.transcript().len(), 3);
    }

    #[tokio::test]
    async fn queued_turns_drain_into_the_transcript_per_run() {
        let client = canned(vec![
            CannedReply::buffered(vec![Turn::assistant("first answer")]),
            CannedReply::buffered(vec![Turn::assistant("second answer")]),
        ]);
        let mut chain = Chain::builder(client).build().expect("chain builds");

        chain.add_turn(Turn::system("Be terse."));
        chain.add_turn(Turn::user("first question"));
        chain.run().await.expect("first run");

        chain.add_turn(Turn::user("second question"));
        let outcome = chain.run().await.expect("second run");

        assert_eq!(outcome.last_turn.content_str(), "second answer");
        assert_eq!(chain.transcript().len(), 5);
        assert_eq!(chain.transcript()[0].role, Role::System);
    }
}
