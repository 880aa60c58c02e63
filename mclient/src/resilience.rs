//! Standard retry/backoff policy and operational hook contracts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mmessage::Turn;

use crate::{
    BoxedFragmentStream, ClientError, ClientFuture, ClientReply, FunctionSpec, ModelClient,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn should_retry(&self, attempt: u32, error: &ClientError) -> bool {
        error.retryable && attempt < self.max_attempts
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

pub trait ClientOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ClientError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &ClientError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ClientOperationHooks for NoopOperationHooks {}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn ClientOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ClientError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ClientError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    let delay = policy.backoff_for_attempt(attempt);
                    hooks.on_retry_scheduled(operation, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                hooks.on_failure(operation, attempt, &error);
                return Err(error);
            }
        }
    }
}

/// Decorator that retries retryable buffered sends. Fragment streams are
/// observed once and cannot be replayed, so `open_stream` passes through
/// untouched.
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
    hooks: Arc<dyn ClientOperationHooks>,
}

impl<C> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ClientOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl<C> ModelClient for RetryingClient<C>
where
    C: ModelClient,
{
    fn send<'a>(
        &'a self,
        transcript: &'a [Turn],
        functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<ClientReply, ClientError>> {
        Box::pin(async move {
            execute_with_retry(
                "send",
                &self.policy,
                self.hooks.as_ref(),
                |_| self.inner.send(transcript, functions),
                |delay| futures_timer::Delay::new(delay),
            )
            .await
        })
    }

    fn open_stream<'a>(
        &'a self,
        transcript: &'a [Turn],
        functions: &'a [FunctionSpec],
    ) -> ClientFuture<'a, Result<BoxedFragmentStream<'a>, ClientError>> {
        self.inner.open_stream(transcript, functions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{CannedClient, CannedReply};

    #[test]
    fn retry_policy_uses_retryable_flag_and_attempt_limit() {
        let policy = RetryPolicy::new(3);
        let retryable = ClientError::timeout("timed out");
        let non_retryable = ClientError::invalid_request("bad request");

        assert!(policy.should_retry(1, &retryable));
        assert!(policy.should_retry(2, &retryable));
        assert!(!policy.should_retry(3, &retryable));
        assert!(!policy.should_retry(1, &non_retryable));
    }

    #[test]
    fn retry_policy_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(250));
        assert_eq!(policy.backoff_for_attempt(4), Duration::from_millis(250));
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ClientOperationHooks for RecordingHooks {
        fn on_attempt_start(&self, operation: &str, attempt: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{operation}:{attempt}"));
        }

        fn on_retry_scheduled(
            &self,
            operation: &str,
            attempt: u32,
            _delay: Duration,
            _error: &ClientError,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("retry:{operation}:{attempt}"));
        }

        fn on_success(&self, operation: &str, attempts: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{operation}:{attempts}"));
        }

        fn on_failure(&self, operation: &str, attempts: u32, _error: &ClientError) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{operation}:{attempts}"));
        }
    }

    #[tokio::test]
    async fn execute_with_retry_retries_until_success() {
        let hooks = RecordingHooks::default();
        let policy = RetryPolicy::new(3);
        let attempts = Mutex::new(0_u32);

        let result = execute_with_retry(
            "send",
            &policy,
            &hooks,
            |_| {
                let mut attempts = attempts.lock().expect("attempts lock");
                *attempts += 1;
                let outcome = if *attempts < 3 {
                    Err(ClientError::transport("flaky"))
                } else {
                    Ok("done")
                };
                async move { outcome }
            },
            |_| async {},
        )
        .await;

        assert_eq!(result, Ok("done"));
        let events = hooks.events.lock().expect("events lock");
        assert_eq!(
            *events,
            vec![
                "start:send:1",
                "retry:send:1",
                "start:send:2",
                "retry:send:2",
                "start:send:3",
                "success:send:3",
            ]
        );
    }

    #[tokio::test]
    async fn execute_with_retry_fails_fast_on_non_retryable_errors() {
        let hooks = RecordingHooks::default();
        let policy = RetryPolicy::new(3);

        let result: Result<&str, ClientError> = execute_with_retry(
            "send",
            &policy,
            &hooks,
            |_| async { Err(ClientError::authentication("bad key")) },
            |_| async {},
        )
        .await;

        assert_eq!(result.expect_err("must fail").kind, crate::ClientErrorKind::Authentication);
        let events = hooks.events.lock().expect("events lock");
        assert_eq!(*events, vec!["start:send:1", "failure:send:1"]);
    }

    #[tokio::test]
    async fn retrying_client_recovers_a_retryable_send() {
        let canned = CannedClient::new(vec![
            CannedReply::error(ClientError::rate_limited("try later")),
            CannedReply::buffered(vec![mmessage::Turn::assistant("recovered")]),
        ]);

        let client = RetryingClient::new(
            canned,
            RetryPolicy {
                initial_backoff: Duration::from_millis(1),
                ..RetryPolicy::new(2)
            },
        );

        let reply = client.send(&[], &[]).await.expect("send should recover");
        assert_eq!(reply.turns[0].content_str(), "recovered");
    }
}
