//! Retry executor: run an async operation until success, exhaustion, a
//! non-recoverable failure, or cancellation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use uuid::Uuid;

use super::cancel::CancelToken;
use super::error::{RecoverableError, RecoveryResult};
use super::policy::RetryConfig;

/// Per-invocation record held in the active-operations map while the retry
/// loop runs. Removed on every exit path by [`ActiveGuard`].
#[derive(Debug)]
struct RetryContext {
    max_attempts: u32,
    enabled: bool,
    current_attempt: u32,
}

/// Runs fallible async operations under a bounded-retry policy.
///
/// Constructed and passed down explicitly by the application wiring; the
/// config is captured once per call and never re-read mid-retry. Concurrent
/// calls are independent: each gets its own operation id and map entry, and
/// the map lock is never held across an await.
pub struct RecoveryManager {
    config: RetryConfig,
    active: Mutex<HashMap<String, RetryContext>>,
}

struct ActiveGuard<'a> {
    active: &'a Mutex<HashMap<String, RetryContext>>,
    operation_id: &'a str,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.lock().unwrap().remove(self.operation_id);
    }
}

impl RecoveryManager {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Number of retry loops currently in flight.
    pub fn active_operations(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Run `operation` under the retry policy. The success value is returned
    /// in `RecoveryResult::Recovered`.
    pub async fn execute_with_retry<T, E, F, Fut>(&self, operation: F) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<RecoverableError>,
    {
        self.run(operation, |_| {}, |_: &T| {}, None).await
    }

    /// Like [`Self::execute_with_retry`], with observation hooks: `on_error`
    /// fires after each failed attempt with the classified error, `on_success`
    /// fires exactly once on the attempt that succeeds. Both are side-effect
    /// only and cannot alter control flow.
    pub async fn execute_with_retry_observed<T, E, F, Fut, OE, OS>(
        &self,
        operation: F,
        on_error: OE,
        on_success: OS,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<RecoverableError>,
        OE: FnMut(&RecoverableError),
        OS: FnOnce(&T),
    {
        self.run(operation, on_error, on_success, None).await
    }

    /// Like [`Self::execute_with_retry`], stopping early with
    /// `RecoveryResult::Cancelled` once `token` is cancelled. The token is
    /// checked before each attempt and before each backoff delay.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        token: &CancelToken,
        operation: F,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<RecoverableError>,
    {
        self.run(operation, |_| {}, |_: &T| {}, Some(token)).await
    }

    async fn run<T, E, F, Fut, OE, OS>(
        &self,
        mut operation: F,
        mut on_error: OE,
        on_success: OS,
        cancel: Option<&CancelToken>,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<RecoverableError>,
        OE: FnMut(&RecoverableError),
        OS: FnOnce(&T),
    {
        let operation_id = Uuid::new_v4().to_string();
        let max_attempts = self.config.max_attempts;
        let enabled = self.config.enabled;

        self.active.lock().unwrap().insert(
            operation_id.clone(),
            RetryContext {
                max_attempts,
                enabled,
                current_attempt: 0,
            },
        );
        let _guard = ActiveGuard {
            active: &self.active,
            operation_id: &operation_id,
        };

        let mut on_success = Some(on_success);
        let mut last_error: Option<RecoverableError> = None;

        for attempt in 1..=max_attempts {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                tracing::info!(operation_id = %operation_id, attempt, "retry loop cancelled");
                return RecoveryResult::Cancelled;
            }
            self.note_attempt(&operation_id, attempt);

            if attempt > 1 {
                tracing::info!(operation_id = %operation_id, attempt, "retrying operation");
            }

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(
                            operation_id = %operation_id,
                            attempt,
                            "operation recovered after retry"
                        );
                    }
                    if let Some(hook) = on_success.take() {
                        hook(&value);
                    }
                    return RecoveryResult::Recovered(value);
                }
                Err(raw) => {
                    let error = raw.into();
                    on_error(&error);
                    tracing::warn!(
                        operation_id = %operation_id,
                        attempt,
                        category = ?error.category(),
                        %error,
                        "operation attempt failed"
                    );

                    if !error.category().is_recoverable() {
                        return RecoveryResult::UserActionRequired(error);
                    }

                    let exhausted = !enabled || attempt >= max_attempts;
                    last_error = Some(error);
                    if exhausted {
                        break;
                    }

                    if cancel.is_some_and(CancelToken::is_cancelled) {
                        tracing::info!(operation_id = %operation_id, attempt, "retry loop cancelled");
                        return RecoveryResult::Cancelled;
                    }
                    tokio::time::sleep(self.config.delay_for_attempt(attempt)).await;
                }
            }
        }

        match last_error {
            Some(error) => {
                tracing::error!(operation_id = %operation_id, "max retries exceeded");
                RecoveryResult::MaxRetriesExceeded(error)
            }
            // Only reachable with max_attempts == 0; config loading prevents
            // that, but a hand-built config must not cause a panic here.
            None => RecoveryResult::Failed(RecoverableError::CaptureFailed {
                reason: "unknown error".to_string(),
            }),
        }
    }

    fn note_attempt(&self, operation_id: &str, attempt: u32) {
        if let Some(ctx) = self.active.lock().unwrap().get_mut(operation_id) {
            ctx.current_attempt = attempt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            delays: vec![Duration::from_millis(1)],
            enabled: true,
        }
    }

    fn counted_op(
        calls: &Arc<AtomicU32>,
        succeed_on: u32,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, RecoverableError>> + Send>>
    {
        let calls = Arc::clone(calls);
        move || {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= succeed_on {
                    Ok(n)
                } else {
                    Err(RecoverableError::SystemBusy { attempt: n })
                }
            })
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let manager = RecoveryManager::new(fast_config(3));
        let calls = Arc::new(AtomicU32::new(0));
        let mut errors = 0u32;
        let mut successes = 0u32;

        let result = manager
            .execute_with_retry_observed(
                counted_op(&calls, 1),
                |_| errors += 1,
                |_: &u32| successes += 1,
            )
            .await;

        assert!(result.is_recovered());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(errors, 0);
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn recovers_after_two_failures_without_rerunning() {
        let manager = RecoveryManager::new(fast_config(3));
        let calls = Arc::new(AtomicU32::new(0));
        let mut errors = 0u32;
        let mut successes = 0u32;

        let result = manager
            .execute_with_retry_observed(
                counted_op(&calls, 3),
                |_| errors += 1,
                |_: &u32| successes += 1,
            )
            .await;

        // Success value comes back through the result; the operation is not
        // re-executed after the successful attempt.
        assert_eq!(result.into_value(), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(errors, 2);
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn recoverable_failures_exhaust_attempts() {
        let manager = RecoveryManager::new(fast_config(3));
        let calls = Arc::new(AtomicU32::new(0));

        let result = manager.execute_with_retry(counted_op(&calls, u32::MAX)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            RecoveryResult::MaxRetriesExceeded(RecoverableError::SystemBusy { attempt }) => {
                assert_eq!(attempt, 3);
            }
            other => panic!("expected MaxRetriesExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_recoverable_error_stops_immediately() {
        let manager = RecoveryManager::new(fast_config(3));
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: RecoveryResult<()> = manager
            .execute_with_retry(move || {
                let calls = Arc::clone(&calls_in_op);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(RecoverableError::PermissionDenied)
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result {
            RecoveryResult::UserActionRequired(RecoverableError::PermissionDenied) => {}
            other => panic!("expected UserActionRequired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_retry_stops_after_first_failure() {
        let config = RetryConfig {
            enabled: false,
            ..fast_config(3)
        };
        let manager = RecoveryManager::new(config);
        let calls = Arc::new(AtomicU32::new(0));

        let result = manager.execute_with_retry(counted_op(&calls, u32::MAX)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, RecoveryResult::MaxRetriesExceeded(_)));
    }

    #[tokio::test]
    async fn zero_max_attempts_fails_without_panicking() {
        let manager = RecoveryManager::new(fast_config(0));
        let calls = Arc::new(AtomicU32::new(0));

        let result = manager.execute_with_retry(counted_op(&calls, 1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        match result {
            RecoveryResult::Failed(RecoverableError::CaptureFailed { .. }) => {}
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(manager.active_operations(), 0);
    }

    #[tokio::test]
    async fn concurrent_operations_are_independent() {
        let manager = RecoveryManager::new(fast_config(3));
        let counters: Vec<Arc<AtomicU32>> =
            (0..5).map(|_| Arc::new(AtomicU32::new(0))).collect();

        let (a, b, c, d, e) = tokio::join!(
            manager.execute_with_retry(counted_op(&counters[0], 2)),
            manager.execute_with_retry(counted_op(&counters[1], 2)),
            manager.execute_with_retry(counted_op(&counters[2], 2)),
            manager.execute_with_retry(counted_op(&counters[3], 2)),
            manager.execute_with_retry(counted_op(&counters[4], 2)),
        );

        for result in [a, b, c, d, e] {
            assert!(result.is_recovered());
        }
        for calls in &counters {
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }
        assert_eq!(manager.active_operations(), 0);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let manager = RecoveryManager::new(fast_config(3));
        let calls = Arc::new(AtomicU32::new(0));
        let token = CancelToken::new();
        token.cancel();

        let result = manager
            .execute_cancellable(&token, counted_op(&calls, 1))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, RecoveryResult::Cancelled));
        assert_eq!(manager.active_operations(), 0);
    }

    #[tokio::test]
    async fn io_errors_are_classified_on_the_way_through() {
        let manager = RecoveryManager::new(fast_config(2));

        let result: RecoveryResult<()> = manager
            .execute_with_retry(|| async {
                Err::<(), _>(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                ))
            })
            .await;

        match result {
            RecoveryResult::UserActionRequired(RecoverableError::PermissionDenied) => {}
            other => panic!("expected classified permission error, got {other:?}"),
        }
    }
}
