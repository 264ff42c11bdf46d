use crate::clock::Clock;
use crate::error::RetryExhausted;
use pacer_config::{MAX_PRODUCE_ATTEMPTS, RETRY_BACKOFF};
use pacer_rpc_client::{RpcError, RpcResult};
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed pause between attempts.
///
/// Every [`RpcError`] is treated as retryable.
/// There is no growth and no jitter: attempt `k + 1` starts `backoff` after
/// attempt `k` failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_PRODUCE_ATTEMPTS,
            backoff: RETRY_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `operation` until it succeeds or the attempts are used up.
    ///
    /// `on_failure` sees every failed attempt (1-based) before the backoff.
    /// No backoff follows the final attempt.
    pub async fn execute<T, F, Fut, E>(
        &self,
        clock: &dyn Clock,
        mut operation: F,
        mut on_failure: E,
    ) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RpcResult<T>>,
        E: FnMut(u32, &RpcError),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    on_failure(attempt, &err);
                    if attempt >= max_attempts {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: err,
                        });
                    }
                    clock.sleep(self.backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    fn transport(msg: &str) -> RpcError {
        RpcError::Transport(msg.to_string())
    }

    #[tokio::test]
    async fn success_takes_one_attempt() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let mut failures = Vec::new();

        let result = RetryPolicy::default()
            .execute(
                &clock,
                || {
                    calls.set(calls.get() + 1);
                    async { Ok::<_, RpcError>("hash") }
                },
                |attempt, _| failures.push(attempt),
            )
            .await;

        assert_eq!(result, Ok("hash"));
        assert_eq!(calls.get(), 1);
        assert!(failures.is_empty());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn exhaustion_after_five_attempts_and_four_backoffs() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let mut failures = Vec::new();

        let result: Result<(), _> = RetryPolicy::default()
            .execute(
                &clock,
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move { Err(transport(&format!("refused #{n}"))) }
                },
                |attempt, err| failures.push((attempt, err.to_string())),
            )
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 5);
        assert_eq!(exhausted.last_error, transport("refused #5"));
        assert_eq!(calls.get(), 5);
        assert_eq!(
            failures.iter().map(|(a, _)| *a).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 4]);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);

        let result = RetryPolicy::default()
            .execute(
                &clock,
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n < 3 {
                            Err(RpcError::Timeout(Duration::from_secs(600)))
                        } else {
                            Ok(n)
                        }
                    }
                },
                |_, _| {},
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(clock.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let clock = ManualClock::new();
        let result: Result<(), _> = RetryPolicy::new(0, Duration::from_secs(1))
            .execute(&clock, || async { Err(transport("down")) }, |_, _| {})
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(clock.sleeps().is_empty());
    }
}
