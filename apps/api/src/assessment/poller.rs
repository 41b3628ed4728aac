//! Readiness Poller - bounded wait for asynchronously produced questions.
//!
//! Explicit Waiting -> Ready | Timeout machine: each attempt reads the
//! collection, returns immediately when non-empty, otherwise sleeps a fixed
//! interval. The attempt ceiling is authoritative; a caller that sees
//! `Timeout` treats it as a retriable condition, not a server fault.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

use crate::assessment::store;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::assessment::QuestionRow;

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs),
            max_attempts: config.poll_max_attempts,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum PollOutcome<T> {
    Ready(Vec<T>),
    TimedOut { attempts: u32 },
}

/// Drives the wait loop over an injected fetch. The sleep between attempts
/// is a plain cancellable `tokio::time::sleep`; no sleep follows the final
/// attempt.
pub async fn poll_until_ready<T, E, F, Fut>(
    config: &PollConfig,
    mut fetch: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    for attempt in 1..=config.max_attempts {
        let items = fetch().await?;
        if !items.is_empty() {
            return Ok(PollOutcome::Ready(items));
        }

        debug!(
            "Poll attempt {attempt}/{} found no items, waiting {:?}",
            config.max_attempts, config.interval
        );
        if attempt < config.max_attempts {
            sleep(config.interval).await;
        }
    }

    Ok(PollOutcome::TimedOut {
        attempts: config.max_attempts,
    })
}

/// Waits for the candidate's question collection to become non-empty.
pub async fn poll_questions(
    pool: &PgPool,
    candidate_id: Uuid,
    config: &PollConfig,
) -> Result<Vec<QuestionRow>, AppError> {
    let outcome = poll_until_ready(config, || store::fetch_questions(pool, candidate_id)).await?;

    match outcome {
        PollOutcome::Ready(items) => Ok(items),
        PollOutcome::TimedOut { attempts } => Err(AppError::Timeout(format!(
            "Questions for candidate {candidate_id} not ready after {attempts} attempts"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests (virtual time: sleeps auto-advance under start_paused)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn test_config() -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(10),
            max_attempts: 5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_attempt_budget() {
        let calls = Cell::new(0u32);
        let outcome: Result<PollOutcome<i32>, Infallible> =
            poll_until_ready(&test_config(), || {
                calls.set(calls.get() + 1);
                async { Ok(Vec::new()) }
            })
            .await;

        assert_eq!(outcome.unwrap(), PollOutcome::TimedOut { attempts: 5 });
        assert_eq!(calls.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt_returns_immediately() {
        let start = tokio::time::Instant::now();
        let outcome: Result<PollOutcome<i32>, Infallible> =
            poll_until_ready(&test_config(), || async { Ok(vec![1, 2, 3]) }).await;

        assert_eq!(outcome.unwrap(), PollOutcome::Ready(vec![1, 2, 3]));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_becomes_ready_mid_loop() {
        let calls = Cell::new(0u32);
        let outcome: Result<PollOutcome<i32>, Infallible> =
            poll_until_ready(&test_config(), || {
                calls.set(calls.get() + 1);
                let ready = calls.get() >= 3;
                async move {
                    if ready {
                        Ok(vec![42])
                    } else {
                        Ok(Vec::new())
                    }
                }
            })
            .await;

        assert_eq!(outcome.unwrap(), PollOutcome::Ready(vec![42]));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_propagates_immediately() {
        let outcome: Result<PollOutcome<i32>, &str> =
            poll_until_ready(&test_config(), || async { Err("connection refused") }).await;
        assert_eq!(outcome.unwrap_err(), "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_final_attempt() {
        let start = tokio::time::Instant::now();
        let outcome: Result<PollOutcome<i32>, Infallible> =
            poll_until_ready(&test_config(), || async { Ok(Vec::new()) }).await;

        assert!(matches!(outcome.unwrap(), PollOutcome::TimedOut { .. }));
        // 5 attempts, 4 sleeps
        assert_eq!(start.elapsed(), Duration::from_secs(40));
    }
}
