//! Background worker pool for question synthesis.

use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use sqlx::PgPool;
use tracing::{error, info};

use crate::assessment::capability::ContentGenerator;
use crate::assessment::synthesizer::run_synthesis;
use crate::jobs::{QuestionJob, QUESTION_QUEUE};

/// BRPOP wakeup interval; keeps workers responsive to shutdown and
/// reconnects without busy-looping.
const POP_TIMEOUT_SECS: f64 = 5.0;
/// Backoff before re-dialing Redis after a connection failure.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawns the fixed worker pool. Workers live for the life of the process;
/// a lost Redis connection is re-dialed, never fatal.
pub fn spawn_workers(
    pool: PgPool,
    redis: redis::Client,
    generator: Arc<dyn ContentGenerator>,
    count: usize,
) {
    for worker_id in 0..count {
        let pool = pool.clone();
        let redis = redis.clone();
        let generator = generator.clone();
        tokio::spawn(async move {
            run_worker(worker_id, pool, redis, generator).await;
        });
    }
    info!("Spawned {count} question synthesis workers");
}

async fn run_worker(
    worker_id: usize,
    pool: PgPool,
    redis: redis::Client,
    generator: Arc<dyn ContentGenerator>,
) {
    info!("Question worker {worker_id} started");

    loop {
        let mut con = match redis.get_multiplexed_async_connection().await {
            Ok(con) => con,
            Err(e) => {
                error!("Worker {worker_id} failed to connect to Redis: {e}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        loop {
            let popped: redis::RedisResult<Option<(String, String)>> =
                con.brpop(QUESTION_QUEUE, POP_TIMEOUT_SECS).await;

            match popped {
                Ok(Some((_, payload))) => {
                    handle_job(&pool, generator.as_ref(), &payload).await;
                }
                Ok(None) => {} // pop timed out, queue empty
                Err(e) => {
                    error!("Worker {worker_id} Redis error, reconnecting: {e}");
                    break;
                }
            }
        }
    }
}

/// Executes one job. Fire-and-forget contract: every failure path ends in a
/// structured log event, nothing propagates.
async fn handle_job(pool: &PgPool, generator: &dyn ContentGenerator, payload: &str) {
    let job: QuestionJob = match serde_json::from_str(payload) {
        Ok(job) => job,
        Err(e) => {
            error!(payload, "Discarding malformed question job: {e}");
            return;
        }
    };

    info!(candidate_id = %job.candidate_id, "Running question synthesis job");

    if let Err(e) = run_synthesis(
        pool,
        generator,
        job.candidate_id,
        &job.job_description,
        &job.resume_text,
    )
    .await
    {
        // Swallowed by design; the structured event keeps it diagnosable.
        error!(candidate_id = %job.candidate_id, error = %e, "Question synthesis job failed");
    }
}
