//! Job Dispatcher - decouples the synchronous submit path from the
//! multi-call latency of question synthesis.
//!
//! Jobs are JSON payloads on a Redis list; a fixed pool of workers BRPOPs
//! and executes them. Execution is fire-and-forget: the submitting caller
//! is acknowledged as soon as the payload is enqueued, and a failed run is
//! logged (structured event) but never surfaced or retried. Clients poll
//! the questions endpoint and treat a poll timeout as the terminal signal.

pub mod worker;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The Redis list the workers consume from.
pub const QUESTION_QUEUE: &str = "jobs:questions";

/// Payload for one question-synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionJob {
    pub candidate_id: Uuid,
    pub job_description: String,
    pub resume_text: String,
}

/// The dispatch boundary. Handlers depend on this trait, not on Redis,
/// so tests can capture enqueued jobs in memory.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &QuestionJob) -> anyhow::Result<()>;
}

/// Redis-backed queue: LPUSH onto `jobs:questions`.
pub struct RedisJobQueue {
    client: redis::Client,
}

impl RedisJobQueue {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &QuestionJob) -> anyhow::Result<()> {
        let payload = serde_json::to_string(job)?;
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = con.lpush(QUESTION_QUEUE, payload).await?;
        Ok(())
    }
}
