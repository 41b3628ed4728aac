use std::sync::Arc;

use sqlx::PgPool;

use crate::assessment::capability::ContentGenerator;
use crate::assessment::poller::PollConfig;
use crate::config::Config;
use crate::jobs::JobQueue;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Dispatch boundary for question synthesis jobs.
    pub queue: Arc<dyn JobQueue>,
    /// Generation capability. Production wires the Gemini client; tests mock it.
    pub generator: Arc<dyn ContentGenerator>,
    pub poll_config: PollConfig,
    /// Kept whole for handlers that need settings beyond the poll window.
    #[allow(dead_code)]
    pub config: Config,
}
