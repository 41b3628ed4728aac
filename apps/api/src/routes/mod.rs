pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route(
            "/api/v1/assessments",
            get(handlers::handle_list).post(handlers::handle_submit),
        )
        .route(
            "/api/v1/assessments/:candidate_id/questions",
            get(handlers::handle_get_questions),
        )
        .route(
            "/api/v1/assessments/:candidate_id/answers",
            post(handlers::handle_submit_all_answers),
        )
        .route(
            "/api/v1/assessments/:candidate_id/answers/:question_id",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/assessments/:candidate_id/results",
            get(handlers::handle_get_results),
        )
        .with_state(state)
}
