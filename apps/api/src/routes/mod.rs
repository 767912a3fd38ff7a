pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interviews/questions",
            post(handlers::handle_generate_questions),
        )
        .route(
            "/api/v1/interviews/answers/evaluate",
            post(handlers::handle_evaluate_answer),
        )
        .route(
            "/api/v1/interviews/answers/submit",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/report",
            post(handlers::handle_interview_report),
        )
        // ATS API
        .route("/api/v1/ats/match", post(handlers::handle_ats_match))
        .route(
            "/api/v1/ats/match-batch",
            post(handlers::handle_ats_match_batch),
        )
        .route("/api/v1/mcq/check", post(handlers::handle_mcq_check))
        .with_state(state)
}
