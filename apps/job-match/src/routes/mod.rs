pub mod health;
pub mod match_job;

use axum::{
    routing::{get, post},
    Router,
};

use crate::match_client::MATCH_JOB_ENDPOINT;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(MATCH_JOB_ENDPOINT, post(match_job::handle_match_job))
        .with_state(state)
}
