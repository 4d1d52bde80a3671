use std::time::Duration;

/// Shared state for the match service handlers.
#[derive(Clone)]
pub struct AppState {
    /// When set, requests must carry `Authorization: Bearer <api_key>`.
    pub api_key: Option<String>,
    /// Simulated analysis time before answering.
    pub response_delay: Duration,
}
