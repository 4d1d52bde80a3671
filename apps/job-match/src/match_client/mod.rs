/// Match Request Client — the single point of entry for calls to the remote
/// job matching service.
///
/// One attempt per submission: no retry, no timeout. Cancellation and stale
/// responses are the session controller's concern.
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::analysis::{AnalysisInput, MatchResult};

pub const MATCH_JOB_ENDPOINT: &str = "/api/v1/match-job";

/// Shown when the service failed without saying why, or said something we
/// could not parse.
pub const GENERIC_SERVICE_MESSAGE: &str = "The matching service could not analyze this job right now. Please try again later.";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Service(String),

    /// The raw payload is kept for logs only.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl RequestError {
    /// The description shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Network(_) => self.to_string(),
            RequestError::Service(message) => message.clone(),
            RequestError::MalformedResponse(_) => GENERIC_SERVICE_MESSAGE.to_string(),
        }
    }
}

/// Seam between the session controller and the transport.
#[async_trait]
pub trait MatchClient: Send + Sync {
    async fn submit(&self, input: &AnalysisInput) -> Result<MatchResult, RequestError>;
}

#[derive(Debug, Serialize)]
struct MatchJobRequest<'a> {
    job_opportunity: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct MatchJobResponse {
    data: MatchResult,
}

/// HTTP implementation against `POST <base>/api/v1/match-job`.
#[derive(Clone)]
pub struct HttpMatchClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMatchClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if api_key.is_none() {
            warn!("No match service API key configured; requests may be rejected");
        }
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, MATCH_JOB_ENDPOINT)
    }
}

#[async_trait]
impl MatchClient for HttpMatchClient {
    async fn submit(&self, input: &AnalysisInput) -> Result<MatchResult, RequestError> {
        let url = self.endpoint();
        let body = MatchJobRequest {
            job_opportunity: &input.job_description,
            email: &input.contact_email,
        };

        info!("Calling job matching service: {}", url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Match service response status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Match service error {}: {}", status, text);
            let message =
                extract_error_message(&text).unwrap_or_else(|| GENERIC_SERVICE_MESSAGE.to_string());
            return Err(RequestError::Service(message));
        }

        parse_success_body(&text)
    }
}

/// Decodes a 2xx body into a `MatchResult`.
fn parse_success_body(text: &str) -> Result<MatchResult, RequestError> {
    let parsed: MatchJobResponse = serde_json::from_str(text).map_err(|e| {
        warn!("Unparseable match service response ({e}): {text}");
        RequestError::MalformedResponse(e.to_string())
    })?;

    parsed.data.check().map_err(|reason| {
        warn!("Rejected match service response: {reason}");
        RequestError::MalformedResponse(reason)
    })?;

    Ok(parsed.data)
}

/// Pulls a human-readable message out of an error body.
///
/// Accepts `{"message": ".."}`, `{"error": ".."}` and `{"error": {"message": ".."}}`.
fn extract_error_message(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;

    let candidates = [
        value.get("message"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("error"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string);
    message
}
