//! Stand-in for the remote matching service.
//!
//! Answers `POST /api/v1/match-job` with a canned analysis after a delay, so
//! the client workflow can be exercised end to end without the real engine.

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AudienceAdvice, MatchReport, MatchResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchJobRequest {
    pub job_opportunity: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MatchJobResponse {
    pub data: MatchResult,
}

/// POST /api/v1/match-job
pub async fn handle_match_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<MatchJobRequest>, JsonRejection>,
) -> Result<Json<MatchJobResponse>, AppError> {
    authorize(&headers, state.api_key.as_deref())?;

    let Json(request) = body.map_err(|rejection| anyhow!("Unreadable request body: {rejection}"))?;

    if request.job_opportunity.trim().is_empty() {
        return Err(AppError::Validation(
            "job_opportunity cannot be empty".to_string(),
        ));
    }

    info!(
        email = %request.email,
        chars = request.job_opportunity.chars().count(),
        "Received job match request"
    );

    tokio::time::sleep(state.response_delay).await;

    Ok(Json(MatchJobResponse {
        data: canned_result(),
    }))
}

fn authorize(headers: &HeaderMap, api_key: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = api_key else {
        return Ok(());
    };

    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// The fixed analysis returned for every request, stamped with the current
/// time and a fresh persona id.
pub fn canned_result() -> MatchResult {
    MatchResult {
        report: MatchReport {
            match_score: 78,
            analysis_narrative: "The role lines up well with seven years of fullstack work. \
                JavaScript, React and Next.js experience cover the frontend requirements, and \
                prior database work covers most of the backend scope. PostgreSQL depth is the \
                main open question, along with the on-site expectation."
                .to_string(),
            recommendations: AudienceAdvice {
                for_candidate: "Lead with fullstack projects that touched the database layer and \
                    say up front how you would handle the on-site requirement."
                    .to_string(),
                for_recruiter: "Weigh the broad framework experience over the beginner-level \
                    PostgreSQL rating; the fundamentals transfer."
                    .to_string(),
            },
            key_alignments: vec![
                "Seven years of experience against a three-year minimum".to_string(),
                "Production JavaScript, React and Next.js".to_string(),
                "Fullstack delivery in agency settings".to_string(),
                "Hands-on database management".to_string(),
                "Used to agile teams".to_string(),
            ],
            potential_concerns: vec![
                "PostgreSQL listed at beginner level".to_string(),
                "On-site contract may not suit the current location".to_string(),
                "No direct retail or warehouse domain work".to_string(),
            ],
            next_steps: AudienceAdvice {
                for_candidate: "Prepare two project walkthroughs covering schema design and \
                    API work."
                    .to_string(),
                for_recruiter: "Run a technical interview focused on JavaScript and database \
                    interaction, then discuss location."
                    .to_string(),
            },
            salary_fit: "Expectations need to be checked against the budget for this role."
                .to_string(),
            culture_fit: "Fast-paced, communication-heavy teams have been a good fit so far."
                .to_string(),
            growth_potential: "Room to deepen backend and domain expertise in retail systems."
                .to_string(),
        },
        persona_id: Uuid::new_v4().to_string(),
        analysis_timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::build_router;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(api_key: Option<&str>) -> AppState {
        AppState {
            api_key: api_key.map(str::to_string),
            response_delay: Duration::ZERO,
        }
    }

    fn request(body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::post("/api/v1/match-job").header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_canned_result_passes_structural_check() {
        let result = canned_result();
        assert!(result.check().is_ok());
        assert_eq!(result.report.match_score, 78);
    }

    #[tokio::test]
    async fn test_returns_data_envelope() {
        let response = build_router(state(None))
            .oneshot(request(
                json!({"job_opportunity": "Frontend role", "email": "a@b.com"}),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let result: MatchResult = serde_json::from_value(body["data"].clone()).unwrap();
        assert_eq!(result.report.match_score, 78);
        assert!(!result.persona_id.is_empty());
    }

    #[tokio::test]
    async fn test_empty_job_opportunity_is_rejected() {
        let response = build_router(state(None))
            .oneshot(request(json!({"job_opportunity": " ", "email": "a@b.com"}), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_internal_error() {
        for body in ["{not json", r#"{"email": "a@b.com"}"#] {
            let request = Request::post("/api/v1/match-job")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap();
            let response = build_router(state(None)).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
            let body = json_body(response).await;
            assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
            assert_eq!(body["error"]["message"], "Failed to process job match request");
        }
    }

    #[tokio::test]
    async fn test_bearer_token_is_enforced_when_configured() {
        let body = json!({"job_opportunity": "Frontend role", "email": "a@b.com"});

        let missing = build_router(state(Some("k")))
            .oneshot(request(body.clone(), None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = build_router(state(Some("k")))
            .oneshot(request(body.clone(), Some("other")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let ok = build_router(state(Some("k")))
            .oneshot(request(body, Some("k")))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_http_client_round_trip_against_service() {
        use crate::match_client::{HttpMatchClient, MatchClient};
        use crate::models::analysis::AnalysisInput;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state(Some("k")))).await.unwrap();
        });

        let client = HttpMatchClient::new(format!("http://{addr}"), Some("k".to_string()));
        let result = client
            .submit(&AnalysisInput::new("Frontend role, 3 yrs exp", "a@b.com"))
            .await
            .unwrap();
        assert_eq!(result.report.match_score, 78);

        let unauthorized = HttpMatchClient::new(format!("http://{addr}"), None);
        let err = unauthorized
            .submit(&AnalysisInput::new("Frontend role", "a@b.com"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "A valid bearer token is required");
    }
}
