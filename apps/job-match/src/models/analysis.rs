use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest score the matching service may report.
pub const MAX_MATCH_SCORE: u8 = 100;

/// What the user typed into the analysis form.
///
/// Fields are kept raw while editing; `session::validation` decides whether the
/// pair may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub job_description: String,
    pub contact_email: String,
}

impl AnalysisInput {
    pub fn new(job_description: impl Into<String>, contact_email: impl Into<String>) -> Self {
        Self {
            job_description: job_description.into(),
            contact_email: contact_email.into(),
        }
    }
}

/// Advice split by audience. Wire names are `candidate` / `recruiter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceAdvice {
    #[serde(rename = "candidate")]
    pub for_candidate: String,
    #[serde(rename = "recruiter")]
    pub for_recruiter: String,
}

/// The `match_result` object produced by the matching service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_score: u8,
    #[serde(rename = "analysis")]
    pub analysis_narrative: String,
    pub recommendations: AudienceAdvice,
    pub key_alignments: Vec<String>,
    pub potential_concerns: Vec<String>,
    pub next_steps: AudienceAdvice,
    pub salary_fit: String,
    pub culture_fit: String,
    pub growth_potential: String,
}

/// A completed analysis: the report plus its envelope fields.
///
/// Serializes to the same shape as the service's `data` object, which is also
/// the shape persisted by the result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match_result")]
    pub report: MatchReport,
    pub persona_id: String,
    pub analysis_timestamp: DateTime<Utc>,
}

impl MatchResult {
    /// Structural checks that serde cannot express on its own.
    pub fn check(&self) -> Result<(), String> {
        if self.report.match_score > MAX_MATCH_SCORE {
            return Err(format!(
                "match_score {} exceeds {MAX_MATCH_SCORE}",
                self.report.match_score
            ));
        }
        if self.persona_id.trim().is_empty() {
            return Err("persona_id is empty".to_string());
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_result;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_service_data_object() {
        let data = json!({
            "match_result": {
                "match_score": 78,
                "analysis": "Good fit.",
                "recommendations": {"candidate": "c", "recruiter": "r"},
                "key_alignments": ["a", "b"],
                "potential_concerns": ["x"],
                "next_steps": {"candidate": "nc", "recruiter": "nr"},
                "salary_fit": "ok",
                "culture_fit": "good",
                "growth_potential": "high"
            },
            "persona_id": "p-1",
            "analysis_timestamp": "2025-03-14T09:30:00Z"
        });

        let result: MatchResult = serde_json::from_value(data).unwrap();
        assert_eq!(result.report.match_score, 78);
        assert_eq!(result.report.analysis_narrative, "Good fit.");
        assert_eq!(result.report.recommendations.for_recruiter, "r");
        assert_eq!(result.report.next_steps.for_candidate, "nc");
        assert_eq!(result.report.key_alignments, vec!["a", "b"]);
        assert_eq!(result.persona_id, "p-1");
        assert!(result.check().is_ok());
    }

    #[test]
    fn test_missing_report_field_fails_to_parse() {
        let data = json!({
            "match_result": {"match_score": 78, "analysis": "Good fit."},
            "persona_id": "p-1",
            "analysis_timestamp": "2025-03-14T09:30:00Z"
        });
        assert!(serde_json::from_value::<MatchResult>(data).is_err());
    }

    #[test]
    fn test_check_rejects_score_above_100() {
        let result = sample_result(101);
        let err = result.check().unwrap_err();
        assert!(err.contains("101"));
    }

    #[test]
    fn test_check_rejects_blank_persona() {
        let mut result = sample_result(50);
        result.persona_id = "  ".to_string();
        assert!(result.check().is_err());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let value = serde_json::to_value(sample_result(78)).unwrap();
        assert_eq!(value["match_result"]["analysis"], "Solid overlap with the frontend stack.");
        assert_eq!(
            value["match_result"]["recommendations"]["candidate"],
            "Lead with the React work."
        );
        assert!(value["match_result"].get("analysis_narrative").is_none());
    }
}
