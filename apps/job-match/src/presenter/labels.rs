/// Display strings for the job-match views. Supplied by the surrounding site;
/// `Labels::default()` is the English set.
#[derive(Debug, Clone)]
pub struct Labels {
    pub dialog_title: String,
    pub job_description_field: String,
    pub email_field: String,
    pub analyze_action: String,
    pub loading: String,
    pub failed_title: String,
    pub score_excellent: String,
    pub score_good: String,
    pub score_potential: String,
    pub job_description_echo: String,
    pub overview: String,
    pub key_alignments: String,
    pub potential_concerns: String,
    pub salary_fit: String,
    pub culture_fit: String,
    pub growth_potential: String,
    pub next_steps: String,
    pub recommendations: String,
    pub for_candidate: String,
    pub for_recruiter: String,
    pub completed_on: String,
    pub new_analysis_action: String,
    /// Shown when a stored analysis is resumed. `{email}` is replaced with the
    /// stored contact email.
    pub stored_greeting: String,
    pub stored_description: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            dialog_title: "Job Match Analysis".to_string(),
            job_description_field: "Job description".to_string(),
            email_field: "Contact email".to_string(),
            analyze_action: "Analyze".to_string(),
            loading: "Analyzing job match...".to_string(),
            failed_title: "Analysis Failed".to_string(),
            score_excellent: "Excellent Match".to_string(),
            score_good: "Good Match".to_string(),
            score_potential: "Potential Match".to_string(),
            job_description_echo: "Job Description".to_string(),
            overview: "Analysis Overview".to_string(),
            key_alignments: "Key Alignments".to_string(),
            potential_concerns: "Potential Concerns".to_string(),
            salary_fit: "Salary Alignment".to_string(),
            culture_fit: "Culture Fit".to_string(),
            growth_potential: "Growth Potential".to_string(),
            next_steps: "Recommended Next Steps".to_string(),
            recommendations: "Strategic Recommendations".to_string(),
            for_candidate: "For the candidate".to_string(),
            for_recruiter: "For the recruiter".to_string(),
            completed_on: "Analysis completed on".to_string(),
            new_analysis_action: "Start new analysis".to_string(),
            stored_greeting: "Hello {email}, you still there?".to_string(),
            stored_description: "We have analyzed your description before, here it is again."
                .to_string(),
        }
    }
}

impl Labels {
    pub fn greeting_for(&self, email: &str) -> String {
        self.stored_greeting.replace("{email}", email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_fills_in_email() {
        let labels = Labels::default();
        assert_eq!(labels.greeting_for("a@b.com"), "Hello a@b.com, you still there?");

        let custom = Labels {
            stored_greeting: "Welcome back".to_string(),
            ..Labels::default()
        };
        assert_eq!(custom.greeting_for("a@b.com"), "Welcome back");
    }
}
