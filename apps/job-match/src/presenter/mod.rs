//! Disclosure Presenter — a pure mapping from `SessionState` to a `View`.
//!
//! Which sections are expanded is local UI state (`Disclosure`), created fresh
//! each time a view is mounted and never stored in the session.

pub mod labels;
pub mod render;

use serde::Serialize;

use crate::models::analysis::{AudienceAdvice, MatchResult};
use crate::session::validation::{validate_input, InputField};
use crate::session::SessionState;
pub use labels::Labels;
pub use render::{render_text, Disclosure};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum View {
    Form(FormView),
    Loading { title: String, message: String },
    Failed {
        title: String,
        heading: String,
        description: String,
    },
    Report(ReportView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub title: String,
    pub job_description_label: String,
    pub job_description: String,
    pub email_label: String,
    pub email: String,
    pub messages: Vec<FieldMessage>,
    pub can_submit: bool,
    pub submit_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMessage {
    pub field: InputField,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Potential,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Excellent
        } else if score >= 60 {
            ScoreBand::Good
        } else {
            ScoreBand::Potential
        }
    }

    fn label(self, labels: &Labels) -> &str {
        match self {
            ScoreBand::Excellent => &labels.score_excellent,
            ScoreBand::Good => &labels.score_good,
            ScoreBand::Potential => &labels.score_potential,
        }
    }
}

/// Collapsible sections of a report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
pub enum SectionKind {
    JobDescription,
    Overview,
    Alignments,
    Concerns,
    SalaryFit,
    CultureFit,
    GrowthPotential,
    NextSteps,
    Recommendations,
}

impl SectionKind {
    pub const ALL: [SectionKind; 9] = [
        SectionKind::JobDescription,
        SectionKind::Overview,
        SectionKind::Alignments,
        SectionKind::Concerns,
        SectionKind::SalaryFit,
        SectionKind::CultureFit,
        SectionKind::GrowthPotential,
        SectionKind::NextSteps,
        SectionKind::Recommendations,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SectionBody {
    Text(String),
    /// `positive` selects the bullet style: alignments vs concerns.
    List { items: Vec<String>, positive: bool },
    Advice {
        candidate_label: String,
        candidate: String,
        recruiter_label: String,
        recruiter: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub title: String,
    pub score: u8,
    pub band: ScoreBand,
    pub band_label: String,
    pub sections: Vec<Section>,
    pub completed_on: String,
    pub new_analysis_label: String,
}

/// Maps the session state to what should be on screen.
pub fn present(state: &SessionState, labels: &Labels) -> View {
    match state {
        SessionState::Empty => View::Form(form_view("", "", false, Vec::new(), labels)),
        SessionState::Editing(input) => {
            let errors = validate_input(input);
            let messages = errors
                .iter()
                .map(|e| FieldMessage {
                    field: e.field(),
                    message: e.to_string(),
                })
                .collect();
            View::Form(form_view(
                &input.job_description,
                &input.contact_email,
                errors.is_empty(),
                messages,
                labels,
            ))
        }
        SessionState::Pending(_) => View::Loading {
            title: labels.dialog_title.clone(),
            message: labels.loading.clone(),
        },
        SessionState::Failed(_, description) => View::Failed {
            title: labels.dialog_title.clone(),
            heading: labels.failed_title.clone(),
            description: description.clone(),
        },
        SessionState::Settled(input, result) => View::Report(report_view(
            &input.job_description,
            &input.contact_email,
            result,
            labels,
        )),
    }
}

fn form_view(
    job_description: &str,
    email: &str,
    can_submit: bool,
    messages: Vec<FieldMessage>,
    labels: &Labels,
) -> FormView {
    FormView {
        title: labels.dialog_title.clone(),
        job_description_label: labels.job_description_field.clone(),
        job_description: job_description.to_string(),
        email_label: labels.email_field.clone(),
        email: email.to_string(),
        messages,
        can_submit,
        submit_label: labels.analyze_action.clone(),
    }
}

fn report_view(job_description: &str, email: &str, result: &MatchResult, labels: &Labels) -> ReportView {
    let report = &result.report;
    let band = ScoreBand::for_score(report.match_score);

    let text = |kind, title: &str, body: &str| Section {
        kind,
        title: title.to_string(),
        body: SectionBody::Text(body.to_string()),
    };
    let advice = |kind, title: &str, advice: &AudienceAdvice| Section {
        kind,
        title: title.to_string(),
        body: SectionBody::Advice {
            candidate_label: labels.for_candidate.clone(),
            candidate: advice.for_candidate.clone(),
            recruiter_label: labels.for_recruiter.clone(),
            recruiter: advice.for_recruiter.clone(),
        },
    };

    let echo_title = if email.is_empty() {
        labels.job_description_echo.clone()
    } else {
        format!("{} ({email})", labels.job_description_echo)
    };

    let sections = vec![
        text(SectionKind::JobDescription, &echo_title, job_description),
        text(SectionKind::Overview, &labels.overview, &report.analysis_narrative),
        Section {
            kind: SectionKind::Alignments,
            title: labels.key_alignments.clone(),
            body: SectionBody::List {
                items: report.key_alignments.clone(),
                positive: true,
            },
        },
        Section {
            kind: SectionKind::Concerns,
            title: labels.potential_concerns.clone(),
            body: SectionBody::List {
                items: report.potential_concerns.clone(),
                positive: false,
            },
        },
        text(SectionKind::SalaryFit, &labels.salary_fit, &report.salary_fit),
        text(SectionKind::CultureFit, &labels.culture_fit, &report.culture_fit),
        text(
            SectionKind::GrowthPotential,
            &labels.growth_potential,
            &report.growth_potential,
        ),
        advice(SectionKind::NextSteps, &labels.next_steps, &report.next_steps),
        advice(
            SectionKind::Recommendations,
            &labels.recommendations,
            &report.recommendations,
        ),
    ];

    ReportView {
        title: labels.dialog_title.clone(),
        score: report.match_score,
        band,
        band_label: band.label(labels).to_string(),
        sections,
        completed_on: format!(
            "{} {}",
            labels.completed_on,
            result.analysis_timestamp.format("%Y-%m-%d %H:%M UTC")
        ),
        new_analysis_label: labels.new_analysis_action.clone(),
    }
}
