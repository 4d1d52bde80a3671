// Analysis Session: state machine driving the job-match workflow.
// The controller owns every transition; the presenter only reads `SessionState`.

pub mod controller;
pub mod validation;

use crate::models::analysis::{AnalysisInput, MatchResult};

pub use controller::{ResolveOutcome, SessionController, SessionError};

/// Exactly one of these holds at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Editing(AnalysisInput),
    Pending(AnalysisInput),
    Settled(AnalysisInput, MatchResult),
    Failed(AnalysisInput, String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Editing(_) => "editing",
            SessionState::Pending(_) => "pending",
            SessionState::Settled(..) => "settled",
            SessionState::Failed(..) => "failed",
        }
    }
}
