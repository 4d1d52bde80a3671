//! Analysis Session Controller.
//!
//! Transition table:
//!
//! | from              | event            | to       | side effect          |
//! |-------------------|------------------|----------|----------------------|
//! | (init)            | stored pair      | Settled  | none (no network)    |
//! | Empty / Editing   | edit             | Editing  |                      |
//! | Settled / Failed  | edit             | Editing  |                      |
//! | Editing / Failed  | submit (valid)   | Pending  | request dispatched   |
//! | Pending           | resolve(ok)      | Settled  | `ResultStore::save`  |
//! | Pending           | resolve(err)     | Failed   |                      |
//! | any               | reset            | Empty    | `ResultStore::clear` |
//!
//! Submitting or editing while `Pending` is rejected. A resolution is applied
//! only while the controller is still pending on the same ticket and input.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::validation::{validate_input, ValidationError};
use super::SessionState;
use crate::match_client::{MatchClient, RequestError};
use crate::models::analysis::{AnalysisInput, MatchResult};
use crate::store::ResultStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Input is not valid: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("An analysis is already in progress")]
    AlreadyPending,

    #[error("Cannot submit from the {0} state; start a new analysis first")]
    NotSubmittable(&'static str),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A request the controller has committed to. Send it, then hand the
/// `Resolution` back to `SessionController::resolve`.
pub struct PendingRequest {
    ticket: Uuid,
    input: AnalysisInput,
    client: Arc<dyn MatchClient>,
}

impl PendingRequest {
    pub fn ticket(&self) -> Uuid {
        self.ticket
    }

    /// Performs the network call. This is the only suspension point of the
    /// workflow.
    pub async fn send(self) -> Resolution {
        let outcome = self.client.submit(&self.input).await;
        Resolution {
            ticket: self.ticket,
            input: self.input,
            outcome,
        }
    }
}

/// The settled outcome of a `PendingRequest`.
#[derive(Debug)]
pub struct Resolution {
    pub ticket: Uuid,
    pub input: AnalysisInput,
    pub outcome: Result<MatchResult, RequestError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Settled,
    Failed,
    /// The session moved on before the response arrived.
    Discarded,
}

pub struct SessionController {
    state: SessionState,
    store: ResultStore,
    client: Arc<dyn MatchClient>,
    in_flight: Option<Uuid>,
}

impl SessionController {
    /// Starts a session, replaying the stored analysis when one is present.
    pub fn new(client: Arc<dyn MatchClient>, mut store: ResultStore) -> Self {
        let state = match store.load() {
            Ok(Some((input, result))) => {
                info!(
                    persona_id = %result.persona_id,
                    "Resuming stored job match analysis"
                );
                SessionState::Settled(input, result)
            }
            Ok(None) => SessionState::Empty,
            Err(e) => {
                warn!("Could not read stored job match analysis: {e}");
                SessionState::Empty
            }
        };

        Self {
            state,
            store,
            client,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn edit_job_description(
        &mut self,
        text: impl Into<String>,
    ) -> Result<Vec<ValidationError>, SessionError> {
        let text = text.into();
        self.edit(|input| input.job_description = text)
    }

    pub fn edit_email(
        &mut self,
        text: impl Into<String>,
    ) -> Result<Vec<ValidationError>, SessionError> {
        let text = text.into();
        self.edit(|input| input.contact_email = text)
    }

    fn edit(
        &mut self,
        apply: impl FnOnce(&mut AnalysisInput),
    ) -> Result<Vec<ValidationError>, SessionError> {
        let mut input = match &self.state {
            SessionState::Pending(_) => return Err(SessionError::AlreadyPending),
            SessionState::Empty => AnalysisInput::default(),
            SessionState::Editing(input)
            | SessionState::Settled(input, _)
            | SessionState::Failed(input, _) => input.clone(),
        };
        apply(&mut input);

        let errors = validate_input(&input);
        self.transition(SessionState::Editing(input));
        Ok(errors)
    }

    /// Moves to `Pending` and returns the request to send.
    ///
    /// The email is sent, stored and echoed in the trimmed form that passed
    /// validation.
    pub fn submit(&mut self) -> Result<PendingRequest, SessionError> {
        let mut input = match &self.state {
            SessionState::Pending(_) => {
                debug!("Rejected submit while an analysis is in flight");
                return Err(SessionError::AlreadyPending);
            }
            SessionState::Editing(input) | SessionState::Failed(input, _) => input.clone(),
            other => return Err(SessionError::NotSubmittable(other.name())),
        };

        let errors = validate_input(&input);
        if !errors.is_empty() {
            return Err(SessionError::Invalid(errors));
        }
        input.contact_email = input.contact_email.trim().to_string();

        let ticket = Uuid::new_v4();
        self.in_flight = Some(ticket);
        self.transition(SessionState::Pending(input.clone()));
        info!(%ticket, "Submitting job match analysis");

        Ok(PendingRequest {
            ticket,
            input,
            client: Arc::clone(&self.client),
        })
    }

    /// Applies a resolution if it still belongs to the current pending request.
    pub fn resolve(&mut self, resolution: Resolution) -> ResolveOutcome {
        let Resolution {
            ticket,
            input,
            outcome,
        } = resolution;

        let current = match &self.state {
            SessionState::Pending(current) if self.in_flight == Some(ticket) => current,
            _ => {
                debug!(%ticket, state = self.state.name(), "Discarding stale match response");
                return ResolveOutcome::Discarded;
            }
        };
        if *current != input {
            debug!(%ticket, "Discarding match response for different input");
            return ResolveOutcome::Discarded;
        }

        self.in_flight = None;

        match outcome {
            Ok(result) => {
                // Losing the saved copy only costs the resume-later path.
                if let Err(e) = self.store.save(&input, &result) {
                    warn!("Could not persist job match analysis: {e}");
                }
                info!(score = result.report.match_score, "Job match analysis settled");
                self.transition(SessionState::Settled(input, result));
                ResolveOutcome::Settled
            }
            Err(e) => {
                warn!("Job match analysis failed: {e}");
                self.transition(SessionState::Failed(input, e.user_message()));
                ResolveOutcome::Failed
            }
        }
    }

    /// "Start new analysis": drops any result, input or in-flight request.
    pub fn reset(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            info!(%ticket, "Abandoning in-flight job match analysis");
        }
        if let Err(e) = self.store.clear() {
            warn!("Could not clear stored job match analysis: {e}");
        }
        self.transition(SessionState::Empty);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state.name() != next.name() {
            debug!(from = self.state.name(), to = next.name(), "Session transition");
        }
        self.state = next;
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut ResultStore {
        &mut self.store
    }
}
