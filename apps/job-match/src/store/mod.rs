//! Persisted Result Store — holds at most one `(AnalysisInput, MatchResult)` pair.
//!
//! Layout: three independent keys, written together in one batch.
//! - `job_match.result`          serialized `StoredEnvelope`
//! - `job_match.job_description` raw job description text
//! - `job_match.email`           raw email text
//!
//! A record is valid only when all three are present and the envelope agrees
//! with the raw inputs. Anything else is purged on load and reported as absent.

pub mod backend;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::analysis::{AnalysisInput, MatchResult};
pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};

pub const RESULT_KEY: &str = "job_match.result";
pub const JOB_DESCRIPTION_KEY: &str = "job_match.job_description";
pub const EMAIL_KEY: &str = "job_match.email";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { limit: usize, needed: usize },
}

/// What is written under `RESULT_KEY`: the result envelope plus the input it
/// was produced for, so a description or email key changed on its own is
/// detected.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEnvelope {
    #[serde(flatten)]
    result: MatchResult,
    saved_for: AnalysisInput,
}

pub struct ResultStore {
    backend: Box<dyn KeyValueBackend>,
}

impl ResultStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Records the pair, replacing any previous one in a single batch.
    pub fn save(&mut self, input: &AnalysisInput, result: &MatchResult) -> Result<(), StoreError> {
        let envelope = StoredEnvelope {
            result: result.clone(),
            saved_for: input.clone(),
        };
        let encoded = serde_json::to_string(&envelope)?;

        self.backend.write_batch(vec![
            (RESULT_KEY, Some(encoded)),
            (JOB_DESCRIPTION_KEY, Some(input.job_description.clone())),
            (EMAIL_KEY, Some(input.contact_email.clone())),
        ])?;

        debug!(persona_id = %result.persona_id, "Stored job match analysis");
        Ok(())
    }

    /// Returns the stored pair, or `None` when absent or malformed.
    /// Malformed records are removed before returning.
    pub fn load(&mut self) -> Result<Option<(AnalysisInput, MatchResult)>, StoreError> {
        let result = self.backend.get(RESULT_KEY)?;
        let job_description = self.backend.get(JOB_DESCRIPTION_KEY)?;
        let email = self.backend.get(EMAIL_KEY)?;

        let (result, job_description, email) = match (result, job_description, email) {
            (None, None, None) => return Ok(None),
            (Some(r), Some(j), Some(e)) => (r, j, e),
            _ => {
                self.purge("incomplete record")?;
                return Ok(None);
            }
        };

        let envelope: StoredEnvelope = match serde_json::from_str(&result) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.purge(&format!("unparseable envelope: {e}"))?;
                return Ok(None);
            }
        };

        if let Err(reason) = envelope.result.check() {
            self.purge(&reason)?;
            return Ok(None);
        }

        let input = AnalysisInput::new(job_description, email);
        if envelope.saved_for != input {
            self.purge("envelope does not match stored input")?;
            return Ok(None);
        }

        Ok(Some((input, envelope.result)))
    }

    /// Removes any stored pair. Calling it on an empty store is a no-op.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.write_batch(vec![
            (RESULT_KEY, None),
            (JOB_DESCRIPTION_KEY, None),
            (EMAIL_KEY, None),
        ])
    }

    fn purge(&mut self, reason: &str) -> Result<(), StoreError> {
        warn!("Discarding stored job match analysis: {reason}");
        self.clear()?;
        info!("Stored job match analysis purged");
        Ok(())
    }
}
