use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::analysis::AnalysisInput;

/// Reasons an `AnalysisInput` may not be submitted. Recovered locally; never
/// reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ValidationError {
    #[error("Job description cannot be empty")]
    EmptyJobDescription,

    #[error("Email address is required")]
    MissingEmail,

    #[error("Email address must look like name@domain.tld")]
    MalformedEmail,
}

impl ValidationError {
    /// Which form field the error belongs to.
    pub fn field(&self) -> InputField {
        match self {
            ValidationError::EmptyJobDescription => InputField::JobDescription,
            ValidationError::MissingEmail | ValidationError::MalformedEmail => InputField::Email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputField {
    JobDescription,
    Email,
}

/// Validates the whole form. An empty vec means the input may be submitted.
///
/// Errors come back in field order: job description first, then email.
pub fn validate_input(input: &AnalysisInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if input.job_description.trim().is_empty() {
        errors.push(ValidationError::EmptyJobDescription);
    }

    let email = input.contact_email.trim();
    if email.is_empty() {
        errors.push(ValidationError::MissingEmail);
    } else if !is_valid_email(email) {
        errors.push(ValidationError::MalformedEmail);
    }

    errors
}

/// Simple `local@domain.tld` shape check:
/// - exactly one `@`
/// - no whitespace anywhere
/// - non-empty local part
/// - domain has a dot with non-empty labels on both sides of the last one
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}
