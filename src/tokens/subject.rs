//! Token subjects and hash-input strategies
//!
//! What a token digest is bound to decides its replay behaviour. Binding
//! only the subject id makes a token reusable until it expires. Binding the
//! credential state (password hash, last login) makes it single-use: the
//! action the token authorizes changes that state, and the old digest stops
//! matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything a link token can be bound to
pub trait TokenSubject {
    /// Stable identifier of the subject
    fn subject_id(&self) -> String;

    /// Credential state that changes when the protected action completes
    fn credential_state(&self) -> Option<String> {
        None
    }

    fn last_login(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn email(&self) -> Option<String> {
        None
    }
}

/// Custom hash-input function
pub type HashInputsFn = fn(&dyn TokenSubject, u64) -> String;

/// What gets fed into the token digest
#[derive(Clone, Copy)]
pub enum HashInputs {
    /// Subject id and timestamp only; reusable until expiry
    SubjectId,
    /// Subject id, credential state, last login, timestamp and email;
    /// invalidated as soon as the credential changes
    CredentialBound,
    /// Caller-supplied binding
    Custom(HashInputsFn),
}

impl HashInputs {
    /// Render the digest input for `subject` at day `timestamp`
    ///
    /// Built-in bindings length-prefix every field so no two distinct
    /// field tuples render to the same input.
    pub fn render(&self, subject: &dyn TokenSubject, timestamp: u64) -> String {
        let ts = timestamp.to_string();
        match self {
            HashInputs::SubjectId => framed(&[subject.subject_id().as_str(), ts.as_str()]),
            HashInputs::CredentialBound => {
                let login = subject
                    .last_login()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
                    .unwrap_or_default();
                framed(&[
                    subject.subject_id().as_str(),
                    subject.credential_state().unwrap_or_default().as_str(),
                    login.as_str(),
                    ts.as_str(),
                    subject.email().unwrap_or_default().as_str(),
                ])
            }
            HashInputs::Custom(f) => f(subject, timestamp),
        }
    }
}

/// `<byte len>:<field>` for each field, concatenated
fn framed(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| format!("{}:{}", field.len(), field))
        .collect()
}

impl fmt::Debug for HashInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashInputs::SubjectId => write!(f, "SubjectId"),
            HashInputs::CredentialBound => write!(f, "CredentialBound"),
            HashInputs::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Named hash-input strategies selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashInputsKind {
    SubjectId,
    CredentialBound,
}

impl From<HashInputsKind> for HashInputs {
    fn from(kind: HashInputsKind) -> Self {
        match kind {
            HashInputsKind::SubjectId => HashInputs::SubjectId,
            HashInputsKind::CredentialBound => HashInputs::CredentialBound,
        }
    }
}
