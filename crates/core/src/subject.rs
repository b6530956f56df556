//! Stable identity of an account (the login name, usually an email).

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_SUBJECT_LEN: usize = 320;

/// Unique, stable identifier of a principal.
///
/// Subjects are compared case-insensitively: construction trims surrounding
/// whitespace and lower-cases the value, so `A@B.com` and `a@b.com` name the
/// same account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::InvalidSubject("empty"));
        }
        if normalized.len() > MAX_SUBJECT_LEN {
            return Err(DomainError::InvalidSubject("too long"));
        }
        if normalized.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::InvalidSubject(
                "contains whitespace or control characters",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Subject {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Subject {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}
