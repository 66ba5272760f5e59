//! Composite subject/session key and session ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifies one row of a label table: a (participant, session) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    /// Participant identifier (e.g. `sub-ADNI011S0002`)
    pub subject: String,

    /// Session identifier (e.g. `ses-M000`)
    pub session: String,
}

impl SessionKey {
    /// Create a new key.
    pub fn new(subject: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            session: session.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.subject, self.session)
    }
}

/// Chronological ordering of session identifiers.
///
/// Sessions named `ses-M<months>` (the visit-month convention used by
/// longitudinal cohorts) sort by month offset, so `ses-M6` comes before
/// `ses-M012`. Identifiers without a month offset sort after every
/// month-coded one, lexically among themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOrder {
    month: Option<u32>,
    label: String,
}

impl SessionOrder {
    /// Build the sort key for a session identifier.
    pub fn of(session: &str) -> Self {
        Self {
            month: visit_month(session),
            label: session.to_string(),
        }
    }

    /// Month offset, if the identifier follows the `ses-M<n>` convention.
    pub fn month(&self) -> Option<u32> {
        self.month
    }
}

impl Ord for SessionOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.month, other.month) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.label.cmp(&other.label)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.label.cmp(&other.label),
        }
    }
}

impl PartialOrd for SessionOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse the visit month out of `ses-M<digits>` / `M<digits>`.
fn visit_month(session: &str) -> Option<u32> {
    let rest = session.strip_prefix("ses-").unwrap_or(session);
    let digits = rest.strip_prefix('M').or_else(|| rest.strip_prefix('m'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
