//! Check Records and Suite Results
//!
//! Every check performed by the suite produces one [`CheckRecord`]. Finding
//! a duplicated subject or a shared session is not an error: it is an
//! ordinary [`CheckOutcome::Fail`]. Faults scoped to one table (missing
//! file, malformed header) become [`CheckOutcome::Error`] records so the
//! rest of the suite keeps running.
//!
//! # Check Categories
//!
//! 1. **Subject uniqueness**: one row per subject in a baseline table
//! 2. **Partition independence**: no shared (subject, session) key between
//!    a train table and an evaluation table
//! 3. **Subcategory independence**: subjects of a parent label used for
//!    training are absent from evaluation tables of its sub-labels
//! 4. **Fold coverage**: the number of checked folds matches the declared
//!    fold count
//!
//! # Usage
//!
//! ```ignore
//! let result = LeakageSuite::default().run("labels", SuiteMode::SingleSplit)?;
//!
//! if !result.is_clean() {
//!     for record in result.failures() {
//!         println!("{}", record.report_line());
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of check performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    SubjectUniqueness,
    PartitionIndependence,
    SubcategoryIndependence,
    FoldCoverage,
}

impl CheckKind {
    /// Human-readable name used in report lines.
    pub fn title(&self) -> &'static str {
        match self {
            CheckKind::SubjectUniqueness => "Subject uniqueness",
            CheckKind::PartitionIndependence => "Partition independence",
            CheckKind::SubcategoryIndependence => "Subcategory independence",
            CheckKind::FoldCoverage => "Fold coverage",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum CheckOutcome {
    /// The invariant holds
    Pass,
    /// The invariant is violated
    Fail(String),
    /// The check could not apply (e.g. no validation table in this fold)
    Skipped(String),
    /// The check could not run (missing or malformed table)
    Error(String),
}

impl CheckOutcome {
    /// Check if the invariant was verified.
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }

    /// Check if this outcome counts against the suite.
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Fail(_) | CheckOutcome::Error(_))
    }

    /// Check if the check was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, CheckOutcome::Skipped(_))
    }

    /// Build an outcome from a boolean verdict.
    pub fn from_verdict(passed: bool, reason: impl FnOnce() -> String) -> Self {
        if passed {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail(reason())
        }
    }

    fn verdict(&self) -> &'static str {
        match self {
            CheckOutcome::Pass => "TRUE",
            CheckOutcome::Fail(_) | CheckOutcome::Error(_) => "FALSE",
            CheckOutcome::Skipped(_) => "SKIPPED",
        }
    }
}

/// Result of one check over one table or one pair of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// What was checked
    pub kind: CheckKind,

    /// Table(s) or directory the check ran on
    pub files: Vec<PathBuf>,

    /// Verdict
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckRecord {
    /// Record for a single table or directory.
    pub fn single(kind: CheckKind, file: &Path, outcome: CheckOutcome) -> Self {
        Self {
            kind,
            files: vec![file.to_path_buf()],
            outcome,
        }
    }

    /// Record for a pair of tables.
    pub fn pair(kind: CheckKind, a: &Path, b: &Path, outcome: CheckOutcome) -> Self {
        Self {
            kind,
            files: vec![a.to_path_buf(), b.to_path_buf()],
            outcome,
        }
    }

    /// One report line: `<kind> is TRUE|FALSE in|between <file(s)>.`
    pub fn report_line(&self) -> String {
        let location = match self.files.as_slice() {
            [a, b] => format!("between {} and {}", a.display(), b.display()),
            files => format!(
                "in {}",
                files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let line = format!("{} is {} {location}.", self.kind, self.outcome.verdict());
        match &self.outcome {
            CheckOutcome::Pass => line,
            CheckOutcome::Fail(reason) | CheckOutcome::Skipped(reason) => {
                format!("{line} {reason}")
            }
            CheckOutcome::Error(reason) => format!("{line} Error: {reason}"),
        }
    }
}

impl fmt::Display for CheckRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_line())
    }
}

/// Aggregated result of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteResult {
    records: Vec<CheckRecord>,
}

impl SuiteResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check record.
    pub fn push(&mut self, record: CheckRecord) {
        self.records.push(record);
    }

    /// True iff no check failed or errored. Skipped checks do not count.
    pub fn is_clean(&self) -> bool {
        !self.records.iter().any(|r| r.outcome.is_failure())
    }

    /// All records, in execution order.
    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    /// Records of a given kind.
    pub fn records_of(&self, kind: CheckKind) -> impl Iterator<Item = &CheckRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Failed or errored records.
    pub fn failures(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    /// Get the number of checks performed.
    pub fn check_count(&self) -> usize {
        self.records.len()
    }

    /// Get the number of passed checks.
    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_pass()).count()
    }

    /// Get the number of failed or errored checks.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Get the number of skipped checks.
    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_skipped()).count()
    }
}

impl fmt::Display for SuiteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_clean() { "PASSED" } else { "FAILED" };
        writeln!(
            f,
            "Leakage suite {status}: {}/{} checks passed, {} failed, {} skipped",
            self.passed_count(),
            self.check_count(),
            self.failed_count(),
            self.skipped_count()
        )?;

        for record in self.failures() {
            writeln!(f, "  - {}", record.report_line())?;
        }

        Ok(())
    }
}
