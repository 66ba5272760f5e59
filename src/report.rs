//! Check reporting.
//!
//! Suite runs notify a [`CheckObserver`] once per check and once at the
//! end. [`ConsoleReporter`] writes the human-readable report to stdout;
//! [`SuiteReport`] is the machine-readable JSON counterpart.

use crate::suite::SuiteMode;
use crate::validation::{CheckRecord, SuiteResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Receives check records as the suite produces them.
pub trait CheckObserver: Send + Sync {
    /// Called after each check.
    fn on_check(&self, record: &CheckRecord);

    /// Called when the suite completes.
    fn on_complete(&self, _result: &SuiteResult) {}
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CheckObserver for NullObserver {
    fn on_check(&self, _record: &CheckRecord) {}
}

/// Prints one line per check and a closing summary to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Only print failed and skipped checks.
    pub quiet: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only print checks that did not pass.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl CheckObserver for ConsoleReporter {
    fn on_check(&self, record: &CheckRecord) {
        if self.quiet && record.outcome.is_pass() {
            return;
        }
        println!("{}", record.report_line());
    }

    fn on_complete(&self, result: &SuiteResult) {
        println!();
        print!("{result}");
    }
}

/// Machine-readable summary of a suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Root directory or manifest that was checked
    pub root: PathBuf,

    /// `single_split`, `kfold` or `manifest`
    pub mode: String,

    /// Declared fold count (k-fold and manifest runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold_count: Option<usize>,

    /// RFC 3339 generation time
    pub generated_at: String,

    /// True iff no check failed
    pub clean: bool,

    pub checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Every check, in execution order
    pub records: Vec<CheckRecord>,
}

impl SuiteReport {
    /// Build a report for a directory run.
    pub fn new(root: &Path, mode: SuiteMode, result: &SuiteResult) -> Self {
        let (mode, fold_count) = match mode {
            SuiteMode::SingleSplit => ("single_split", None),
            SuiteMode::KFold { fold_count } => ("kfold", Some(fold_count)),
        };
        Self::build(root, mode, fold_count, result)
    }

    /// Build a report for a manifest run.
    pub fn for_manifest(manifest_path: &Path, fold_count: Option<usize>, result: &SuiteResult) -> Self {
        Self::build(manifest_path, "manifest", fold_count, result)
    }

    fn build(root: &Path, mode: &str, fold_count: Option<usize>, result: &SuiteResult) -> Self {
        Self {
            root: root.to_path_buf(),
            mode: mode.to_string(),
            fold_count,
            generated_at: chrono::Utc::now().to_rfc3339(),
            clean: result.is_clean(),
            checks: result.check_count(),
            passed: result.passed_count(),
            failed: result.failed_count(),
            skipped: result.skipped_count(),
            records: result.records().to_vec(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
