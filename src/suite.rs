//! Leakage suite over a directory of split tables.
//!
//! # Modes
//!
//! - **Single split** (`fold_count == 0`): the root holds one train /
//!   evaluation split, either as `train_baseline.tsv` + `test_baseline.tsv`
//!   (optionally label-prefixed) next to each other, or as `train/` and
//!   `test/` sub-directories of per-label tables. A missing side of the
//!   pair is a failed check.
//! - **K-fold** (`fold_count > 0`): the whole tree under the root is walked.
//!   Each directory is checked on its own: uniqueness for every table in
//!   it, independence for every train / validation baseline pair found in
//!   it. A directory holding only one side of a pair gets a skipped check.
//!
//! # Fold count
//!
//! The walk is not bounded by the fold count: every directory under the
//! root is visited. Afterwards the number of directories in which an
//! independence check ran is compared with the declared count. A mismatch
//! is logged, and recorded as a failed [`CheckKind::FoldCoverage`] check
//! when [`CheckerConfig::strict_fold_count`] is set.
//!
//! # Example
//!
//! ```ignore
//! use leakage_checker::{LeakageSuite, CheckerConfig, SuiteMode, ConsoleReporter};
//!
//! let suite = LeakageSuite::new(CheckerConfig::default())
//!     .with_observer(Box::new(ConsoleReporter::new()));
//!
//! let test_split = suite.run("labels_lists", SuiteMode::SingleSplit)?;
//! let folds = suite.run("labels_lists/train", SuiteMode::from_fold_count(5))?;
//! assert!(test_split.is_clean() && folds.is_clean());
//! ```

use crate::checks::{independence_outcome, subcategory_outcome, uniqueness_outcome};
use crate::config::CheckerConfig;
use crate::error::{CheckError, Result};
use crate::manifest::Manifest;
use crate::naming::{Partition, TableRole, BASELINE_SUFFIX, TABLE_EXTENSION};
use crate::report::{CheckObserver, ConsoleReporter, NullObserver};
use crate::table::LabelTable;
use crate::validation::{CheckKind, CheckOutcome, CheckRecord, SuiteResult};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How the tables under the root are organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteMode {
    /// One train / evaluation split directly under the root
    SingleSplit,
    /// Nested per-fold directories
    KFold {
        /// Declared number of folds
        fold_count: usize,
    },
}

impl SuiteMode {
    /// `0` selects single-split mode, anything else k-fold mode.
    pub fn from_fold_count(fold_count: usize) -> Self {
        if fold_count == 0 {
            SuiteMode::SingleSplit
        } else {
            SuiteMode::KFold { fold_count }
        }
    }

    /// True for k-fold mode.
    pub fn is_kfold(&self) -> bool {
        matches!(self, SuiteMode::KFold { .. })
    }
}

impl fmt::Display for SuiteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteMode::SingleSplit => write!(f, "single split"),
            SuiteMode::KFold { fold_count } => write!(f, "{fold_count}-fold"),
        }
    }
}

/// What to do when only one side of a train / evaluation pair exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPair {
    Fail,
    Skip,
}

/// A discovered table.
#[derive(Debug, Clone)]
struct TableEntry {
    path: PathBuf,
    /// Path shown in reports
    shown: PathBuf,
    role: TableRole,
}

#[derive(Debug, Default)]
struct GroupSummary {
    pairs_checked: usize,
    has_train: bool,
    has_eval: bool,
}

/// Accumulates records and forwards them to the observer.
struct Recorder<'a> {
    result: SuiteResult,
    observer: &'a dyn CheckObserver,
}

impl<'a> Recorder<'a> {
    fn new(observer: &'a dyn CheckObserver) -> Self {
        Self {
            result: SuiteResult::new(),
            observer,
        }
    }

    fn record(&mut self, record: CheckRecord) {
        if record.outcome.is_pass() {
            log::info!("{}", record.report_line());
        } else {
            log::warn!("{}", record.report_line());
        }
        self.observer.on_check(&record);
        self.result.push(record);
    }

    fn finish(self) -> SuiteResult {
        self.observer.on_complete(&self.result);
        self.result
    }
}

/// Runs the leakage checks over split tables.
pub struct LeakageSuite {
    config: CheckerConfig,
    observer: Box<dyn CheckObserver>,
}

impl Default for LeakageSuite {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}

impl fmt::Debug for LeakageSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakageSuite")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LeakageSuite {
    /// Create a silent suite with the given configuration.
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            config,
            observer: Box::new(NullObserver),
        }
    }

    /// Set the observer notified of every check.
    pub fn with_observer(mut self, observer: Box<dyn CheckObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the suite on a directory.
    ///
    /// # Errors
    ///
    /// Only configuration problems abort the run: an invalid
    /// [`CheckerConfig`] or a root that is not a directory. Unreadable or
    /// malformed tables become failed records.
    pub fn run<P: AsRef<Path>>(&self, root: P, mode: SuiteMode) -> Result<SuiteResult> {
        let root = root.as_ref();
        self.config.validate().map_err(CheckError::Config)?;
        if !root.is_dir() {
            return Err(CheckError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let eval = self.config.evaluation_partition(mode.is_kfold());
        log::info!(
            "Checking {} ({mode}, train vs {eval})",
            root.display()
        );

        let mut recorder = Recorder::new(self.observer.as_ref());
        match mode {
            SuiteMode::SingleSplit => self.run_single_split(root, eval, &mut recorder),
            SuiteMode::KFold { fold_count } => {
                self.run_kfold(root, fold_count, eval, &mut recorder)
            }
        }
        Ok(recorder.finish())
    }

    /// Run the suite on the tables listed in a manifest.
    ///
    /// Tables are grouped by fold; each group is checked like one k-fold
    /// directory, except the fold-less group whose pairs are mandatory.
    /// Fold groups pair train with validation and the fold-less group pairs
    /// train with test, unless a subset name is configured.
    pub fn run_manifest(&self, manifest: &Manifest) -> Result<SuiteResult> {
        self.config.validate().map_err(CheckError::Config)?;
        manifest.validate().map_err(CheckError::Config)?;

        let mut recorder = Recorder::new(self.observer.as_ref());

        let mut folds_checked = 0;
        for fold in manifest.folds() {
            let tables: Vec<TableEntry> = manifest
                .tables
                .iter()
                .filter(|t| t.fold == fold)
                .map(|t| TableEntry {
                    path: manifest.resolve(t),
                    shown: t.path.clone(),
                    role: TableRole {
                        label: t.label.clone(),
                        partition: Some(t.partition),
                        kind: t.kind,
                    },
                })
                .collect();

            let eval = self.config.evaluation_partition(fold.is_some());
            let policy = if fold.is_some() {
                MissingPair::Skip
            } else {
                MissingPair::Fail
            };
            let summary = self.check_group(&tables, eval, policy, &mut recorder);
            if fold.is_some() && summary.pairs_checked > 0 {
                folds_checked += 1;
            }
        }

        if let Some(fold_count) = manifest.fold_count {
            self.check_fold_coverage(manifest.base_dir(), fold_count, folds_checked, &mut recorder);
        }

        Ok(recorder.finish())
    }

    fn run_single_split(&self, root: &Path, eval: Partition, recorder: &mut Recorder<'_>) {
        let mut tables = Vec::new();
        for dir in [root.to_path_buf(), root.join("train"), root.join(eval.as_str())] {
            if dir.is_dir() {
                match list_tables(root, &dir) {
                    Ok(listing) => tables.extend(listing),
                    Err(e) => recorder.record(dir_error(root, &dir, &e)),
                }
            }
        }

        let summary = self.check_group(&tables, eval, MissingPair::Fail, recorder);
        if !summary.has_train && !summary.has_eval {
            for partition in [Partition::Train, eval] {
                let expected =
                    root.join(format!("{partition}{BASELINE_SUFFIX}.{TABLE_EXTENSION}"));
                recorder.record(CheckRecord::single(
                    CheckKind::PartitionIndependence,
                    &shown_path(root, &expected),
                    CheckOutcome::Error(CheckError::NotFound { path: expected }.to_string()),
                ));
            }
        }
    }

    fn run_kfold(
        &self,
        root: &Path,
        fold_count: usize,
        eval: Partition,
        recorder: &mut Recorder<'_>,
    ) {
        let mut folds_checked = 0;
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            log::debug!("Walking {}", dir.display());
            match list_tables(root, &dir) {
                Ok(listing) => {
                    let summary = self.check_group(&listing, eval, MissingPair::Skip, recorder);
                    if summary.pairs_checked > 0 {
                        folds_checked += 1;
                    }
                }
                Err(e) => recorder.record(dir_error(root, &dir, &e)),
            }

            match sub_directories(&dir) {
                // Reversed so that the stack pops them in sorted order
                Ok(subdirs) => pending.extend(subdirs.into_iter().rev()),
                Err(e) => recorder.record(dir_error(root, &dir, &e)),
            }
        }

        self.check_fold_coverage(root, fold_count, folds_checked, recorder);
    }

    fn check_fold_coverage(
        &self,
        root: &Path,
        fold_count: usize,
        folds_checked: usize,
        recorder: &mut Recorder<'_>,
    ) {
        let matches = folds_checked == fold_count;
        if !matches {
            log::warn!(
                "Declared {fold_count} folds but found {folds_checked} train/validation pairs under {}",
                root.display()
            );
        }
        if self.config.strict_fold_count {
            recorder.record(CheckRecord::single(
                CheckKind::FoldCoverage,
                root,
                CheckOutcome::from_verdict(matches, || {
                    format!("Expected {fold_count} folds, found {folds_checked}")
                }),
            ));
        }
    }

    /// Check one group of tables: one directory, or one manifest fold.
    fn check_group(
        &self,
        tables: &[TableEntry],
        eval: Partition,
        policy: MissingPair,
        recorder: &mut Recorder<'_>,
    ) -> GroupSummary {
        let max_keys = self.config.max_reported_keys;

        for entry in tables {
            let outcome = match self.load(entry) {
                Ok(table) => uniqueness_outcome(&table, entry.role.kind, max_keys),
                Err(e) => CheckOutcome::Error(e.to_string()),
            };
            recorder.record(CheckRecord::single(
                CheckKind::SubjectUniqueness,
                &entry.shown,
                outcome,
            ));
        }

        let pairs = pair_by_label(tables, eval);
        let mut summary = GroupSummary {
            has_train: pairs.values().any(|p| !p.train.is_empty()),
            has_eval: pairs.values().any(|p| !p.eval.is_empty()),
            ..Default::default()
        };

        for (label, pair) in &pairs {
            match (pair.train.is_empty(), pair.eval.is_empty()) {
                (false, false) => {
                    for train in &pair.train {
                        for held_out in &pair.eval {
                            self.check_pair(train, held_out, recorder);
                            summary.pairs_checked += 1;
                        }
                    }
                }
                (false, true) => {
                    self.missing_side(&pair.train, label.as_deref(), eval, policy, recorder)
                }
                (true, false) => self.missing_side(
                    &pair.eval,
                    label.as_deref(),
                    Partition::Train,
                    policy,
                    recorder,
                ),
                (true, true) => {}
            }
        }

        for rule in &self.config.subcategories {
            let parent = pairs.get(&Some(rule.parent.clone()));
            let Some(parent) = parent.filter(|p| !p.train.is_empty()) else {
                continue;
            };
            for child in &rule.children {
                let Some(child) = pairs.get(&Some(child.clone())) else {
                    continue;
                };
                for train in &parent.train {
                    for held_out in &child.eval {
                        let outcome = match (self.load(train), self.load(held_out)) {
                            (Ok(a), Ok(b)) => subcategory_outcome(&a, &b, max_keys),
                            (Err(e), _) | (_, Err(e)) => CheckOutcome::Error(e.to_string()),
                        };
                        recorder.record(CheckRecord::pair(
                            CheckKind::SubcategoryIndependence,
                            &train.shown,
                            &held_out.shown,
                            outcome,
                        ));
                    }
                }
            }
        }

        summary
    }

    fn check_pair(&self, train: &TableEntry, held_out: &TableEntry, recorder: &mut Recorder<'_>) {
        let outcome = match (self.load(train), self.load(held_out)) {
            (Ok(a), Ok(b)) => independence_outcome(&a, &b, self.config.max_reported_keys),
            (Err(e), _) | (_, Err(e)) => CheckOutcome::Error(e.to_string()),
        };
        recorder.record(CheckRecord::pair(
            CheckKind::PartitionIndependence,
            &train.shown,
            &held_out.shown,
            outcome,
        ));
    }

    fn missing_side(
        &self,
        present: &[&TableEntry],
        label: Option<&str>,
        missing: Partition,
        policy: MissingPair,
        recorder: &mut Recorder<'_>,
    ) {
        for entry in present {
            let expected_name = match label {
                Some(label) => format!("{label}_{missing}{BASELINE_SUFFIX}.{TABLE_EXTENSION}"),
                None => format!("{missing}{BASELINE_SUFFIX}.{TABLE_EXTENSION}"),
            };
            let expected = entry.shown.with_file_name(&expected_name);
            let outcome = match policy {
                MissingPair::Fail => CheckOutcome::Error(
                    CheckError::NotFound {
                        path: expected.clone(),
                    }
                    .to_string(),
                ),
                MissingPair::Skip => {
                    CheckOutcome::Skipped(format!("No {missing} baseline table next to it"))
                }
            };
            recorder.record(CheckRecord::pair(
                CheckKind::PartitionIndependence,
                &entry.shown,
                &expected,
                outcome,
            ));
        }
    }

    fn load(&self, entry: &TableEntry) -> Result<LabelTable> {
        LabelTable::load(&entry.path, &self.config.schema)
    }
}

/// Run the suite with the default configuration, printing the report.
///
/// `fold_count == 0` checks a single train / test split directly under
/// `root`; a positive count walks the per-fold directories under `root`.
pub fn run_leakage_suite<P: AsRef<Path>>(root: P, fold_count: usize) -> Result<SuiteResult> {
    LeakageSuite::default()
        .with_observer(Box::new(ConsoleReporter::new()))
        .run(root, SuiteMode::from_fold_count(fold_count))
}

#[derive(Debug, Default)]
struct PairTables<'a> {
    train: Vec<&'a TableEntry>,
    eval: Vec<&'a TableEntry>,
}

/// Baseline tables of the train and evaluation partitions, by label.
fn pair_by_label(tables: &[TableEntry], eval: Partition) -> BTreeMap<Option<String>, PairTables<'_>> {
    let mut pairs: BTreeMap<Option<String>, PairTables<'_>> = BTreeMap::new();
    for entry in tables.iter().filter(|t| t.role.is_baseline()) {
        match entry.role.partition {
            Some(Partition::Train) => pairs
                .entry(entry.role.label.clone())
                .or_default()
                .train
                .push(entry),
            Some(p) if p == eval => pairs
                .entry(entry.role.label.clone())
                .or_default()
                .eval
                .push(entry),
            _ => {}
        }
    }
    pairs
}

/// Tables directly inside `dir`, sorted by file name.
fn list_tables(root: &Path, dir: &Path) -> Result<Vec<TableEntry>> {
    let mut tables = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CheckError::io(dir, e))? {
        let entry = entry.map_err(|e| CheckError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(mut role) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(TableRole::from_file_name)
        else {
            continue;
        };
        // Tables directly under the root never inherit from the root's name
        if role.partition.is_none() && dir != root {
            role.partition = dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Partition::parse);
        }
        tables.push(TableEntry {
            shown: shown_path(root, &path),
            path,
            role,
        });
    }
    tables.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(tables)
}

/// Real (non-symlinked) sub-directories of `dir`, sorted.
fn sub_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CheckError::io(dir, e))? {
        let entry = entry.map_err(|e| CheckError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| CheckError::io(&entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn shown_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

fn dir_error(root: &Path, dir: &Path, err: &CheckError) -> CheckRecord {
    CheckRecord::single(
        CheckKind::SubjectUniqueness,
        &shown_path(root, dir),
        CheckOutcome::Error(err.to_string()),
    )
}
