//! Leakage Checker
//!
//! Data leakage checks for train / validation / test cohort splits of
//! subject-level datasets, stored as TSV label tables.
//!
//! # Overview
//!
//! Split and k-fold tools write one table per diagnosis label and per
//! partition, each keyed by a (participant, session) pair. Before a model
//! is trained on those partitions this crate verifies that:
//!
//! - **Baseline uniqueness**: every baseline table holds one row per subject
//! - **Partition independence**: a train table and its evaluation table
//!   share no (participant, session) key
//! - **Subcategory independence**: subjects of a parent label used for
//!   training (e.g. MCI) are absent from evaluation tables of its
//!   sub-labels (e.g. sMCI, pMCI)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Leakage Checker                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  schema/     - Identifying columns, session ordering           │
//! │  table       - TSV loading, baseline extraction                │
//! │  naming      - Table roles from file names                     │
//! │  manifest    - Table roles from an explicit TOML manifest      │
//! │  checks      - Uniqueness and independence checks              │
//! │  suite       - Directory walk, per-fold grouping               │
//! │  validation  - Check records and suite results                 │
//! │  report      - Console and JSON reporting                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use leakage_checker::{LeakageSuite, CheckerConfig, SuiteMode};
//!
//! let suite = LeakageSuite::new(CheckerConfig::default());
//!
//! // Train + validation vs test
//! let split = suite.run("labels_lists", SuiteMode::SingleSplit)?;
//!
//! // Train vs validation, per fold
//! let folds = suite.run("labels_lists/train", SuiteMode::from_fold_count(5))?;
//!
//! if !(split.is_clean() && folds.is_clean()) {
//!     eprintln!("{split}{folds}");
//! }
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod prelude;
pub mod report;
pub mod schema;
pub mod suite;
pub mod table;
pub mod validation;

// Re-exports - Errors
pub use error::{CheckError, Result};

// Re-exports - Tables
pub use naming::{Partition, TableKind, TableRole};
pub use schema::{SessionKey, SessionOrder, TableSchema};
pub use table::LabelTable;

// Re-exports - Checks
pub use checks::{
    check_partition_independence, check_partition_independence_with, check_subject_uniqueness,
    check_subject_uniqueness_with, check_table_uniqueness, shared_keys, shared_subjects,
    tables_independent,
};

// Re-exports - Suite
pub use config::{CheckerConfig, SubcategoryRule};
pub use manifest::{Manifest, ManifestEntry};
pub use suite::{run_leakage_suite, LeakageSuite, SuiteMode};
pub use validation::{CheckKind, CheckOutcome, CheckRecord, SuiteResult};

// Re-exports - Reporting
pub use report::{CheckObserver, ConsoleReporter, NullObserver, SuiteReport};
