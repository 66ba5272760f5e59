//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use leakage_checker::prelude::*;
//!
//! let result = LeakageSuite::new(CheckerConfig::default())
//!     .with_observer(Box::new(ConsoleReporter::new()))
//!     .run("labels_lists", SuiteMode::SingleSplit)?;
//! assert!(result.is_clean());
//! ```
//!
//! # What's Included
//!
//! ## Suite
//! - [`LeakageSuite`] - Runs every check under a root directory
//! - [`SuiteMode`] - Single split or k-fold
//! - [`CheckerConfig`] - Suite configuration
//! - [`SuiteResult`] - Aggregated verdicts
//!
//! ## Tables
//! - [`LabelTable`] - Loaded label table
//! - [`TableSchema`] - Identifying columns
//! - [`SessionKey`] - (participant, session) key

pub use crate::checks::{check_partition_independence, check_subject_uniqueness};
pub use crate::config::{CheckerConfig, SubcategoryRule};
pub use crate::error::{CheckError, Result};
pub use crate::manifest::Manifest;
pub use crate::naming::{Partition, TableKind};
pub use crate::report::{CheckObserver, ConsoleReporter, SuiteReport};
pub use crate::schema::{SessionKey, TableSchema};
pub use crate::suite::{run_leakage_suite, LeakageSuite, SuiteMode};
pub use crate::table::LabelTable;
pub use crate::validation::{CheckKind, CheckOutcome, CheckRecord, SuiteResult};
