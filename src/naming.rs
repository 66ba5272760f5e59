//! Table naming contract.
//!
//! Split tools write one TSV per diagnosis label and per partition. The role
//! of a table is read from its file name:
//!
//! | File name                     | Label | Partition  | Kind         |
//! |-------------------------------|-------|------------|--------------|
//! | `train_baseline.tsv`          | -     | train      | baseline     |
//! | `validation_baseline.tsv`     | -     | validation | baseline     |
//! | `AD_test_baseline.tsv`        | AD    | test       | baseline     |
//! | `AD_train.tsv`                | AD    | train      | longitudinal |
//! | `CN_baseline.tsv`             | CN    | inherited  | baseline     |
//! | `CN.tsv`                      | CN    | inherited  | longitudinal |
//!
//! A table whose name carries no partition token inherits the partition of
//! its parent directory when that directory is itself named `train`,
//! `validation` or `test`. Only `.tsv` files are tables.
//!
//! Projects that cannot follow this contract describe their tables in a
//! [`Manifest`](crate::manifest::Manifest) instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Table file extension.
pub const TABLE_EXTENSION: &str = "tsv";

/// Suffix marking a baseline table.
pub const BASELINE_SUFFIX: &str = "_baseline";

/// Cohort partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Used to update model weights
    Train,
    /// Used for model selection / early stopping
    #[serde(alias = "val")]
    Validation,
    /// Held out for the final evaluation
    Test,
}

impl Partition {
    /// Parse a partition token (`train`, `validation`/`val`, `test`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "train" => Some(Partition::Train),
            "validation" | "val" => Some(Partition::Validation),
            "test" => Some(Partition::Test),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Validation => "validation",
            Partition::Test => "test",
        }
    }

    /// True for partitions a model is evaluated on.
    pub fn is_evaluation(&self) -> bool {
        !matches!(self, Partition::Train)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Baseline (one session per subject) or longitudinal (any number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Baseline,
    Longitudinal,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Baseline => f.write_str("baseline"),
            TableKind::Longitudinal => f.write_str("longitudinal"),
        }
    }
}

/// Role of a table within a split, as read from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRole {
    /// Diagnosis label (`AD`, `CN`, `sMCI`, ...), if the name carries one
    pub label: Option<String>,

    /// Partition, from the name or the parent directory
    pub partition: Option<Partition>,

    /// Baseline or longitudinal
    pub kind: TableKind,
}

impl TableRole {
    /// Parse a file name. Returns `None` for non-table files.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.starts_with('.') {
            return None;
        }
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() || !extension.eq_ignore_ascii_case(TABLE_EXTENSION) {
            return None;
        }

        let (rest, kind) = if stem == "baseline" {
            ("", TableKind::Baseline)
        } else if let Some(rest) = stem.strip_suffix(BASELINE_SUFFIX) {
            (rest, TableKind::Baseline)
        } else {
            (stem, TableKind::Longitudinal)
        };

        let (label, partition) = split_partition(rest);
        Some(Self {
            label: label.map(str::to_string),
            partition,
            kind,
        })
    }

    /// Parse a path, inheriting the partition from the parent directory.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let mut role = Self::from_file_name(file_name)?;
        if role.partition.is_none() {
            role.partition = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .and_then(Partition::parse);
        }
        Some(role)
    }

    /// True for baseline tables.
    pub fn is_baseline(&self) -> bool {
        self.kind == TableKind::Baseline
    }
}

/// Split `<label>_<partition>` / `<partition>` / `<label>`.
fn split_partition(rest: &str) -> (Option<&str>, Option<Partition>) {
    if rest.is_empty() {
        return (None, None);
    }
    if let Some(partition) = Partition::parse(rest) {
        return (None, Some(partition));
    }
    if let Some((label, token)) = rest.rsplit_once('_') {
        if let Some(partition) = Partition::parse(token) {
            let label = (!label.is_empty()).then_some(label);
            return (label, Some(partition));
        }
    }
    (Some(rest), None)
}
