//! Label table loading and baseline extraction.
//!
//! A label table is a tab-separated file with a header row. Only the two
//! identifying columns named by the [`TableSchema`] are read; every other
//! column is ignored.
//!
//! # Example
//!
//! ```ignore
//! use leakage_checker::{LabelTable, TableSchema};
//!
//! let table = LabelTable::load("labels/train/AD.tsv", &TableSchema::default())?;
//! let baseline = table.baseline_view();
//! assert!(baseline.duplicate_subjects().is_empty());
//! ```

use crate::error::{CheckError, Result};
use crate::schema::{SessionKey, SessionOrder, TableSchema};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// In-memory view of a label table: its rows' composite keys, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    name: String,
    path: Option<PathBuf>,
    records: Vec<SessionKey>,
}

impl LabelTable {
    /// Build a table from in-memory records.
    pub fn from_records(name: &str, records: Vec<SessionKey>) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            records,
        }
    }

    /// Load a TSV label table from disk.
    ///
    /// # Errors
    ///
    /// - [`CheckError::NotFound`] if `path` does not exist
    /// - [`CheckError::MalformedTable`] if an identifier column is missing,
    ///   a row is ragged, or an identifier cell is empty
    /// - [`CheckError::Io`] for any other read failure
    pub fn load<P: AsRef<Path>>(path: P, schema: &TableSchema) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CheckError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| from_csv(path, e))?;

        let headers = reader.headers().map_err(|e| from_csv(path, e))?.clone();
        let subject_idx = column_index(&headers, &schema.subject_column, path)?;
        let session_idx = column_index(&headers, &schema.session_column, path)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| from_csv(path, e))?;
            let line = row.position().map_or(0, |p| p.line());

            let subject = row.get(subject_idx).unwrap_or_default();
            let session = row.get(session_idx).unwrap_or_default();
            if subject.is_empty() {
                return Err(CheckError::malformed(
                    path,
                    format!("empty '{}' at line {line}", schema.subject_column),
                ));
            }
            if session.is_empty() {
                return Err(CheckError::malformed(
                    path,
                    format!("empty '{}' at line {line}", schema.session_column),
                ));
            }
            records.push(SessionKey::new(subject, session));
        }

        log::debug!("Loaded {} rows from {}", records.len(), path.display());

        Ok(Self {
            name: display_name(path),
            path: Some(path.to_path_buf()),
            records,
        })
    }

    /// Display name (file name for loaded tables).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source path, if loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows in file order.
    pub fn records(&self) -> &[SessionKey] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set of composite keys.
    pub fn keys(&self) -> HashSet<&SessionKey> {
        self.records.iter().collect()
    }

    /// Set of distinct subject identifiers.
    pub fn subjects(&self) -> BTreeSet<&str> {
        self.records.iter().map(|k| k.subject.as_str()).collect()
    }

    /// Subjects appearing on more than one row, with their row counts.
    pub fn duplicate_subjects(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for key in &self.records {
            *counts.entry(key.subject.as_str()).or_default() += 1;
        }
        counts.retain(|_, n| *n > 1);
        counts
    }

    /// Derive the baseline view: one row per subject, its earliest session.
    ///
    /// Subjects keep the order of their first appearance. When two rows of
    /// a subject share the same session ordering, the earlier row wins.
    pub fn baseline_view(&self) -> LabelTable {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut baseline: Vec<SessionKey> = Vec::new();

        for key in &self.records {
            match position.get(key.subject.as_str()) {
                Some(&idx) => {
                    if SessionOrder::of(&key.session) < SessionOrder::of(&baseline[idx].session) {
                        baseline[idx] = key.clone();
                    }
                }
                None => {
                    position.insert(key.subject.as_str(), baseline.len());
                    baseline.push(key.clone());
                }
            }
        }

        LabelTable {
            name: self.name.clone(),
            path: self.path.clone(),
            records: baseline,
        }
    }
}

fn column_index(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        CheckError::malformed(
            path,
            format!(
                "missing column '{column}' (available: {:?})",
                headers.iter().collect::<Vec<_>>()
            ),
        )
    })
}

fn from_csv(path: &Path, err: csv::Error) -> CheckError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => CheckError::io(path, source),
        _ => CheckError::malformed(path, reason),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
