//! Explicit table manifest.
//!
//! An alternative to the file-name contract of [`naming`](crate::naming):
//! each table is listed with its partition, kind, label and fold. Relative
//! paths are resolved against the manifest's own directory.
//!
//! # Example TOML
//!
//! ```toml
//! fold_count = 2
//!
//! [[tables]]
//! path = "split-0/train_baseline.tsv"
//! partition = "train"
//! kind = "baseline"
//! fold = 0
//!
//! [[tables]]
//! path = "split-0/validation_baseline.tsv"
//! partition = "validation"
//! kind = "baseline"
//! fold = 0
//! ```

use crate::error::{CheckError, Result};
use crate::naming::{Partition, TableKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One table listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Table path, relative to the manifest directory or absolute
    pub path: PathBuf,

    /// Partition the table belongs to
    pub partition: Partition,

    /// Baseline or longitudinal
    pub kind: TableKind,

    /// Diagnosis label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Cross-validation fold; `None` for single-split tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fold: Option<usize>,
}

/// A list of tables with explicit roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared number of folds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fold_count: Option<usize>,

    /// Listed tables
    #[serde(default)]
    pub tables: Vec<ManifestEntry>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl Manifest {
    /// Create a manifest whose relative paths resolve against `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P, tables: Vec<ManifestEntry>) -> Self {
        Self {
            fold_count: None,
            tables,
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Declare the number of folds.
    pub fn with_fold_count(mut self, fold_count: usize) -> Self {
        self.fold_count = Some(fold_count);
        self
    }

    /// Load and validate a manifest from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CheckError::io(path, e))?;
        let mut manifest: Manifest = toml::from_str(&contents)
            .map_err(|e| CheckError::Config(format!("{}: {e}", path.display())))?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        manifest.validate().map_err(CheckError::Config)?;
        Ok(manifest)
    }

    /// Save the manifest to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve an entry's path.
    pub fn resolve(&self, entry: &ManifestEntry) -> PathBuf {
        if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            self.base_dir.join(&entry.path)
        }
    }

    /// Distinct folds referenced by the manifest, `None` first.
    pub fn folds(&self) -> Vec<Option<usize>> {
        let mut folds: Vec<Option<usize>> = self.tables.iter().map(|t| t.fold).collect();
        folds.sort_unstable();
        folds.dedup();
        folds
    }

    /// Validate the manifest.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tables.is_empty() {
            return Err("manifest lists no tables".to_string());
        }

        let mut seen = HashSet::new();
        for entry in &self.tables {
            if entry.path.as_os_str().is_empty() {
                return Err("manifest entry with empty path".to_string());
            }
            if !seen.insert(&entry.path) {
                return Err(format!("duplicate manifest entry: {}", entry.path.display()));
            }
            if let (Some(fold), Some(count)) = (entry.fold, self.fold_count) {
                if fold >= count {
                    return Err(format!(
                        "{}: fold {fold} out of range for fold_count {count}",
                        entry.path.display()
                    ));
                }
            }
        }

        Ok(())
    }
}
