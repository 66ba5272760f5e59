//! Checker configuration management.
//!
//! One struct holding every knob of a suite run, with serialization support
//! so that the checks applied to a dataset can be versioned next to it.
//!
//! # Features
//!
//! - **Serialization**: Save/load configurations to TOML or JSON
//! - **Validation**: Reject unusable configurations before any table is read
//! - **Defaults**: An empty file is a valid configuration
//!
//! # Example
//!
//! ```ignore
//! use leakage_checker::config::CheckerConfig;
//!
//! let config = CheckerConfig::default()
//!     .with_subset_name("validation")
//!     .with_strict_fold_count(true);
//!
//! config.save_toml("leakage.toml")?;
//! let loaded = CheckerConfig::load_toml("leakage.toml")?;
//! ```
//!
//! # Example TOML
//!
//! ```toml
//! subset_name = "test"
//! strict_fold_count = false
//! max_reported_keys = 10
//!
//! [schema]
//! subject_column = "participant_id"
//! session_column = "session_id"
//!
//! [[subcategories]]
//! parent = "MCI"
//! children = ["sMCI", "pMCI"]
//! ```

use crate::checks::DEFAULT_MAX_REPORTED_KEYS;
use crate::naming::Partition;
use crate::schema::TableSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A parent diagnosis label and the labels it was subdivided into.
///
/// Subjects of `parent` seen in training must not appear in the evaluation
/// tables of any child label, since a model pretrained on the parent task
/// and transferred to a child task would otherwise have seen them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryRule {
    /// Parent label (e.g. "MCI")
    pub parent: String,

    /// Sub-labels (e.g. "sMCI", "pMCI")
    pub children: Vec<String>,
}

impl SubcategoryRule {
    /// Create a new rule.
    pub fn new(parent: &str, children: &[&str]) -> Self {
        Self {
            parent: parent.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Validate the rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.parent.trim().is_empty() {
            return Err("parent label cannot be empty".to_string());
        }
        if self.children.is_empty() {
            return Err(format!("'{}' must list at least one child label", self.parent));
        }
        if self.children.iter().any(|c| c.trim().is_empty()) {
            return Err(format!("'{}' has an empty child label", self.parent));
        }
        if self.children.contains(&self.parent) {
            return Err(format!("'{}' cannot be its own child", self.parent));
        }
        Ok(())
    }
}

/// Unified checker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Evaluation partition paired with `train`.
    ///
    /// `None` selects `test` for single-split runs and `validation` for
    /// k-fold runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset_name: Option<String>,

    /// Turn a mismatch between the declared fold count and the folds found
    /// on disk into a failed check instead of a warning.
    #[serde(default)]
    pub strict_fold_count: bool,

    /// Maximum offending identifiers listed per failed check
    #[serde(default = "default_max_reported_keys")]
    pub max_reported_keys: usize,

    /// Identifying columns
    #[serde(default)]
    pub schema: TableSchema,

    /// Parent / sub-label rules
    #[serde(default = "default_subcategories")]
    pub subcategories: Vec<SubcategoryRule>,
}

fn default_max_reported_keys() -> usize {
    DEFAULT_MAX_REPORTED_KEYS
}

fn default_subcategories() -> Vec<SubcategoryRule> {
    vec![SubcategoryRule::new("MCI", &["sMCI", "pMCI"])]
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            subset_name: None,
            strict_fold_count: false,
            max_reported_keys: default_max_reported_keys(),
            schema: TableSchema::default(),
            subcategories: default_subcategories(),
        }
    }
}

impl CheckerConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifying columns.
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the evaluation partition name.
    pub fn with_subset_name(mut self, subset_name: &str) -> Self {
        self.subset_name = Some(subset_name.to_string());
        self
    }

    /// Enable or disable strict fold counting.
    pub fn with_strict_fold_count(mut self, strict: bool) -> Self {
        self.strict_fold_count = strict;
        self
    }

    /// Set the cap on reported identifiers.
    pub fn with_max_reported_keys(mut self, max: usize) -> Self {
        self.max_reported_keys = max;
        self
    }

    /// Replace the subcategory rules.
    pub fn with_subcategories(mut self, rules: Vec<SubcategoryRule>) -> Self {
        self.subcategories = rules;
        self
    }

    /// Evaluation partition for a run.
    ///
    /// Falls back to `validation` for k-fold runs and `test` otherwise when
    /// no subset name is configured.
    pub fn evaluation_partition(&self, kfold: bool) -> Partition {
        self.subset_name
            .as_deref()
            .and_then(Partition::parse)
            .unwrap_or(if kfold {
                Partition::Validation
            } else {
                Partition::Test
            })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.schema.validate().map_err(|e| format!("schema: {e}"))?;

        if let Some(name) = &self.subset_name {
            match Partition::parse(name) {
                Some(p) if p.is_evaluation() => {}
                _ => {
                    return Err(format!(
                        "subset_name must be 'validation' or 'test', got '{name}'"
                    ))
                }
            }
        }

        if self.max_reported_keys == 0 {
            return Err("max_reported_keys must be > 0".to_string());
        }

        for rule in &self.subcategories {
            rule.validate().map_err(|e| format!("subcategories: {e}"))?;
        }

        Ok(())
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CheckerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CheckerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
