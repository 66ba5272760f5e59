//! Label Table Schema
//!
//! Names the identifying columns of a label table. Every table is keyed by
//! a (participant, session) pair; all other columns (diagnosis, age, sex,
//! clinical scores) are carried by the upstream tools and ignored here.
//!
//! # Example
//!
//! ```
//! use leakage_checker::schema::TableSchema;
//!
//! let schema = TableSchema::default();
//! assert_eq!(schema.subject_column, "participant_id");
//! assert_eq!(schema.session_column, "session_id");
//! assert!(schema.validate().is_ok());
//! ```

mod key;

pub use key::{SessionKey, SessionOrder};

use serde::{Deserialize, Serialize};

/// Default participant identifier column (BIDS convention)
pub const DEFAULT_SUBJECT_COLUMN: &str = "participant_id";

/// Default session identifier column (BIDS convention)
pub const DEFAULT_SESSION_COLUMN: &str = "session_id";

/// Identifying columns of a label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column holding the participant identifier
    #[serde(default = "default_subject_column")]
    pub subject_column: String,

    /// Column holding the session identifier
    #[serde(default = "default_session_column")]
    pub session_column: String,
}

fn default_subject_column() -> String {
    DEFAULT_SUBJECT_COLUMN.to_string()
}

fn default_session_column() -> String {
    DEFAULT_SESSION_COLUMN.to_string()
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            subject_column: default_subject_column(),
            session_column: default_session_column(),
        }
    }
}

impl TableSchema {
    /// Create a schema with custom column names.
    pub fn new(subject_column: &str, session_column: &str) -> Self {
        Self {
            subject_column: subject_column.to_string(),
            session_column: session_column.to_string(),
        }
    }

    /// Validate the schema.
    pub fn validate(&self) -> Result<(), String> {
        if self.subject_column.trim().is_empty() {
            return Err("subject_column cannot be empty".to_string());
        }
        if self.session_column.trim().is_empty() {
            return Err("session_column cannot be empty".to_string());
        }
        if self.subject_column == self.session_column {
            return Err(format!(
                "subject_column and session_column must differ, both are '{}'",
                self.subject_column
            ));
        }
        Ok(())
    }
}
