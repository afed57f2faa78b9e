//! Question import.
//!
//! Markdown files are parsed into [`NewQuestion`](crate::types::NewQuestion)s,
//! which [`ReviewService`](crate::ReviewService) then keys and inserts.
//!
//! # Example
//!
//! ```ignore
//! use retain_core::import::markdown;
//!
//! let parsed = markdown::parse_dirs(&["questions"])?;
//! let report = service.import_batch("alice", parsed).await;
//! println!("Imported {}, skipped {}", report.imported, report.skipped);
//! ```

pub mod markdown;

use serde::{Deserialize, Serialize};

/// Result of importing a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// A new question was stored under this id.
    Created(String),
    /// The tenant already had a question with this id.
    Skipped(String),
}

impl ImportOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Skipped(id) => id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Statistics from a batch import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Newly stored questions.
    pub imported: u64,
    /// Already present for the tenant.
    pub skipped: u64,
    /// Repeated within the batch itself.
    pub duplicates: u64,
    /// Failed to store.
    pub failed: u64,
    /// Error messages for failed imports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total questions seen.
    pub fn total(&self) -> u64 {
        self.imported + self.skipped + self.duplicates + self.failed
    }

    /// Check if import completed without errors.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
