//! Per-tenant learning statistics.

use serde::{Deserialize, Serialize};

/// Rollup over a tenant's full question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStats {
    pub total_questions: usize,
    pub due_questions: usize,
    pub total_reviews: u64,
    pub total_correct: u64,
    /// Percentage of correct reviews, two decimals (e.g. `"83.33"`).
    pub accuracy: String,
}

impl LearningStats {
    /// Accuracy as a number, for callers that need arithmetic.
    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy.parse().unwrap_or(0.0)
    }
}

impl Default for LearningStats {
    fn default() -> Self {
        Self {
            total_questions: 0,
            due_questions: 0,
            total_reviews: 0,
            total_correct: 0,
            accuracy: "0.00".to_string(),
        }
    }
}
