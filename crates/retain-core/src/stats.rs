//! Statistics aggregation.

use chrono::{DateTime, Utc};

use crate::types::{LearningStats, Question};

/// Roll up a tenant's questions into [`LearningStats`].
///
/// `due_questions` is evaluated against `now`; accuracy is the percentage of
/// correct reviews with two decimals, `"0.00"` before any review.
pub fn aggregate(questions: &[Question], now: DateTime<Utc>) -> LearningStats {
    let mut stats = LearningStats {
        total_questions: questions.len(),
        ..LearningStats::default()
    };

    for q in questions {
        if q.is_due(now) {
            stats.due_questions += 1;
        }
        stats.total_reviews += u64::from(q.review_count);
        stats.total_correct += u64::from(q.correct_count);
    }

    if stats.total_reviews > 0 {
        let percent = stats.total_correct as f64 / stats.total_reviews as f64 * 100.0;
        stats.accuracy = format!("{:.2}", percent);
    }

    stats
}
