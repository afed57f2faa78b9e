//! Question types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::Level;
use crate::identity::question_id;

/// A question/answer pair with its review state, owned by one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Content-derived key, unique within the tenant.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: String,
    pub question_text: String,
    pub answer_text: String,
    /// Where the question was imported from (usually a file path).
    pub source: String,
    pub level: Level,
    /// The question is due once this is not after the reference time.
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
    pub correct_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by every successful save.
    pub version: u64,
}

impl Question {
    /// Create a fresh, immediately due question for `tenant_id`.
    ///
    /// The question text is trimmed before it is keyed and stored.
    pub fn new(tenant_id: impl Into<String>, input: NewQuestion, now: DateTime<Utc>) -> Self {
        let tenant_id = tenant_id.into();
        let question_text = input.question_text.trim().to_string();
        Self {
            id: question_id(&tenant_id, &question_text),
            tenant_id,
            question_text,
            answer_text: input.answer_text.trim().to_string(),
            source: input.source,
            level: Level::UNKNOWN,
            next_review: now,
            review_count: 0,
            correct_count: 0,
            created_at: now,
            last_reviewed: None,
            updated_at: now,
            version: 1,
        }
    }

    /// Whether the question is due at `as_of`.
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review <= as_of
    }

    /// Fraction of reviews answered correctly, or `None` before the first review.
    pub fn accuracy(&self) -> Option<f64> {
        if self.review_count == 0 {
            None
        } else {
            Some(self.correct_count as f64 / self.review_count as f64)
        }
    }

    pub fn summary(&self) -> QuestionSummary {
        QuestionSummary::from(self)
    }
}

/// Raw question content supplied by an import collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    #[serde(rename = "question")]
    pub question_text: String,
    #[serde(rename = "answer")]
    pub answer_text: String,
    #[serde(default)]
    pub source: String,
}

impl NewQuestion {
    pub fn new(
        question_text: impl Into<String>,
        answer_text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            question_text: question_text.into(),
            answer_text: answer_text.into(),
            source: source.into(),
        }
    }
}

/// The shape of a due question handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: String,
    #[serde(rename = "question")]
    pub question_text: String,
    #[serde(rename = "answer")]
    pub answer_text: String,
    pub review_count: u32,
    pub correct_count: u32,
    pub source: String,
}

impl From<&Question> for QuestionSummary {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question_text: q.question_text.clone(),
            answer_text: q.answer_text.clone(),
            review_count: q.review_count,
            correct_count: q.correct_count,
            source: q.source.clone(),
        }
    }
}
