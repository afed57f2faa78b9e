//! Question persistence.
//!
//! The review core depends only on the [`QuestionStore`] trait. Every
//! operation is scoped by tenant id; no call can reach another tenant's rows.

mod memory;
mod sqlite;

pub use memory::InMemoryQuestionStore;
pub use sqlite::SqliteQuestionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ErrorCode, RetainError, RetainResult};
use crate::types::Question;

/// Tenant-scoped CRUD and due queries over questions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Insert a new question.
    ///
    /// Fails with `DuplicateQuestion` if (tenant, id) already exists.
    async fn create(&self, tenant_id: &str, question: &Question) -> RetainResult<()>;

    /// Fetch one question, or `NotFound`.
    async fn get(&self, tenant_id: &str, id: &str) -> RetainResult<Question>;

    /// Overwrite the mutable fields of an existing question.
    ///
    /// This is a compare-and-swap on `question.version`: if the stored version
    /// differs the call fails with `Conflict` and nothing is written. On success
    /// the stored record, with its bumped version, is returned.
    async fn save(&self, tenant_id: &str, question: &Question) -> RetainResult<Question>;

    /// Remove a question, or `NotFound`.
    async fn delete(&self, tenant_id: &str, id: &str) -> RetainResult<()>;

    /// Questions with `next_review <= as_of`, ascending by `next_review`.
    async fn list_due(&self, tenant_id: &str, as_of: DateTime<Utc>) -> RetainResult<Vec<Question>>;

    /// Every question the tenant owns.
    async fn list(&self, tenant_id: &str) -> RetainResult<Vec<Question>>;
}

/// Reject a question whose owner differs from the tenant it is written under.
pub(crate) fn ensure_owner(tenant_id: &str, question: &Question) -> RetainResult<()> {
    if question.tenant_id == tenant_id {
        Ok(())
    } else {
        Err(RetainError::Validation {
            message: format!(
                "question '{}' belongs to tenant '{}', not '{}'",
                question.id, question.tenant_id, tenant_id
            ),
            code: ErrorCode::ValTenantMismatch,
        })
    }
}
