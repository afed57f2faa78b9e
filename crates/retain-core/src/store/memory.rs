//! In-memory question store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ensure_owner, QuestionStore};
use crate::error::{RetainError, RetainResult};
use crate::types::Question;

/// Question store kept in process memory.
///
/// Questions are held per tenant in insertion order, so equal `next_review`
/// values list in the order they were created. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryQuestionStore {
    tenants: RwLock<HashMap<String, Vec<Question>>>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of questions across all tenants.
    pub async fn len(&self) -> usize {
        self.tenants.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn create(&self, tenant_id: &str, question: &Question) -> RetainResult<()> {
        ensure_owner(tenant_id, question)?;
        let mut tenants = self.tenants.write().await;
        let questions = tenants.entry(tenant_id.to_string()).or_default();

        if questions.iter().any(|q| q.id == question.id) {
            return Err(RetainError::duplicate(&question.id));
        }
        questions.push(question.clone());
        Ok(())
    }

    async fn get(&self, tenant_id: &str, id: &str) -> RetainResult<Question> {
        let tenants = self.tenants.read().await;
        tenants
            .get(tenant_id)
            .and_then(|questions| questions.iter().find(|q| q.id == id))
            .cloned()
            .ok_or_else(|| RetainError::not_found(tenant_id, id))
    }

    async fn save(&self, tenant_id: &str, question: &Question) -> RetainResult<Question> {
        ensure_owner(tenant_id, question)?;
        let mut tenants = self.tenants.write().await;
        let stored = tenants
            .get_mut(tenant_id)
            .and_then(|questions| questions.iter_mut().find(|q| q.id == question.id))
            .ok_or_else(|| RetainError::not_found(tenant_id, &question.id))?;

        if stored.version != question.version {
            return Err(RetainError::conflict(&question.id));
        }

        // Identity and creation time are fixed at create.
        *stored = Question {
            id: stored.id.clone(),
            tenant_id: stored.tenant_id.clone(),
            created_at: stored.created_at,
            version: stored.version + 1,
            ..question.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> RetainResult<()> {
        let mut tenants = self.tenants.write().await;
        let questions = tenants
            .get_mut(tenant_id)
            .ok_or_else(|| RetainError::not_found(tenant_id, id))?;

        let index = questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| RetainError::not_found(tenant_id, id))?;
        questions.remove(index);
        Ok(())
    }

    async fn list_due(&self, tenant_id: &str, as_of: DateTime<Utc>) -> RetainResult<Vec<Question>> {
        let questions = self.list(tenant_id).await?;
        Ok(crate::due::select_due(questions, as_of))
    }

    async fn list(&self, tenant_id: &str) -> RetainResult<Vec<Question>> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_id).cloned().unwrap_or_default())
    }
}
