//! The review service: the operations presentation layers call.
//!
//! `ReviewService` ties identity keying, the scheduling engine, due selection
//! and statistics to a [`QuestionStore`]. It holds no state of its own, so one
//! instance can be shared across tasks behind an `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::RetainConfig;
use crate::due::DueSetSelector;
use crate::error::{ErrorCode, RetainError, RetainResult};
use crate::import::{ImportOutcome, ImportReport};
use crate::scheduling::SchedulingEngine;
use crate::stats::aggregate;
use crate::store::{QuestionStore, SqliteQuestionStore};
use crate::types::{Feedback, LearningStats, NewQuestion, Question, QuestionSummary};

/// Default number of extra attempts after a concurrent update conflict.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Tenant-scoped import, review and reporting over a question store.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn QuestionStore>,
    engine: SchedulingEngine,
    max_conflict_retries: u32,
}

impl ReviewService {
    /// Create a service with the default scheduling policy.
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self {
            store,
            engine: SchedulingEngine::new(),
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Create a service over `store` using the schedule and retry settings of `config`.
    pub fn from_config(store: Arc<dyn QuestionStore>, config: &RetainConfig) -> Self {
        Self::new(store)
            .with_engine(SchedulingEngine::with_params(config.schedule.clone()))
            .with_max_conflict_retries(config.max_conflict_retries)
    }

    /// Open the SQLite database named by `config` and build a service over it.
    pub fn open(config: &RetainConfig) -> RetainResult<Self> {
        config.validate()?;
        let store = SqliteQuestionStore::new(&config.database_path)?;
        Ok(Self::from_config(Arc::new(store), config))
    }

    pub fn with_engine(mut self, engine: SchedulingEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn engine(&self) -> &SchedulingEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn QuestionStore> {
        &self.store
    }

    /// Import one question, skipping it if the tenant already has it.
    pub async fn import_question(
        &self,
        tenant_id: &str,
        input: NewQuestion,
    ) -> RetainResult<ImportOutcome> {
        self.import_question_at(tenant_id, input, Utc::now()).await
    }

    #[tracing::instrument(skip(self, input), fields(source = %input.source))]
    pub async fn import_question_at(
        &self,
        tenant_id: &str,
        input: NewQuestion,
        now: DateTime<Utc>,
    ) -> RetainResult<ImportOutcome> {
        ensure_tenant(tenant_id)?;
        if input.question_text.trim().is_empty() {
            return Err(RetainError::Validation {
                message: "question text must not be empty".to_string(),
                code: ErrorCode::ValMissingField,
            });
        }

        let question = Question::new(tenant_id, input, now);
        match self.store.create(tenant_id, &question).await {
            Ok(()) => Ok(ImportOutcome::Created(question.id)),
            Err(e) if e.is_duplicate() => Ok(ImportOutcome::Skipped(question.id)),
            Err(e) => Err(e),
        }
    }

    /// Import a batch of parsed questions.
    ///
    /// Repeats within the batch are counted as duplicates and not sent to the
    /// store. Per-question failures are logged and counted; they do not stop
    /// the batch.
    pub async fn import_batch(&self, tenant_id: &str, batch: Vec<NewQuestion>) -> ImportReport {
        let now = Utc::now();
        let mut report = ImportReport::new();
        let mut seen = HashSet::new();

        for input in batch {
            if !seen.insert(input.question_text.trim().to_string()) {
                report.duplicates += 1;
                continue;
            }

            match self.import_question_at(tenant_id, input, now).await {
                Ok(ImportOutcome::Created(_)) => report.imported += 1,
                Ok(ImportOutcome::Skipped(_)) => report.skipped += 1,
                Err(e) => {
                    warn!(tenant_id, error = %e, "Failed to import question");
                    report.failed += 1;
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(
            tenant_id,
            imported = report.imported,
            skipped = report.skipped,
            duplicates = report.duplicates,
            failed = report.failed,
            "Import finished"
        );
        report
    }

    /// Summaries of the tenant's due questions, oldest-overdue first.
    #[tracing::instrument(skip(self))]
    pub async fn get_due(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> RetainResult<Vec<QuestionSummary>> {
        let due = DueSetSelector::new(self.store.as_ref())
            .select(tenant_id, now)
            .await?;
        Ok(due.iter().map(QuestionSummary::from).collect())
    }

    pub async fn get_question(&self, tenant_id: &str, id: &str) -> RetainResult<Question> {
        self.store.get(tenant_id, id).await
    }

    /// Record a review and return the tenant's updated statistics.
    pub async fn submit_review(
        &self,
        tenant_id: &str,
        id: &str,
        feedback: i64,
    ) -> RetainResult<LearningStats> {
        self.submit_review_at(tenant_id, id, feedback, Utc::now()).await
    }

    /// The tenant's question list is read before the review is saved and the
    /// saved question is swapped into it, so no fallible I/O follows the
    /// write: an error means nothing was stored.
    pub async fn submit_review_at(
        &self,
        tenant_id: &str,
        id: &str,
        feedback: i64,
        now: DateTime<Utc>,
    ) -> RetainResult<LearningStats> {
        Feedback::from_value(feedback)?;
        let mut questions = self.store.list(tenant_id).await?;

        let saved = self.review_at(tenant_id, id, feedback, now).await?;
        match questions.iter_mut().find(|q| q.id == saved.id) {
            Some(slot) => *slot = saved,
            None => questions.push(saved),
        }
        Ok(aggregate(&questions, now))
    }

    /// Record a review and return the saved question.
    ///
    /// Feedback is validated before the store is touched. The write is a
    /// compare-and-swap, so a losing concurrent review re-reads and
    /// recomputes; after `max_conflict_retries` extra attempts the conflict is
    /// returned. Other store errors are returned as-is.
    #[tracing::instrument(skip(self))]
    pub async fn review_at(
        &self,
        tenant_id: &str,
        id: &str,
        feedback: i64,
        now: DateTime<Utc>,
    ) -> RetainResult<Question> {
        let feedback = Feedback::from_value(feedback)?;
        let mut attempt = 0;

        loop {
            let current = self.store.get(tenant_id, id).await?;
            let next = self.engine.advance(&current, feedback, now);

            match self.store.save(tenant_id, &next).await {
                Ok(saved) => return Ok(saved),
                Err(RetainError::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!(tenant_id, question_id = id, attempt, "Review lost an update race, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delete a question.
    #[tracing::instrument(skip(self))]
    pub async fn delete_question(&self, tenant_id: &str, id: &str) -> RetainResult<()> {
        self.store.delete(tenant_id, id).await
    }

    pub async fn get_stats(&self, tenant_id: &str) -> RetainResult<LearningStats> {
        self.get_stats_at(tenant_id, Utc::now()).await
    }

    pub async fn get_stats_at(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> RetainResult<LearningStats> {
        let questions = self.store.list(tenant_id).await?;
        Ok(aggregate(&questions, now))
    }
}

fn ensure_tenant(tenant_id: &str) -> RetainResult<()> {
    if tenant_id.trim().is_empty() {
        return Err(RetainError::Validation {
            message: "tenant id must not be empty".to_string(),
            code: ErrorCode::ValMissingField,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryQuestionStore, MockQuestionStore};
    use crate::types::Level;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> ReviewService {
        ReviewService::new(Arc::new(InMemoryQuestionStore::new()))
    }

    fn stored(now: DateTime<Utc>) -> Question {
        Question::new("alice", NewQuestion::new("What is Pin?", "A pointer wrapper", ""), now)
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let service = service();
        let input = NewQuestion::new("What is a closure?", "A function value", "rust.md");

        let first = service.import_question("alice", input.clone()).await.unwrap();
        let second = service.import_question("alice", input).await.unwrap();

        assert!(first.is_created());
        assert_eq!(second, ImportOutcome::Skipped(first.id().to_string()));
    }

    #[tokio::test]
    async fn test_import_rejects_blank_input() {
        let service = service();
        let err = service
            .import_question("alice", NewQuestion::new("   ", "a", ""))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValMissingField);

        let err = service
            .import_question("", NewQuestion::new("q", "a", ""))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValMissingField);
    }

    #[tokio::test]
    async fn test_import_batch_counts() {
        let service = service();
        service
            .import_question("alice", NewQuestion::new("old", "a", ""))
            .await
            .unwrap();

        let report = service
            .import_batch(
                "alice",
                vec![
                    NewQuestion::new("old", "a", ""),
                    NewQuestion::new("new", "a", ""),
                    NewQuestion::new(" new ", "b", ""),
                    NewQuestion::new("", "blank", ""),
                ],
            )
            .await;

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_review_returns_stats() {
        let service = service();
        let now = Utc::now();
        let outcome = service
            .import_question_at("alice", NewQuestion::new("q", "a", ""), now)
            .await
            .unwrap();

        let stats = service
            .submit_review_at("alice", outcome.id(), 1, now)
            .await
            .unwrap();

        assert_eq!(stats.total_questions, 1);
        assert_eq!(stats.due_questions, 0);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.total_correct, 1);
        assert_eq!(stats.accuracy, "100.00");

        let q = service.get_question("alice", outcome.id()).await.unwrap();
        assert_eq!(q.version, 2);
        assert_eq!(q.last_reviewed, Some(now));
    }

    #[tokio::test]
    async fn test_invalid_feedback_never_touches_store() {
        // No expectations: any store call fails the test.
        let store = MockQuestionStore::new();
        let service = ReviewService::new(Arc::new(store));

        for bad in [0, 5, -1, 100] {
            let err = service.submit_review("alice", "q_x", bad).await.unwrap_err();
            assert!(matches!(err, RetainError::InvalidFeedback { .. }));
        }
    }

    #[tokio::test]
    async fn test_invalid_feedback_leaves_record_unchanged() {
        let service = service();
        let outcome = service
            .import_question("alice", NewQuestion::new("q", "a", ""))
            .await
            .unwrap();
        let before = service.get_question("alice", outcome.id()).await.unwrap();

        assert!(service.submit_review("alice", outcome.id(), 9).await.is_err());
        assert_eq!(service.get_question("alice", outcome.id()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_stats_read_stores_nothing() {
        // Only `list` is expected; a get or save would fail the test.
        let mut store = MockQuestionStore::new();
        store
            .expect_list()
            .times(1)
            .returning(|_| Err(RetainError::persistence("disk I/O error")));

        let service = ReviewService::new(Arc::new(store));
        let err = service.submit_review("alice", "q_x", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DbOperationFailed);
    }

    #[tokio::test]
    async fn test_submit_review_stats_include_saved_question() {
        let service = service();
        let now = Utc::now();
        let first = service
            .import_question_at("alice", NewQuestion::new("one", "a", ""), now)
            .await
            .unwrap();
        service
            .import_question_at("alice", NewQuestion::new("two", "a", ""), now)
            .await
            .unwrap();

        let stats = service
            .submit_review_at("alice", first.id(), 3, now)
            .await
            .unwrap();

        assert_eq!(stats, service.get_stats_at("alice", now).await.unwrap());
        assert_eq!(stats.total_questions, 2);
        assert_eq!(stats.due_questions, 1);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.total_correct, 0);
    }

    #[tokio::test]
    async fn test_review_unknown_question() {
        let service = service();
        let err = service.submit_review("alice", "q_missing", 1).await.unwrap_err();
        assert!(matches!(err, RetainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_retried() {
        let now = Utc::now();
        let question = stored(now);

        let mut store = MockQuestionStore::new();
        let q = question.clone();
        store.expect_get().times(1).returning(move |_, _| Ok(q.clone()));
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(RetainError::persistence("disk I/O error")));

        let service = ReviewService::new(Arc::new(store));
        let err = service
            .review_at("alice", &question.id, 1, now)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DbOperationFailed);
    }

    #[tokio::test]
    async fn test_conflict_is_retried() {
        let now = Utc::now();
        let question = stored(now);
        let saves = Arc::new(AtomicUsize::new(0));

        let mut store = MockQuestionStore::new();
        let q = question.clone();
        store.expect_get().times(2).returning(move |_, _| Ok(q.clone()));
        let counter = saves.clone();
        store.expect_save().times(2).returning(move |_, q| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RetainError::conflict(&q.id))
            } else {
                Ok(Question {
                    version: q.version + 1,
                    ..q.clone()
                })
            }
        });

        let service = ReviewService::new(Arc::new(store));
        let saved = service.review_at("alice", &question.id, 2, now).await.unwrap();
        assert_eq!(saved.review_count, 1);
        assert_eq!(saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_conflict_retries_are_bounded() {
        let now = Utc::now();
        let question = stored(now);

        let mut store = MockQuestionStore::new();
        let q = question.clone();
        store.expect_get().times(3).returning(move |_, _| Ok(q.clone()));
        store
            .expect_save()
            .times(3)
            .returning(|_, q| Err(RetainError::conflict(&q.id)));

        let service = ReviewService::new(Arc::new(store)).with_max_conflict_retries(2);
        let err = service.review_at("alice", &question.id, 1, now).await.unwrap_err();
        assert!(matches!(err, RetainError::Conflict { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reviews_are_not_lost() {
        let service = Arc::new(service().with_max_conflict_retries(32));
        let outcome = service
            .import_question("alice", NewQuestion::new("contended", "a", ""))
            .await
            .unwrap();
        let id = outcome.id().to_string();

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            let id = id.clone();
            let feedback = if i % 2 == 0 { 1 } else { 3 };
            handles.push(tokio::spawn(async move {
                service.submit_review("alice", &id, feedback).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let q = service.get_question("alice", &id).await.unwrap();
        assert_eq!(q.review_count, 20);
        assert_eq!(q.correct_count, 10);
        assert_eq!(q.version, 21);
    }

    #[tokio::test]
    async fn test_get_due_and_delete() {
        let service = service();
        let now = Utc::now();
        let early = service
            .import_question_at("alice", NewQuestion::new("early", "a", "x.md"), now - Duration::hours(1))
            .await
            .unwrap();
        let late = service
            .import_question_at("alice", NewQuestion::new("late", "a", "x.md"), now)
            .await
            .unwrap();

        let due = service.get_due("alice", now).await.unwrap();
        let ids: Vec<_> = due.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![early.id(), late.id()]);
        assert_eq!(due[0].source, "x.md");

        service.delete_question("alice", early.id()).await.unwrap();
        assert!(matches!(
            service.get_question("alice", early.id()).await.unwrap_err(),
            RetainError::NotFound { .. }
        ));
        assert_eq!(service.get_due("alice", now).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_from_config_applies_schedule() {
        let mut config = RetainConfig::default();
        config.schedule.promotion_min_correct = 1;
        config.max_conflict_retries = 0;

        let service = ReviewService::from_config(Arc::new(InMemoryQuestionStore::new()), &config);
        let now = Utc::now();
        let outcome = service
            .import_question_at("alice", NewQuestion::new("fast", "a", ""), now)
            .await
            .unwrap();

        let q = service.review_at("alice", outcome.id(), 1, now).await.unwrap();
        assert_eq!(q.level, Level::new(3).unwrap());
    }

    #[tokio::test]
    async fn test_open_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = RetainConfig::builder()
            .database_path(dir.path().join("db").join("retain.db"))
            .build()
            .unwrap();

        let service = ReviewService::open(&config).unwrap();
        service
            .import_question("alice", NewQuestion::new("q", "a", ""))
            .await
            .unwrap();
        assert!(config.database_path.exists());
    }
}
