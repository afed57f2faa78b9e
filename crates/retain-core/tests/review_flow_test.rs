//! End-to-end review flows against the SQLite and in-memory stores.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use retain_core::import::markdown;
use retain_core::{
    ImportOutcome, InMemoryQuestionStore, Level, NewQuestion, QuestionStore, RetainError,
    ReviewService, SqliteQuestionStore,
};

fn services() -> Vec<(&'static str, ReviewService)> {
    vec![
        (
            "sqlite",
            ReviewService::new(Arc::new(SqliteQuestionStore::in_memory().unwrap())),
        ),
        ("memory", ReviewService::new(Arc::new(InMemoryQuestionStore::new()))),
    ]
}

fn assert_close(actual: Duration, expected: Duration) {
    let diff = (actual - expected).num_milliseconds().abs();
    assert!(diff <= 1, "expected {:?}, got {:?}", expected, actual);
}

async fn import(service: &ReviewService, tenant: &str, text: &str, now: DateTime<Utc>) -> String {
    service
        .import_question_at(tenant, NewQuestion::new(text, "answer", "deck.md"), now)
        .await
        .unwrap()
        .id()
        .to_string()
}

/// A fresh question answered proficiently waits 21 days and keeps level 4.
#[tokio::test]
async fn test_first_proficient_review() {
    for (name, service) in services() {
        let now = Utc::now();
        let id = import(&service, "alice", "What is borrowing?", now).await;

        let q = service.review_at("alice", &id, 1, now).await.unwrap();

        assert_eq!(q.review_count, 1, "{name}");
        assert_eq!(q.correct_count, 1, "{name}");
        assert_eq!(q.level, Level::UNKNOWN, "{name}");
        assert_close(q.next_review - now, Duration::days(21));
        assert_eq!(service.get_question("alice", &id).await.unwrap(), q, "{name}");
    }
}

/// Three proficient reviews promote a fresh question by exactly one level.
#[tokio::test]
async fn test_third_correct_review_promotes() {
    for (name, service) in services() {
        let mut now = Utc::now();
        let id = import(&service, "alice", "What is moving?", now).await;

        for _ in 0..2 {
            let q = service.review_at("alice", &id, 1, now).await.unwrap();
            assert_eq!(q.level, Level::UNKNOWN, "{name}");
            now = q.next_review;
        }

        let q = service.review_at("alice", &id, 1, now).await.unwrap();
        assert_eq!(q.correct_count, 3, "{name}");
        assert_eq!(q.level.value(), 3, "{name}");
    }
}

/// A completely forgotten mastered question drops one level and is due in two hours.
#[tokio::test]
async fn test_forgotten_mastered_question() {
    for (name, service) in services() {
        let now = Utc::now();
        let id = import(&service, "alice", "What is a vtable?", now).await;

        let mut q = service.get_question("alice", &id).await.unwrap();
        q.level = Level::MASTERED;
        service.store().save("alice", &q).await.unwrap();

        let q = service.review_at("alice", &id, 4, now).await.unwrap();
        assert_eq!(q.level.value(), 2, "{name}");
        assert_eq!(q.correct_count, 0, "{name}");
        assert_close(q.next_review - now, Duration::hours(2));
    }
}

#[tokio::test]
async fn test_nothing_due_is_empty_not_error() {
    for (name, service) in services() {
        let now = Utc::now();
        assert!(service.get_due("alice", now).await.unwrap().is_empty(), "{name}");

        let id = import(&service, "alice", "Due now", now).await;
        service.review_at("alice", &id, 2, now).await.unwrap();
        assert!(service.get_due("alice", now).await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn test_deleted_question_is_gone() {
    for (name, service) in services() {
        let now = Utc::now();
        let id = import(&service, "alice", "Short-lived", now).await;

        service.delete_question("alice", &id).await.unwrap();

        let err = service.get_question("alice", &id).await.unwrap_err();
        assert!(matches!(err, RetainError::NotFound { .. }), "{name}");
        let err = service.delete_question("alice", &id).await.unwrap_err();
        assert!(matches!(err, RetainError::NotFound { .. }), "{name}");
        let err = service.submit_review("alice", &id, 1).await.unwrap_err();
        assert!(matches!(err, RetainError::NotFound { .. }), "{name}");
    }
}

#[tokio::test]
async fn test_import_dedup_per_tenant() {
    for (name, service) in services() {
        let input = NewQuestion::new("  What is Sync?  ", "Shareable by reference", "a.md");

        let first = service.import_question("alice", input.clone()).await.unwrap();
        let again = service.import_question("alice", input.clone()).await.unwrap();
        assert!(first.is_created(), "{name}");
        assert_eq!(again, ImportOutcome::Skipped(first.id().to_string()), "{name}");

        let other = service.import_question("bob", input).await.unwrap();
        assert!(other.is_created(), "{name}");
        assert_ne!(other.id(), first.id(), "{name}");

        assert_eq!(service.get_stats("alice").await.unwrap().total_questions, 1, "{name}");
        assert_eq!(service.get_stats("bob").await.unwrap().total_questions, 1, "{name}");
    }
}

#[tokio::test]
async fn test_tenants_cannot_touch_each_other() {
    for (name, service) in services() {
        let now = Utc::now();
        let id = import(&service, "alice", "Private", now).await;

        assert!(service.get_question("bob", &id).await.is_err(), "{name}");
        assert!(service.submit_review("bob", &id, 1).await.is_err(), "{name}");
        assert!(service.delete_question("bob", &id).await.is_err(), "{name}");
        assert!(service.get_due("bob", now).await.unwrap().is_empty(), "{name}");

        let q = service.get_question("alice", &id).await.unwrap();
        assert_eq!(q.review_count, 0, "{name}");
    }
}

#[tokio::test]
async fn test_stats_follow_reviews() {
    for (name, service) in services() {
        let now = Utc::now();
        let a = import(&service, "alice", "a", now).await;
        let b = import(&service, "alice", "b", now).await;
        import(&service, "alice", "c", now).await;

        service.submit_review_at("alice", &a, 1, now).await.unwrap();
        service.submit_review_at("alice", &b, 3, now).await.unwrap();
        let stats = service.submit_review_at("alice", &b, 2, now).await.unwrap();

        assert_eq!(stats.total_questions, 3, "{name}");
        assert_eq!(stats.due_questions, 1, "{name}");
        assert_eq!(stats.total_reviews, 3, "{name}");
        assert_eq!(stats.total_correct, 2, "{name}");
        assert_eq!(stats.accuracy, "66.67", "{name}");
    }
}

#[tokio::test]
async fn test_markdown_directory_import() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("rust.md"),
        "# q\nWhat is a slice?\n# a\nA view into a sequence.\n\n# q\nWhat is a slice?\n# a\nRepeated.\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("go.md"),
        "# q\nWhat is a goroutine?\n# a\nA lightweight thread.\n",
    )
    .unwrap();

    let service = ReviewService::new(Arc::new(InMemoryQuestionStore::new()));
    let parsed = markdown::parse_dirs(&[dir.path()]).unwrap();
    assert_eq!(parsed.len(), 3);

    let report = service.import_batch("alice", parsed.clone()).await;
    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 1);

    let report = service.import_batch("alice", parsed).await;
    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 2);

    let due = service.get_due("alice", Utc::now()).await.unwrap();
    assert_eq!(due.len(), 2);
    assert!(due.iter().all(|s| s.source.ends_with(".md")));
}

#[tokio::test]
async fn test_sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retain.db");
    let now = Utc::now();

    let id = {
        let service = ReviewService::new(Arc::new(SqliteQuestionStore::new(&path).unwrap()));
        let id = import(&service, "alice", "Persistent", now).await;
        service.review_at("alice", &id, 1, now).await.unwrap();
        id
    };

    let service = ReviewService::new(Arc::new(SqliteQuestionStore::new(&path).unwrap()));
    let q = service.get_question("alice", &id).await.unwrap();
    assert_eq!(q.review_count, 1);
    assert_eq!(q.version, 2);
    assert_close(q.next_review - now, Duration::days(21));
}
