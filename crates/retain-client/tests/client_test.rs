//! Client tests against a live server on a loopback port.

use std::sync::Arc;

use retain_client::ReviewClient;
use retain_core::{InMemoryQuestionStore, RetainConfig, RetainError, ReviewService};
use retain_server::{create_server, AppState};

async fn spawn_server() -> String {
    let service = ReviewService::new(Arc::new(InMemoryQuestionStore::new()));
    let app = create_server(AppState::new(service, RetainConfig::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_review_round_trip() {
    let base_url = spawn_server().await;
    let client = ReviewClient::new(&base_url, "alice").unwrap();
    assert!(client.health().await.unwrap());

    let created = client
        .create_question("What is a future?", "A value that becomes ready later", "async.md")
        .await
        .unwrap();
    assert!(created.is_created());

    let again = client
        .create_question("What is a future?", "whatever", "async.md")
        .await
        .unwrap();
    assert!(!again.is_created());
    assert_eq!(again.id(), created.id());

    let due = client.get_due().await.unwrap();
    assert_eq!(due.total, 1);
    assert_eq!(due.questions[0].id, created.id());

    let stats = client.submit_review(created.id(), 2).await.unwrap();
    assert_eq!(stats.total_reviews, 1);
    assert_eq!(stats.total_correct, 1);

    let question = client.get_question(created.id()).await.unwrap();
    assert_eq!(question.review_count, 1);
    assert_eq!(question.version, 2);

    let stats = client.delete_question(created.id()).await.unwrap();
    assert_eq!(stats.total_questions, 0);
}

#[tokio::test]
async fn test_errors_are_typed() {
    let base_url = spawn_server().await;
    let client = ReviewClient::new(&base_url, "alice").unwrap();

    let err = client.get_question("q_missing").await.unwrap_err();
    assert!(matches!(err, RetainError::NotFound { .. }));

    let created = client.create_question("q", "a", "").await.unwrap();
    let err = client.submit_review(created.id(), 0).await.unwrap_err();
    assert!(matches!(err, RetainError::InvalidFeedback { value: 0, .. }));
}

#[tokio::test]
async fn test_tenants_are_separate() {
    let base_url = spawn_server().await;
    let alice = ReviewClient::new(&base_url, "alice").unwrap();
    let bob = ReviewClient::new(&base_url, "bob").unwrap();

    let created = alice.create_question("Secret", "a", "").await.unwrap();

    assert!(bob.get_question(created.id()).await.is_err());
    assert_eq!(bob.get_stats().await.unwrap().total_questions, 0);
    assert_eq!(alice.get_stats().await.unwrap().total_questions, 1);
}
