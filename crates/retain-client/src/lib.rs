//! retain-client - Client library for the retain REST API.
//!
//! # Example
//!
//! ```ignore
//! use retain_client::ReviewClient;
//!
//! let client = ReviewClient::new("http://localhost:5000", "alice")?;
//!
//! // Add a question
//! let outcome = client.create_question("What is Rust?", "A language", "notes.md").await?;
//!
//! // Review everything that is due
//! for question in client.get_due().await?.questions {
//!     client.submit_review(&question.id, 1).await?;
//! }
//! ```

mod client;

pub use client::{DueList, ImportResult, ReviewClient, DEFAULT_BASE_URL};
pub use retain_core::{ImportOutcome, LearningStats, Question, QuestionSummary};
