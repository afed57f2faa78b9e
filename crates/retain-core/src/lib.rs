//! retain-core - Core library for retain.
//!
//! This crate provides the question model, the feedback-driven scheduling
//! engine, question stores, and the [`ReviewService`] that presentation
//! layers call into.
//!
//! # Example
//!
//! ```ignore
//! use retain_core::{NewQuestion, RetainConfig, ReviewService};
//!
//! let service = ReviewService::open(&RetainConfig::from_env()?)?;
//!
//! // Import a question
//! let outcome = service
//!     .import_question("alice", NewQuestion::new("What is Rust?", "A language", "rust.md"))
//!     .await?;
//!
//! // Review it as "proficient"
//! let stats = service.submit_review("alice", outcome.id(), 1).await?;
//! println!("accuracy: {}%", stats.accuracy);
//! ```

pub mod config;
pub mod due;
pub mod error;
pub mod identity;
pub mod import;
pub mod scheduling;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{RetainConfig, RetainConfigBuilder};
pub use due::DueSetSelector;
pub use error::{ErrorCode, RetainError, RetainResult};
pub use import::{ImportOutcome, ImportReport};
pub use scheduling::{ReviewPlan, ScheduleParams, SchedulingEngine};
pub use service::ReviewService;
pub use store::{InMemoryQuestionStore, QuestionStore, SqliteQuestionStore};
pub use types::{Feedback, LearningStats, Level, NewQuestion, Question, QuestionSummary};
