//! Core types for retain.

mod feedback;
mod level;
mod question;
mod stats;

pub use feedback::Feedback;
pub use level::Level;
pub use question::{NewQuestion, Question, QuestionSummary};
pub use stats::LearningStats;
