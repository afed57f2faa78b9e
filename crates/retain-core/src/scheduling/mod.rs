//! Review scheduling.
//!
//! Turns a feedback signal into an updated memory state and next-due time.

mod engine;

pub use engine::{ReviewPlan, ScheduleParams, SchedulingEngine};
