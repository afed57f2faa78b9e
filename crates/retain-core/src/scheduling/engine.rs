//! Feedback-driven scheduling engine.
//!
//! The engine is a pure function of (state, feedback, now): it never touches
//! storage and never reads the clock itself.
//!
//! For each review:
//! 1. `review_count` is incremented, and `correct_count` too when the feedback
//!    is Proficient or Fair.
//! 2. The multiplier starts at the feedback's base multiplier and gains the
//!    accuracy bonus when the *updated* counters give an accuracy above the
//!    threshold. A review can therefore qualify itself for its own bonus.
//! 3. `next_review = now + base_interval * multiplier`.
//! 4. Correct feedback promotes the level by one step once enough correct
//!    answers have accumulated; incorrect feedback demotes it by one step.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RetainError, RetainResult};
use crate::types::{Feedback, Level, Question};

/// Tunable parameters of the scheduling policy.
///
/// The per-feedback interval and multiplier tables are fixed on [`Feedback`];
/// only the accuracy bonus and promotion gate are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleParams {
    /// Accuracy strictly above this earns the bonus. Default: 0.8
    pub accuracy_threshold: f64,
    /// Multiplier bonus for high accuracy. Default: 1.2
    pub accuracy_bonus: f64,
    /// Correct answers required before the level can improve. Default: 3
    pub promotion_min_correct: u32,
}

impl ScheduleParams {
    /// Reject parameters that could schedule a review in the past or
    /// make the bonus unreachable in a surprising way.
    pub fn validate(&self) -> RetainResult<()> {
        if !(0.0..=1.0).contains(&self.accuracy_threshold) {
            return Err(RetainError::Configuration(format!(
                "accuracy_threshold must be within 0..=1, got {}",
                self.accuracy_threshold
            )));
        }
        if !(self.accuracy_bonus.is_finite() && self.accuracy_bonus > 0.0) {
            return Err(RetainError::Configuration(format!(
                "accuracy_bonus must be positive, got {}",
                self.accuracy_bonus
            )));
        }
        Ok(())
    }
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            accuracy_threshold: 0.8,
            accuracy_bonus: 1.2,
            promotion_min_correct: 3,
        }
    }
}

/// Everything a single review decides, before it is applied to a question.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPlan {
    pub feedback: Feedback,
    pub review_count: u32,
    pub correct_count: u32,
    pub multiplier: f64,
    pub accuracy_bonus: bool,
    pub interval: Duration,
    pub level: Level,
}

/// Scheduling engine for question reviews.
#[derive(Debug, Clone, Default)]
pub struct SchedulingEngine {
    params: ScheduleParams,
}

impl SchedulingEngine {
    /// Create an engine with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom parameters.
    pub fn with_params(params: ScheduleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScheduleParams {
        &self.params
    }

    /// Compute the outcome of reviewing `state` with `feedback`.
    pub fn plan(&self, state: &Question, feedback: Feedback) -> ReviewPlan {
        let review_count = state.review_count.saturating_add(1);
        let correct_count = if feedback.is_correct() {
            state.correct_count.saturating_add(1)
        } else {
            state.correct_count
        };

        let accuracy = correct_count as f64 / review_count as f64;
        let accuracy_bonus = accuracy > self.params.accuracy_threshold;
        let mut multiplier = feedback.base_multiplier();
        if accuracy_bonus {
            multiplier *= self.params.accuracy_bonus;
        }

        let interval = scale(feedback.base_interval(), multiplier);

        let level = if feedback.is_correct() {
            if correct_count >= self.params.promotion_min_correct && !state.level.is_mastered() {
                state.level.promote()
            } else {
                state.level
            }
        } else {
            state.level.demote()
        };

        ReviewPlan {
            feedback,
            review_count,
            correct_count,
            multiplier,
            accuracy_bonus,
            interval,
            level,
        }
    }

    /// Apply one review to `state`, returning the new state.
    ///
    /// `version` is left untouched; the store bumps it when the result is saved.
    pub fn advance(&self, state: &Question, feedback: Feedback, now: DateTime<Utc>) -> Question {
        let plan = self.plan(state, feedback);

        debug!(
            question_id = %state.id,
            feedback = %feedback,
            multiplier = plan.multiplier,
            accuracy_bonus = plan.accuracy_bonus,
            interval_secs = plan.interval.num_seconds(),
            level_from = state.level.value(),
            level_to = plan.level.value(),
            "Scheduled review"
        );

        Question {
            level: plan.level,
            next_review: now + plan.interval,
            review_count: plan.review_count,
            correct_count: plan.correct_count,
            last_reviewed: Some(now),
            updated_at: now,
            ..state.clone()
        }
    }

    /// Like [`advance`](Self::advance), but takes the raw boundary value.
    ///
    /// Values outside 1..=4 fail with `InvalidFeedback` and produce no state.
    pub fn advance_value(
        &self,
        state: &Question,
        feedback: i64,
        now: DateTime<Utc>,
    ) -> RetainResult<Question> {
        let feedback = Feedback::from_value(feedback)?;
        Ok(self.advance(state, feedback, now))
    }
}

/// Multiply a duration by a float at nanosecond precision.
fn scale(base: Duration, multiplier: f64) -> Duration {
    let nanos = base.num_nanoseconds().unwrap_or(i64::MAX) as f64 * multiplier;
    Duration::nanoseconds(nanos.round() as i64)
}
