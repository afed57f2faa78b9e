//! Review feedback grades.
//!
//! Feedback is the user's report of how well they recalled an answer. The
//! domain is closed: anything outside 1..=4 is rejected rather than defaulted.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::error::{RetainError, RetainResult};

/// Recall quality for one review (1 = best, 4 = worst).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Feedback {
    /// Recalled effortlessly.
    Proficient = 1,
    /// Recalled, but not fluently.
    Fair = 2,
    /// Not recalled.
    Forgotten = 3,
    /// No trace of the answer at all.
    CompletelyForgotten = 4,
}

impl Feedback {
    /// Integer value used at the service boundary.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Parse a boundary value, rejecting anything outside 1..=4.
    pub fn from_value(value: i64) -> RetainResult<Self> {
        match value {
            1 => Ok(Feedback::Proficient),
            2 => Ok(Feedback::Fair),
            3 => Ok(Feedback::Forgotten),
            4 => Ok(Feedback::CompletelyForgotten),
            other => Err(RetainError::invalid_feedback(other)),
        }
    }

    /// Proficient and Fair count as correct answers.
    pub fn is_correct(self) -> bool {
        matches!(self, Feedback::Proficient | Feedback::Fair)
    }

    /// Interval before the accuracy-adjusted multiplier is applied.
    pub fn base_interval(self) -> Duration {
        match self {
            Feedback::Proficient => Duration::days(7),
            Feedback::Fair => Duration::days(3),
            Feedback::Forgotten => Duration::days(1),
            Feedback::CompletelyForgotten => Duration::hours(2),
        }
    }

    /// Interval multiplier before the accuracy bonus.
    pub fn base_multiplier(self) -> f64 {
        match self {
            Feedback::Proficient => 2.5,
            Feedback::Fair => 1.8,
            Feedback::Forgotten => 1.3,
            Feedback::CompletelyForgotten => 1.0,
        }
    }
}

impl From<Feedback> for u8 {
    fn from(feedback: Feedback) -> Self {
        feedback.value()
    }
}

impl TryFrom<i64> for Feedback {
    type Error = RetainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Feedback::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_value_accepts_closed_domain() {
        assert_eq!(Feedback::from_value(1).unwrap(), Feedback::Proficient);
        assert_eq!(Feedback::from_value(2).unwrap(), Feedback::Fair);
        assert_eq!(Feedback::from_value(3).unwrap(), Feedback::Forgotten);
        assert_eq!(Feedback::from_value(4).unwrap(), Feedback::CompletelyForgotten);
    }

    #[test]
    fn test_from_value_rejects_out_of_range() {
        for value in [0, 5, -1, 42, i64::MAX] {
            let err = Feedback::try_from(value).unwrap_err();
            assert!(matches!(err, RetainError::InvalidFeedback { value: v, .. } if v == value));
        }
    }

    #[test]
    fn test_value_round_trips() {
        for feedback in Feedback::iter() {
            assert_eq!(Feedback::from_value(feedback.value() as i64).unwrap(), feedback);
        }
    }

    #[test]
    fn test_correctness() {
        assert!(Feedback::Proficient.is_correct());
        assert!(Feedback::Fair.is_correct());
        assert!(!Feedback::Forgotten.is_correct());
        assert!(!Feedback::CompletelyForgotten.is_correct());
    }

    #[test]
    fn test_base_tables() {
        assert_eq!(Feedback::Proficient.base_interval(), Duration::days(7));
        assert_eq!(Feedback::CompletelyForgotten.base_interval(), Duration::hours(2));
        assert_eq!(Feedback::Fair.base_multiplier(), 1.8);
        assert_eq!(Feedback::Forgotten.base_multiplier(), 1.3);
    }

    #[test]
    fn test_display_is_snake_case() {
        assert_eq!(Feedback::CompletelyForgotten.to_string(), "completely_forgotten");
        let name: &'static str = Feedback::Fair.into();
        assert_eq!(name, "fair");
    }
}
