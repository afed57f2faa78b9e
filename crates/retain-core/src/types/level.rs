//! Memory level: coarse progress indicator persisted with each question.

use serde::{Deserialize, Serialize};

use crate::error::{RetainError, RetainResult};

/// Level in 1..=4, where 1 is best known and 4 is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Best-known level.
    pub const MASTERED: Level = Level(1);
    /// Level every new question starts at.
    pub const UNKNOWN: Level = Level(4);

    /// Create a level, rejecting values outside 1..=4.
    pub fn new(value: u8) -> RetainResult<Self> {
        if (Self::MASTERED.0..=Self::UNKNOWN.0).contains(&value) {
            Ok(Level(value))
        } else {
            Err(RetainError::validation(format!("level {} outside 1-4", value)))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// One step towards 1. Saturates at 1.
    pub fn promote(self) -> Self {
        Level(self.0.saturating_sub(1).max(Self::MASTERED.0))
    }

    /// One step towards 4. Saturates at 4.
    pub fn demote(self) -> Self {
        Level((self.0 + 1).min(Self::UNKNOWN.0))
    }

    pub fn is_mastered(self) -> bool {
        self == Self::MASTERED
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl TryFrom<u8> for Level {
    type Error = RetainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bounds() {
        assert!(Level::new(0).is_err());
        assert!(Level::new(5).is_err());
        for v in 1..=4 {
            assert_eq!(Level::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn test_promote_saturates() {
        assert_eq!(Level::UNKNOWN.promote().value(), 3);
        assert_eq!(Level::MASTERED.promote(), Level::MASTERED);
    }

    #[test]
    fn test_demote_saturates() {
        assert_eq!(Level::MASTERED.demote().value(), 2);
        assert_eq!(Level::UNKNOWN.demote(), Level::UNKNOWN);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Level>("9").is_err());
        assert_eq!(serde_json::from_str::<Level>("2").unwrap().value(), 2);
        assert_eq!(serde_json::to_string(&Level::UNKNOWN).unwrap(), "4");
    }
}
