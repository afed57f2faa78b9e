//! Mapping typed input onto review actions.

use retain_core::Feedback;
use strum::IntoEnumIterator;

/// What a line typed during review asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer,
    Delete,
    Skip,
    Quit,
    Feedback(Feedback),
    Unknown,
}

/// Chinese label used by existing question decks and muscle memory.
pub fn label_zh(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Proficient => "熟练",
        Feedback::Fair => "一般",
        Feedback::Forgotten => "忘记",
        Feedback::CompletelyForgotten => "完全忘记",
    }
}

/// Human label, e.g. `completely forgotten`.
pub fn label(feedback: Feedback) -> String {
    let name: &'static str = feedback.into();
    name.replace('_', " ")
}

/// Parse a feedback answer: `1`-`4`, the English names, or the Chinese labels.
pub fn parse_feedback(input: &str) -> Option<Feedback> {
    let normalized = input.trim().to_lowercase().replace(['-', ' '], "_");
    if normalized.is_empty() {
        return None;
    }

    Feedback::iter().find(|&f| {
        let digit = f.value().to_string();
        let name: &'static str = f.into();
        let zh = label_zh(f);

        normalized == digit
            || normalized == name
            || normalized == zh
            || normalized == format!("{}{}", digit, zh)
            || normalized == format!("{}的", zh)
    })
}

/// Classify one line of review input.
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim().to_lowercase();
    match trimmed.as_str() {
        "a" | "answer" | "答案" => Input::Answer,
        "d" | "delete" | "删除" => Input::Delete,
        "s" | "skip" | "跳过" => Input::Skip,
        "q" | "quit" | "退出" => Input::Quit,
        other => parse_feedback(other).map_or(Input::Unknown, Input::Feedback),
    }
}

/// Whether a delete confirmation was accepted.
pub fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "是" | "确认")
}
