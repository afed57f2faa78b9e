//! Markdown question files.
//!
//! A file holds any number of question/answer pairs:
//!
//! ```text
//! # q
//! What does `Send` mean?
//! # a
//! The value may be moved to another thread.
//! ```
//!
//! The i-th `# q` marker pairs with the i-th `# a` marker. Question text runs
//! from its marker to the paired answer marker; answer text runs to the next
//! question marker or end of file. Both are trimmed, and pairs with an empty
//! side are dropped.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{RetainError, RetainResult};
use crate::types::NewQuestion;

fn is_marker(line: &str, tag: &str) -> bool {
    let trimmed = line.trim();
    trimmed == tag || trimmed.strip_prefix(tag).is_some_and(|rest| rest.starts_with(' '))
}

/// Parse question/answer pairs out of markdown `content`.
pub fn parse_content(content: &str, source: &str) -> Vec<NewQuestion> {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut questions = Vec::new();
    let mut answers = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if is_marker(line, "# q") {
            questions.push(i);
        } else if is_marker(line, "# a") {
            answers.push(i);
        }
    }

    let mut parsed = Vec::new();
    for (i, (&q_pos, &a_pos)) in questions.iter().zip(answers.iter()).enumerate() {
        let next_q = questions.get(i + 1).copied().unwrap_or(lines.len());

        let question = join_between(&lines, q_pos + 1, a_pos);
        let answer = join_between(&lines, a_pos + 1, next_q);

        if !question.is_empty() && !answer.is_empty() {
            parsed.push(NewQuestion::new(question, answer, source));
        }
    }
    parsed
}

/// Trimmed text of `lines[start..end]`, empty when the range is inverted.
fn join_between(lines: &[&str], start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n").trim().to_string()
}

/// Parse one markdown file. The path becomes each question's source.
pub fn parse_file(path: impl AsRef<Path>) -> RetainResult<Vec<NewQuestion>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let parsed = parse_content(&content, &path.display().to_string());
    debug!(path = %path.display(), count = parsed.len(), "Parsed question file");
    Ok(parsed)
}

/// Recursively parse every `*.md` file (extension matched case-insensitively)
/// under each directory, in a stable walk order.
pub fn parse_dirs<P: AsRef<Path>>(dirs: &[P]) -> RetainResult<Vec<NewQuestion>> {
    let mut all = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        for file in markdown_files(dir)? {
            all.extend(parse_file(&file)?);
        }
        info!(dir = %dir.display(), total = all.len(), "Scanned question directory");
    }

    Ok(all)
}

fn markdown_files(dir: &Path) -> RetainResult<Vec<PathBuf>> {
    // A configured directory that does not exist yet starts out empty.
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "Created question directory");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            RetainError::Io(std::io::Error::other(format!(
                "Failed to walk {}: {}",
                dir.display(),
                e
            )))
        })?;
        let is_markdown = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if entry.file_type().is_file() && is_markdown {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
