//! Interactive review loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Utc;
use retain_core::{QuestionSummary, RetainError, ReviewService};

use crate::feedback::{is_yes, label, label_zh, parse_input, Input};

/// Counts for one review session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    pub reviewed: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub quit: bool,
}

enum Step {
    Next,
    Quit,
}

/// Walks the tenant's due questions, reading commands from `input`.
pub struct ReviewSession<'a, R, W> {
    service: &'a ReviewService,
    tenant: &'a str,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> ReviewSession<'a, R, W> {
    pub fn new(service: &'a ReviewService, tenant: &'a str, input: R, output: W) -> Self {
        Self {
            service,
            tenant,
            input,
            output,
        }
    }

    /// Review every question due now, oldest first. End of input quits.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let due = self.service.get_due(self.tenant, Utc::now()).await?;
        let mut summary = SessionSummary {
            total: due.len(),
            ..SessionSummary::default()
        };

        if due.is_empty() {
            writeln!(self.output, "Nothing to review right now.")?;
            return Ok(summary);
        }
        writeln!(self.output, "{} question(s) due for review.", due.len())?;

        for (index, question) in due.iter().enumerate() {
            if let Step::Quit = self.review_one(index + 1, due.len(), question, &mut summary).await? {
                summary.quit = true;
                writeln!(
                    self.output,
                    "\nSession ended, {} question(s) reviewed.",
                    summary.reviewed
                )?;
                return Ok(summary);
            }
        }

        writeln!(
            self.output,
            "\nSession complete, {} question(s) reviewed.",
            summary.reviewed
        )?;
        Ok(summary)
    }

    async fn review_one(
        &mut self,
        index: usize,
        total: usize,
        question: &QuestionSummary,
        summary: &mut SessionSummary,
    ) -> Result<Step> {
        writeln!(self.output, "\n[{}/{}] {}", index, total, question.question_text)?;
        if !question.source.is_empty() {
            writeln!(self.output, "  source: {}", question.source)?;
        }
        writeln!(
            self.output,
            "  reviews: {}, correct: {}",
            question.review_count, question.correct_count
        )?;

        loop {
            let Some(line) = self.prompt("a = answer, d = delete, skip, q = quit >>> ")? else {
                return Ok(Step::Quit);
            };
            match parse_input(&line) {
                Input::Answer => break,
                Input::Delete => {
                    if self.confirm_delete(question).await? {
                        summary.deleted += 1;
                        return Ok(Step::Next);
                    }
                }
                Input::Skip => {
                    summary.skipped += 1;
                    return Ok(Step::Next);
                }
                Input::Quit => return Ok(Step::Quit),
                Input::Feedback(_) | Input::Unknown => {
                    writeln!(self.output, "Type 'a' to see the answer, 'd' to delete, or 'q' to quit.")?;
                }
            }
        }

        writeln!(self.output, "\nAnswer:\n{}\n", question.answer_text)?;
        writeln!(
            self.output,
            "How well did you remember it? 1 proficient (熟练), 2 fair (一般), 3 forgotten (忘记), 4 completely forgotten (完全忘记)"
        )?;

        loop {
            let Some(line) = self.prompt(">>> ")? else {
                return Ok(Step::Quit);
            };
            match parse_input(&line) {
                Input::Feedback(feedback) => {
                    let result = self
                        .service
                        .submit_review(self.tenant, &question.id, i64::from(feedback.value()))
                        .await;
                    match result {
                        Ok(_) => {
                            summary.reviewed += 1;
                            writeln!(
                                self.output,
                                "Recorded: {} ({})",
                                label(feedback),
                                label_zh(feedback)
                            )?;
                        }
                        Err(RetainError::NotFound { .. }) => {
                            writeln!(self.output, "This question no longer exists.")?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                    return Ok(Step::Next);
                }
                Input::Delete => {
                    if self.confirm_delete(question).await? {
                        summary.deleted += 1;
                        return Ok(Step::Next);
                    }
                }
                Input::Skip => {
                    summary.skipped += 1;
                    writeln!(self.output, "Skipped.")?;
                    return Ok(Step::Next);
                }
                Input::Quit => return Ok(Step::Quit),
                Input::Answer | Input::Unknown => {
                    writeln!(
                        self.output,
                        "Invalid input. Enter 1-4 (or proficient/fair/forgotten/completely-forgotten), 'd' to delete, 'skip' or 'q'."
                    )?;
                }
            }
        }
    }

    async fn confirm_delete(&mut self, question: &QuestionSummary) -> Result<bool> {
        let Some(line) = self.prompt("Delete this question? (y/n): ")? else {
            return Ok(false);
        };
        if !is_yes(&line) {
            writeln!(self.output, "Delete cancelled.")?;
            return Ok(false);
        }

        match self.service.delete_question(self.tenant, &question.id).await {
            Ok(()) => {
                writeln!(self.output, "Question deleted.")?;
                Ok(true)
            }
            Err(RetainError::NotFound { .. }) => {
                writeln!(self.output, "Question was already gone.")?;
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write `text`, then read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
