//! SQLite-backed question store.
//!
//! All access goes through one connection behind a mutex, so each trait call
//! is a single critical section. `save` is one conditional `UPDATE` on
//! `(tenant_id, id, version)`, which gives the read-modify-write guarantee
//! across processes sharing the database file as well.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_owner, QuestionStore};
use crate::error::{ErrorCode, RetainError, RetainResult};
use crate::types::{Level, Question};

const SELECT_COLUMNS: &str = "id, tenant_id, question_text, answer_text, source, level, next_review,
     review_count, correct_count, created_at, last_reviewed, updated_at, version";

/// SQLite store for questions.
pub struct SqliteQuestionStore {
    conn: Mutex<Connection>,
}

impl SqliteQuestionStore {
    /// Open (or create) the database at `path`.
    ///
    /// Creates parent directories and the schema if missing.
    pub fn new(path: impl AsRef<Path>) -> RetainResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| RetainError::Persistence {
            message: format!("Failed to open database {}: {}", path.display(), e),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        tracing::info!("Opened question store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> RetainResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> RetainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RetainError::persistence(format!("Failed to acquire lock: {}", e)))
    }

    fn init_schema(&self) -> RetainResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            PRAGMA busy_timeout = 5000;

            CREATE TABLE IF NOT EXISTS questions (
                tenant_id TEXT NOT NULL,
                id TEXT NOT NULL,
                question_text TEXT NOT NULL,
                answer_text TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                level INTEGER NOT NULL CHECK (level BETWEEN 1 AND 4),
                next_review TEXT NOT NULL,
                review_count INTEGER NOT NULL DEFAULT 0,
                correct_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_reviewed TEXT,
                updated_at TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (tenant_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_questions_due ON questions(tenant_id, next_review);
            ",
        )?;

        Ok(())
    }

    /// Number of questions across all tenants.
    pub fn count(&self) -> RetainResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl QuestionStore for SqliteQuestionStore {
    async fn create(&self, tenant_id: &str, question: &Question) -> RetainResult<()> {
        ensure_owner(tenant_id, question)?;
        let conn = self.lock()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO questions
             (tenant_id, id, question_text, answer_text, source, level, next_review,
              review_count, correct_count, created_at, last_reviewed, updated_at, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                tenant_id,
                question.id,
                question.question_text,
                question.answer_text,
                question.source,
                question.level.value(),
                format_ts(question.next_review),
                question.review_count,
                question.correct_count,
                format_ts(question.created_at),
                question.last_reviewed.map(format_ts),
                format_ts(question.updated_at),
                question.version as i64,
            ],
        )?;

        if inserted == 0 {
            return Err(RetainError::duplicate(&question.id));
        }
        Ok(())
    }

    async fn get(&self, tenant_id: &str, id: &str) -> RetainResult<Question> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                &format!("SELECT {} FROM questions WHERE tenant_id = ?1 AND id = ?2", SELECT_COLUMNS),
                params![tenant_id, id],
                QuestionRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => row.into_question(),
            None => Err(RetainError::not_found(tenant_id, id)),
        }
    }

    async fn save(&self, tenant_id: &str, question: &Question) -> RetainResult<Question> {
        ensure_owner(tenant_id, question)?;
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE questions
             SET question_text = ?1, answer_text = ?2, source = ?3, level = ?4, next_review = ?5,
                 review_count = ?6, correct_count = ?7, last_reviewed = ?8, updated_at = ?9,
                 version = version + 1
             WHERE tenant_id = ?10 AND id = ?11 AND version = ?12",
            params![
                question.question_text,
                question.answer_text,
                question.source,
                question.level.value(),
                format_ts(question.next_review),
                question.review_count,
                question.correct_count,
                question.last_reviewed.map(format_ts),
                format_ts(question.updated_at),
                tenant_id,
                question.id,
                question.version as i64,
            ],
        )?;

        if updated == 0 {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT version FROM questions WHERE tenant_id = ?1 AND id = ?2",
                    params![tenant_id, question.id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match exists {
                Some(_) => RetainError::conflict(&question.id),
                None => RetainError::not_found(tenant_id, &question.id),
            });
        }

        Ok(Question {
            version: question.version + 1,
            ..question.clone()
        })
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> RetainResult<()> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM questions WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
        )?;

        if deleted == 0 {
            return Err(RetainError::not_found(tenant_id, id));
        }
        Ok(())
    }

    async fn list_due(&self, tenant_id: &str, as_of: DateTime<Utc>) -> RetainResult<Vec<Question>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM questions
             WHERE tenant_id = ?1 AND next_review <= ?2
             ORDER BY next_review ASC, rowid ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![tenant_id, format_ts(as_of)], QuestionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    async fn list(&self, tenant_id: &str) -> RetainResult<Vec<Question>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM questions WHERE tenant_id = ?1 ORDER BY rowid ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![tenant_id], QuestionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC so that text order is
/// chronological order.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(column: &str, value: &str) -> RetainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("bad {} '{}': {}", column, value, e)))
}

fn corrupt(message: String) -> RetainError {
    RetainError::Persistence {
        message,
        code: ErrorCode::DbCorruptRecord,
        source: None,
    }
}

/// Raw column values, converted to a [`Question`] outside the rusqlite closure
/// so that bad data surfaces as a typed error instead of a panic or default.
struct QuestionRow {
    id: String,
    tenant_id: String,
    question_text: String,
    answer_text: String,
    source: String,
    level: i64,
    next_review: String,
    review_count: i64,
    correct_count: i64,
    created_at: String,
    last_reviewed: Option<String>,
    updated_at: String,
    version: i64,
}

impl QuestionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            question_text: row.get(2)?,
            answer_text: row.get(3)?,
            source: row.get(4)?,
            level: row.get(5)?,
            next_review: row.get(6)?,
            review_count: row.get(7)?,
            correct_count: row.get(8)?,
            created_at: row.get(9)?,
            last_reviewed: row.get(10)?,
            updated_at: row.get(11)?,
            version: row.get(12)?,
        })
    }

    fn into_question(self) -> RetainResult<Question> {
        let level = u8::try_from(self.level)
            .ok()
            .and_then(|l| Level::new(l).ok())
            .ok_or_else(|| corrupt(format!("bad level {} on question {}", self.level, self.id)))?;
        let review_count = u32::try_from(self.review_count)
            .map_err(|_| corrupt(format!("bad review_count on question {}", self.id)))?;
        let correct_count = u32::try_from(self.correct_count)
            .map_err(|_| corrupt(format!("bad correct_count on question {}", self.id)))?;
        let version = u64::try_from(self.version)
            .map_err(|_| corrupt(format!("bad version on question {}", self.id)))?;

        Ok(Question {
            next_review: parse_ts("next_review", &self.next_review)?,
            created_at: parse_ts("created_at", &self.created_at)?,
            last_reviewed: self
                .last_reviewed
                .as_deref()
                .map(|s| parse_ts("last_reviewed", s))
                .transpose()?,
            updated_at: parse_ts("updated_at", &self.updated_at)?,
            id: self.id,
            tenant_id: self.tenant_id,
            question_text: self.question_text,
            answer_text: self.answer_text,
            source: self.source,
            level,
            review_count,
            correct_count,
            version,
        })
    }
}
