//! Error types for retain operations.
//!
//! Every failure the review core can report is a variant of [`RetainError`],
//! each carrying a stable [`ErrorCode`] for programmatic handling.

use thiserror::Error;

/// Result type alias for retain operations.
pub type RetainResult<T> = Result<T, RetainError>;

/// Main error type for all retain operations.
#[derive(Error, Debug)]
pub enum RetainError {
    /// The (tenant, question id) pair does not exist.
    #[error("Question not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        tenant_id: Option<String>,
        question_id: Option<String>,
    },

    /// Feedback value outside 1..=4.
    #[error("Invalid feedback: {value} (expected 1-4)")]
    InvalidFeedback { value: i64, code: ErrorCode },

    /// A question with the same id already exists for the tenant.
    #[error("Duplicate question: {question_id}")]
    DuplicateQuestion { question_id: String, code: ErrorCode },

    /// The stored record changed between read and save.
    #[error("Concurrent update conflict on question {question_id}")]
    Conflict { question_id: String, code: ErrorCode },

    /// Storage I/O failed.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error talking to a retain server.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Questions (Q_xxx)
    QuestionNotFound,
    QuestionDuplicate,
    QuestionConflict,

    // Review (REV_xxx)
    ReviewInvalidFeedback,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValTenantMismatch,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,
    DbCorruptRecord,

    // Network (NET_xxx)
    NetConnectionFailed,

    // Parse (PARSE_xxx)
    ParseInvalidFormat,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Parse a code string as produced by [`ErrorCode::as_str`].
    pub fn parse(code: &str) -> Option<Self> {
        let code = match code {
            "Q_001" => ErrorCode::QuestionNotFound,
            "Q_002" => ErrorCode::QuestionDuplicate,
            "Q_003" => ErrorCode::QuestionConflict,
            "REV_001" => ErrorCode::ReviewInvalidFeedback,
            "VAL_001" => ErrorCode::ValInvalidInput,
            "VAL_002" => ErrorCode::ValMissingField,
            "VAL_003" => ErrorCode::ValTenantMismatch,
            "DB_001" => ErrorCode::DbConnectionFailed,
            "DB_002" => ErrorCode::DbOperationFailed,
            "DB_003" => ErrorCode::DbCorruptRecord,
            "NET_001" => ErrorCode::NetConnectionFailed,
            "PARSE_001" => ErrorCode::ParseInvalidFormat,
            "INT_001" => ErrorCode::Internal,
            _ => return None,
        };
        Some(code)
    }

    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::QuestionNotFound => "Q_001",
            ErrorCode::QuestionDuplicate => "Q_002",
            ErrorCode::QuestionConflict => "Q_003",
            ErrorCode::ReviewInvalidFeedback => "REV_001",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValTenantMismatch => "VAL_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::DbCorruptRecord => "DB_003",
            ErrorCode::NetConnectionFailed => "NET_001",
            ErrorCode::ParseInvalidFormat => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl RetainError {
    /// Create a not found error for a tenant-scoped question.
    pub fn not_found(tenant_id: impl Into<String>, question_id: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();
        let question_id = question_id.into();
        Self::NotFound {
            message: format!("question '{}' does not exist for tenant '{}'", question_id, tenant_id),
            code: ErrorCode::QuestionNotFound,
            tenant_id: Some(tenant_id),
            question_id: Some(question_id),
        }
    }

    /// Create an invalid feedback error.
    pub fn invalid_feedback(value: i64) -> Self {
        Self::InvalidFeedback {
            value,
            code: ErrorCode::ReviewInvalidFeedback,
        }
    }

    /// Create a duplicate question error.
    pub fn duplicate(question_id: impl Into<String>) -> Self {
        Self::DuplicateQuestion {
            question_id: question_id.into(),
            code: ErrorCode::QuestionDuplicate,
        }
    }

    /// Create a version conflict error.
    pub fn conflict(question_id: impl Into<String>) -> Self {
        Self::Conflict {
            question_id: question_id.into(),
            code: ErrorCode::QuestionConflict,
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidFormat,
        }
    }

    /// Create an API (transport) error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. } => *code,
            Self::InvalidFeedback { code, .. } => *code,
            Self::DuplicateQuestion { code, .. } => *code,
            Self::Conflict { code, .. } => *code,
            Self::Persistence { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the caller may treat this error as a non-fatal skip.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateQuestion { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Check the question id; it may have been deleted"),
            Self::InvalidFeedback { .. } => {
                Some("Use 1 (proficient), 2 (fair), 3 (forgotten) or 4 (completely forgotten)")
            }
            Self::Conflict { .. } => Some("The question was reviewed concurrently; reload and retry"),
            Self::Persistence { .. } => Some("Check the database path and permissions"),
            Self::Network { .. } => Some("Check that the retain server is running and reachable"),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for client errors).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
            },
            404 => Self::NotFound {
                message: body.to_string(),
                code: ErrorCode::QuestionNotFound,
                tenant_id: None,
                question_id: None,
            },
            409 => Self::Conflict {
                question_id: body.to_string(),
                code: ErrorCode::QuestionConflict,
            },
            _ => Self::Internal(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<rusqlite::Error> for RetainError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
