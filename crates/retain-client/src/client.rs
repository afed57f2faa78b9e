//! Review client implementation for the retain REST API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use retain_core::{
    ErrorCode, ImportOutcome, ImportReport, LearningStats, Question, QuestionSummary,
    RetainError, RetainResult,
};

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client for one tenant of a retain server.
pub struct ReviewClient {
    client: Client,
    base_url: String,
    tenant: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateResponse {
    id: String,
    status: String,
}

/// Due questions as returned by `GET /due`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueList {
    pub questions: Vec<QuestionSummary>,
    pub total: usize,
}

/// Result of `POST /import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub report: ImportReport,
    pub stats: LearningStats,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    message: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl ReviewClient {
    /// Create a client for `tenant` on the server at `base_url`.
    pub fn new(base_url: &str, tenant: &str) -> RetainResult<Self> {
        Self::with_options(base_url, tenant, None)
    }

    /// Create a client, optionally sending an API key on every request.
    pub fn with_options(base_url: &str, tenant: &str, api_key: Option<&str>) -> RetainResult<Self> {
        if tenant.trim().is_empty() {
            return Err(RetainError::Configuration("tenant must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("X-Tenant-Id", header_value(tenant)?);
        if let Some(key) = api_key {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", key))?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RetainError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
        })
    }

    /// Create a client from environment variables.
    ///
    /// Reads `RETAIN_TENANT` (required), `RETAIN_BASE_URL` and `RETAIN_API_KEY`.
    pub fn from_env() -> RetainResult<Self> {
        let tenant = std::env::var("RETAIN_TENANT")
            .map_err(|_| RetainError::Configuration("RETAIN_TENANT not set".to_string()))?;
        let base_url =
            std::env::var("RETAIN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var("RETAIN_API_KEY").ok();

        Self::with_options(&base_url, &tenant, api_key.as_deref())
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a question, or learn that the tenant already has it.
    pub async fn create_question(
        &self,
        question: &str,
        answer: &str,
        source: &str,
    ) -> RetainResult<ImportOutcome> {
        let body = json!({ "question": question, "answer": answer, "source": source });

        let response = self
            .client
            .post(self.url("/questions"))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to create question: {}", e)))?;

        let created: CreateResponse = parse(response).await?;
        Ok(match created.status.as_str() {
            "created" => ImportOutcome::Created(created.id),
            _ => ImportOutcome::Skipped(created.id),
        })
    }

    /// Get a question by id.
    pub async fn get_question(&self, id: &str) -> RetainResult<Question> {
        let response = self
            .client
            .get(self.url(&format!("/questions/{}", id)))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to get question: {}", e)))?;

        parse(response).await
    }

    /// Delete a question, returning the updated statistics.
    pub async fn delete_question(&self, id: &str) -> RetainResult<LearningStats> {
        let response = self
            .client
            .delete(self.url(&format!("/questions/{}", id)))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to delete question: {}", e)))?;

        parse(response).await
    }

    /// Submit feedback (1-4) for a question, returning the updated statistics.
    pub async fn submit_review(&self, id: &str, feedback: i64) -> RetainResult<LearningStats> {
        let response = self
            .client
            .post(self.url(&format!("/questions/{}/review", id)))
            .json(&json!({ "feedback": feedback }))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to submit review: {}", e)))?;

        parse(response).await
    }

    /// Questions due now.
    pub async fn get_due(&self) -> RetainResult<DueList> {
        let response = self
            .client
            .get(self.url("/due"))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to get due questions: {}", e)))?;

        parse(response).await
    }

    /// Learning statistics.
    pub async fn get_stats(&self) -> RetainResult<LearningStats> {
        let response = self
            .client
            .get(self.url("/stats"))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to get stats: {}", e)))?;

        parse(response).await
    }

    /// Ask the server to import its configured question directories.
    pub async fn import(&self) -> RetainResult<ImportResult> {
        let response = self
            .client
            .post(self.url("/import"))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to import: {}", e)))?;

        parse(response).await
    }

    /// Check that the server is up.
    pub async fn health(&self) -> RetainResult<bool> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| RetainError::api(format!("Failed to reach server: {}", e)))?;

        Ok(response.status().is_success())
    }
}

fn header_value(value: &str) -> RetainResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RetainError::Configuration(format!("Invalid header value: {}", e)))
}

async fn parse<T: DeserializeOwned>(response: Response) -> RetainResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_body(status.as_u16(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| RetainError::api(format!("Failed to parse response: {}", e)))
}

/// Rebuild a typed error from a non-2xx response.
///
/// The envelope's `code` selects the variant; bodies without one fall back
/// to the HTTP status.
fn error_from_body(status: u16, body: &str) -> RetainError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return RetainError::from_http_status(status, body);
    };
    let ErrorBody {
        code,
        message,
        details,
    } = envelope.error;

    let Some(code) = ErrorCode::parse(&code) else {
        return RetainError::from_http_status(status, &message);
    };
    // Server messages are the rendered error; keep only the cause.
    let cause = message
        .split_once(": ")
        .map_or(message.as_str(), |(_, cause)| cause)
        .to_string();

    match code {
        ErrorCode::ReviewInvalidFeedback => {
            let value = details
                .as_ref()
                .and_then(|d| d.get("value"))
                .and_then(serde_json::Value::as_i64)
                .unwrap_or_default();
            RetainError::invalid_feedback(value)
        }
        ErrorCode::QuestionNotFound => RetainError::NotFound {
            message: cause,
            code,
            tenant_id: None,
            question_id: None,
        },
        ErrorCode::QuestionDuplicate => RetainError::DuplicateQuestion {
            question_id: cause,
            code,
        },
        ErrorCode::QuestionConflict => RetainError::Conflict {
            question_id: message,
            code,
        },
        ErrorCode::DbConnectionFailed
        | ErrorCode::DbOperationFailed
        | ErrorCode::DbCorruptRecord => RetainError::Persistence {
            message: cause,
            code,
            source: None,
        },
        ErrorCode::ValInvalidInput | ErrorCode::ValMissingField | ErrorCode::ValTenantMismatch => {
            RetainError::Validation {
                message: cause,
                code,
            }
        }
        ErrorCode::ParseInvalidFormat => RetainError::Parse {
            message: cause,
            code,
        },
        ErrorCode::NetConnectionFailed | ErrorCode::Internal => {
            RetainError::from_http_status(status, &message)
        }
    }
}
