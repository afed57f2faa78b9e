//! Question endpoints: create, fetch, delete, review.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use retain_core::{ImportOutcome, LearningStats, NewQuestion, Question};

use crate::error::ApiResult;
use crate::extract::TenantId;
use crate::state::AppState;

/// Request body for creating a question.
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub source: String,
}

/// Response for creating a question.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub id: String,
    /// `created` or `skipped`.
    pub status: String,
}

impl From<ImportOutcome> for CreateQuestionResponse {
    fn from(outcome: ImportOutcome) -> Self {
        let status = if outcome.is_created() { "created" } else { "skipped" };
        Self {
            id: outcome.id().to_string(),
            status: status.to_string(),
        }
    }
}

/// Create a question, or skip it if the tenant already has it.
/// POST /questions
pub async fn create_question(
    State(state): State<AppState>,
    tenant: TenantId,
    Json(request): Json<CreateQuestionRequest>,
) -> ApiResult<(StatusCode, Json<CreateQuestionResponse>)> {
    let outcome = state
        .service
        .import_question(
            tenant.as_str(),
            NewQuestion::new(request.question, request.answer, request.source),
        )
        .await?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into())))
}

/// Get a question by id.
/// GET /questions/:id
pub async fn get_question(
    State(state): State<AppState>,
    tenant: TenantId,
    Path(id): Path<String>,
) -> ApiResult<Json<Question>> {
    let question = state.service.get_question(tenant.as_str(), &id).await?;
    Ok(Json(question))
}

/// Delete a question and return the updated statistics.
/// DELETE /questions/:id
pub async fn delete_question(
    State(state): State<AppState>,
    tenant: TenantId,
    Path(id): Path<String>,
) -> ApiResult<Json<LearningStats>> {
    state.service.delete_question(tenant.as_str(), &id).await?;
    let stats = state.service.get_stats(tenant.as_str()).await?;
    Ok(Json(stats))
}

/// Request body for submitting a review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// 1 = proficient, 2 = fair, 3 = forgotten, 4 = completely forgotten.
    pub feedback: i64,
}

/// Record a review and return the updated statistics.
/// POST /questions/:id/review
pub async fn review_question(
    State(state): State<AppState>,
    tenant: TenantId,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<LearningStats>> {
    let stats = state
        .service
        .submit_review(tenant.as_str(), &id, request.feedback)
        .await?;
    Ok(Json(stats))
}
