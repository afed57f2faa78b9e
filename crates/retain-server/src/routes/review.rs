//! Due list and statistics endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use retain_core::{LearningStats, QuestionSummary};

use crate::error::ApiResult;
use crate::extract::TenantId;
use crate::state::AppState;

/// Response for the due list.
#[derive(Debug, Serialize, Deserialize)]
pub struct DueResponse {
    pub questions: Vec<QuestionSummary>,
    pub total: usize,
}

/// Questions due now, oldest-overdue first.
/// GET /due
pub async fn get_due(
    State(state): State<AppState>,
    tenant: TenantId,
) -> ApiResult<Json<DueResponse>> {
    let questions = state.service.get_due(tenant.as_str(), Utc::now()).await?;
    Ok(Json(DueResponse {
        total: questions.len(),
        questions,
    }))
}

/// Learning statistics for the tenant.
/// GET /stats
pub async fn get_stats(
    State(state): State<AppState>,
    tenant: TenantId,
) -> ApiResult<Json<LearningStats>> {
    let stats = state.service.get_stats(tenant.as_str()).await?;
    Ok(Json(stats))
}
