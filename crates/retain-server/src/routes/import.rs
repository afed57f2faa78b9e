//! Import endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use retain_core::import::markdown;
use retain_core::{ImportReport, LearningStats};

use crate::error::{ApiError, ApiResult};
use crate::extract::TenantId;
use crate::state::AppState;

/// Response for an import run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub report: ImportReport,
    pub stats: LearningStats,
}

/// Parse the configured question directories into the tenant's set.
/// POST /import
pub async fn import_questions(
    State(state): State<AppState>,
    tenant: TenantId,
) -> ApiResult<Json<ImportResponse>> {
    let dirs = state.question_dirs();
    let parsed = tokio::task::spawn_blocking(move || markdown::parse_dirs(&dirs))
        .await
        .map_err(|e| ApiError::internal(format!("Import task failed: {}", e)))??;

    let report = state.service.import_batch(tenant.as_str(), parsed).await;
    let stats = state.service.get_stats(tenant.as_str()).await?;

    Ok(Json(ImportResponse { report, stats }))
}
