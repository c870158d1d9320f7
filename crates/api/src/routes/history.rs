//! Scan History Routes

use axum::extract::{Query, State};
use axum::Json;
use inference_engine::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{HistorySummary, ScanRecord};

use crate::error::ApiError;
use crate::AppState;

/// Upper bound on returned records
const MAX_LIMIT: usize = 500;

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Filter by verdict (`Safe`, `Moderate`, `Dangerous`)
    pub result: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for the history endpoint
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<ScanRecord>,
    pub count: usize,
    pub summary: HistorySummary,
}

/// Recent scans, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let filter = match params.result.as_deref().filter(|r| !r.is_empty()) {
        Some(raw) => Some(raw.parse::<Verdict>().map_err(ApiError::BadRequest)?),
        None => None,
    };

    let data = state.history.recent(filter, params.limit.min(MAX_LIMIT))?;
    let summary = state.history.summary()?;

    Ok(Json(HistoryResponse {
        count: data.len(),
        data,
        summary,
    }))
}
