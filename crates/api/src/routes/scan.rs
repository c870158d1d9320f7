//! Scan Route

use axum::extract::State;
use axum::Json;
use inference_engine::Assessment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use storage::ScanRecord;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics::record_scan;
use crate::AppState;

/// Body of a scan request
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of a scan response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub url: String,
    pub used_fallback: bool,
}

/// Scan one URL
pub async fn custom_scan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No URL provided".to_string()))?
        .to_string();

    info!("Processing URL: {}", url);
    let started = Instant::now();
    let outcome = state.scanner.scan(&url).await?;
    record_scan(outcome.assessment.result, outcome.defaulted, started.elapsed());

    let record = ScanRecord::new(
        &url,
        outcome.assessment.result,
        outcome.assessment.safety_score,
        outcome.used_fallback,
    );
    if let Err(e) = state.history.insert(record) {
        warn!("Scan of {} not recorded: {}", url, e);
    }

    Ok(Json(ScanResponse {
        assessment: outcome.assessment,
        url,
        used_fallback: outcome.used_fallback,
    }))
}
