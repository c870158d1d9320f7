//! Health Route

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    /// `model` or `rules`
    pub scoring: String,
    pub history_count: usize,
    pub lookup_cache: Option<CacheStatus>,
}

/// Lookup memo occupancy
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let lookup_cache = state.scanner.lookup_cache().map(|cache| {
        let (hits, misses) = cache.stats();
        CacheStatus {
            entries: cache.len(),
            capacity: cache.capacity(),
            hits,
            misses,
        }
    });

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        scoring: state.scanner.mode().to_string(),
        history_count: state.history.count(),
        lookup_cache,
    })
}
