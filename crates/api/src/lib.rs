//! PhishGuard API Server
//!
//! Serves URL scans, recent scan history, health and Prometheus metrics.

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use storage::ScanHistory;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod metrics;
pub mod rate_limit;
mod routes;
pub mod scanner;

pub use crate::config::{AppConfig, CorsConfig, LoggingConfig};
pub use crate::error::ApiError;
pub use crate::scanner::{ScanOutcome, Scanner, Scoring};

use crate::rate_limit::create_governor_config;

/// Application state shared across handlers
pub struct AppState {
    pub scanner: Scanner,
    pub history: ScanHistory,
    /// Absent when no global recorder was installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(scanner: Scanner, history: ScanHistory, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            scanner,
            history,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, config: &AppConfig) -> Result<Router, ApiError> {
    let mut scan_routes = Router::new().route("/api/customScan", post(routes::scan::custom_scan));
    if config.rate_limit.enabled {
        let governor = create_governor_config(&config.rate_limit)?;
        scan_routes = scan_routes.layer(GovernorLayer { config: governor });
    }

    Ok(Router::new()
        .route("/api/history", get(routes::history::get_history))
        .route("/api/v1/health", get(routes::health::health_handler))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .merge(scan_routes)
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|origin| {
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Run the server until Ctrl-C
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let metrics = crate::metrics::install()?;
    let scanner = Scanner::from_config(&config).context("building scanner")?;
    let history = ScanHistory::new(&config.history);

    let state = Arc::new(AppState::new(scanner, history, Some(metrics)));
    let app = create_router(state, &config)?;

    let addr = config.server.bind_address();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
