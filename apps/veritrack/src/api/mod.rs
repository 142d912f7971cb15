//! # Veritrack HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `POST /runs` - Register and start a run
//! - `GET /runs/{document_id}` - Get progress snapshot
//! - `POST /runs/{document_id}/stage` - Update one stage's progress
//! - `POST /runs/{document_id}/advance` - Advance past a named stage
//! - `POST /runs/{document_id}/complete` - Force terminal completion
//! - `POST /runs/{document_id}/fail` - Mark a run failed
//! - `GET /runs/{document_id}/export` - Export binary snapshot (base64)
//! - `DELETE /runs/{document_id}` - Remove run and snapshot
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `VERITRACK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `VERITRACK_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `VERITRACK_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `veritrack::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    advance_handler, complete_handler, delete_run_handler, export_handler, fail_handler,
    get_run_handler, health_handler, start_run_handler, update_stage_handler,
};
#[allow(unused_imports)]
pub use types::{
    AckResponse, AdvanceRequest, ExportResponse, FailRequest, HealthResponse, ProgressResponse,
    StageJson, StageSpec, StageUpdateRequest, StartRunRequest, StartRunResponse,
    validate_document_id,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use veritrack_core::{Registry, VeritrackError};

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the run registry plus the snapshot directory.
#[derive(Clone)]
pub struct AppState {
    /// The registry of tracked runs.
    pub registry: Arc<RwLock<Registry>>,
    /// Directory where snapshot files are written.
    pub data_dir: PathBuf,
}

impl AppState {
    /// Create new app state around a registry.
    #[must_use]
    pub fn new(registry: Registry, data_dir: PathBuf) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            data_dir,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `VERITRACK_CORS_ORIGINS`:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("VERITRACK_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (VERITRACK_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in VERITRACK_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No VERITRACK_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set VERITRACK_API_KEY environment variable to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/runs", post(handlers::start_run_handler))
        .route("/runs/{document_id}", get(handlers::get_run_handler))
        .route("/runs/{document_id}", delete(handlers::delete_run_handler))
        .route(
            "/runs/{document_id}/stage",
            post(handlers::update_stage_handler),
        )
        .route(
            "/runs/{document_id}/advance",
            post(handlers::advance_handler),
        )
        .route(
            "/runs/{document_id}/complete",
            post(handlers::complete_handler),
        )
        .route("/runs/{document_id}/fail", post(handlers::fail_handler))
        .route(
            "/runs/{document_id}/export",
            get(handlers::export_handler),
        );

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    registry: Registry,
    data_dir: PathBuf,
) -> Result<(), VeritrackError> {
    let state = AppState::new(registry, data_dir);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| VeritrackError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Veritrack HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| VeritrackError::IoError(format!("Server error: {}", e)))
}
