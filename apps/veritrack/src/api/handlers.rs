//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! The engine itself is tolerant (no-ops on unknown ids), but the API
//! surfaces "not found" for unknown documents so clients polling a
//! cleaned-up run can tell the difference between "no progress yet" and
//! "no such run".

use super::{
    AppState,
    types::{
        AckResponse, AdvanceRequest, ExportResponse, FailRequest, HealthResponse,
        ProgressResponse, StageUpdateRequest, StartRunRequest, StartRunResponse,
        validate_document_id,
    },
};
use crate::store;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use veritrack_core::{Run, StageId, run_to_bytes, snapshot_checksum};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// START RUN HANDLER
// =============================================================================

/// Register and start a run.
pub async fn start_run_handler(
    State(state): State<AppState>,
    Json(request): Json<StartRunRequest>,
) -> impl IntoResponse {
    let (document_id, mode, stages) = match request.to_parts() {
        Ok(parts) => parts,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StartRunResponse::error(format!("Invalid run request: {}", e))),
            );
        }
    };

    let mut registry = state.registry.write().await;
    registry.start_run(
        document_id.clone(),
        &request.framework,
        mode,
        stages,
        store::now_epoch_ms(),
    );

    // Registry insert above guarantees presence.
    let Some(run) = registry.get(&document_id) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StartRunResponse::error("Run registration failed")),
        );
    };

    persist_snapshot(&state, run);
    tracing::info!(
        document = %document_id,
        framework = %run.framework,
        stages = run.tracker.stages().len(),
        "Run started"
    );
    (StatusCode::OK, Json(StartRunResponse::started(run)))
}

// =============================================================================
// PROGRESS HANDLER
// =============================================================================

/// Get the progress snapshot for a run.
pub async fn get_run_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProgressResponse::error(format!("{}", e))),
            );
        }
    };

    let registry = state.registry.read().await;
    match registry.get(&document_id) {
        Some(run) => (
            StatusCode::OK,
            Json(ProgressResponse::from_run(run, store::now_epoch_ms())),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(ProgressResponse::error(format!(
                "Run not found for document: {}",
                document_id
            ))),
        ),
    }
}

// =============================================================================
// STAGE UPDATE HANDLER
// =============================================================================

/// Update one stage's progress. The progress value is clamped by the
/// engine; an unknown stage id inside a known run is accepted as a no-op.
pub async fn update_stage_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(request): Json<StageUpdateRequest>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(format!("{}", e))),
            );
        }
    };
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AckResponse::error(format!("{}", e))),
        );
    }

    let mut registry = state.registry.write().await;
    if registry.get(&document_id).is_none() {
        return not_found_ack(&document_id);
    }

    let stage_id = StageId::new(&request.stage_id);
    registry.update_stage(&document_id, &stage_id, request.progress);

    ack_and_persist(&state, &registry, &document_id)
}

// =============================================================================
// ADVANCE HANDLER
// =============================================================================

/// Advance past a named stage. Advancing past the last stage is a no-op,
/// mirroring the best-effort progress model.
pub async fn advance_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(request): Json<AdvanceRequest>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(format!("{}", e))),
            );
        }
    };
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AckResponse::error(format!("{}", e))),
        );
    }

    let mut registry = state.registry.write().await;
    if registry.get(&document_id).is_none() {
        return not_found_ack(&document_id);
    }

    registry.advance_stage(&document_id, &StageId::new(&request.stage_id));

    ack_and_persist(&state, &registry, &document_id)
}

// =============================================================================
// COMPLETE HANDLER
// =============================================================================

/// Force terminal completion of a run. Idempotent.
pub async fn complete_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(format!("{}", e))),
            );
        }
    };

    let mut registry = state.registry.write().await;
    if registry.get(&document_id).is_none() {
        return not_found_ack(&document_id);
    }

    registry.complete_run(&document_id, store::now_epoch_ms());
    tracing::info!(document = %document_id, "Run completed");

    ack_and_persist(&state, &registry, &document_id)
}

// =============================================================================
// FAIL HANDLER
// =============================================================================

/// Mark a run failed, keeping whatever progress it reached.
pub async fn fail_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(request): Json<FailRequest>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(format!("{}", e))),
            );
        }
    };
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AckResponse::error(format!("{}", e))),
        );
    }

    let mut registry = state.registry.write().await;
    if registry.get(&document_id).is_none() {
        return not_found_ack(&document_id);
    }

    registry.fail_run(&document_id, store::now_epoch_ms(), &request.message);
    tracing::warn!(
        document = %document_id,
        message = %request.message,
        "Run failed"
    );

    ack_and_persist(&state, &registry, &document_id)
}

// =============================================================================
// EXPORT HANDLER
// =============================================================================

/// Export a run snapshot in the binary format, base64 encoded.
pub async fn export_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ExportResponse::error(format!("{}", e))),
            );
        }
    };

    let registry = state.registry.read().await;
    let Some(run) = registry.get(&document_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ExportResponse::error(format!(
                "Run not found for document: {}",
                document_id
            ))),
        );
    };

    match run_to_bytes(run) {
        Ok(data) => {
            let checksum = snapshot_checksum(&data);
            (StatusCode::OK, Json(ExportResponse::success(data, checksum)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}

// =============================================================================
// DELETE HANDLER
// =============================================================================

/// Remove a run from tracking and delete its snapshot file.
pub async fn delete_run_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let document_id = match validate_document_id(&document_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(format!("{}", e))),
            );
        }
    };

    let mut registry = state.registry.write().await;
    let Some(run) = registry.remove(&document_id) else {
        return not_found_ack(&document_id);
    };

    if let Err(e) = store::delete_snapshot(&state.data_dir, &document_id) {
        tracing::warn!(document = %document_id, "Snapshot delete failed: {}", e);
    }
    tracing::info!(document = %document_id, "Run cleaned up");

    (StatusCode::OK, Json(AckResponse::ok(&run)))
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// 404 acknowledgement for an unknown document.
fn not_found_ack(
    document_id: &veritrack_core::DocumentId,
) -> (StatusCode, Json<AckResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(AckResponse::error(format!(
            "Run not found for document: {}",
            document_id
        ))),
    )
}

/// Persist the current snapshot and acknowledge a mutation.
///
/// The registry holds the authoritative state, so a failed snapshot write
/// is logged but does not fail the request.
fn ack_and_persist(
    state: &AppState,
    registry: &veritrack_core::Registry,
    document_id: &veritrack_core::DocumentId,
) -> (StatusCode, Json<AckResponse>) {
    match registry.get(document_id) {
        Some(run) => {
            persist_snapshot(state, run);
            (StatusCode::OK, Json(AckResponse::ok(run)))
        }
        None => not_found_ack(document_id),
    }
}

/// Write a run snapshot, logging instead of propagating failures.
fn persist_snapshot(state: &AppState, run: &Run) {
    if let Err(e) = store::save_run(&state.data_dir, run) {
        tracing::warn!(
            document = %run.document_id,
            "Snapshot persist failed: {}",
            e
        );
    }
}
