//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Boundary validation happens here: the core engine is tolerant by
//! design, so anything that should be *rejected* (oversized identifiers,
//! absurd stage lists, path-traversal document ids) is rejected before it
//! reaches the registry.

use serde::{Deserialize, Serialize};
use veritrack_core::{
    DocumentId, ProcessingMode, Run, Stage, VeritrackError, format_duration, format_percent,
    primitives::{MAX_ID_LENGTH, MAX_STAGES, MAX_STAGE_DURATION_SECS, MAX_TEXT_LENGTH},
};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// Validate a document id for use as both a registry key and a snapshot
/// file name.
///
/// Rejects empty and oversized ids, and anything that could escape the
/// snapshot directory when used in a file name.
pub fn validate_document_id(id: &str) -> Result<DocumentId, VeritrackError> {
    if id.is_empty() {
        return Err(VeritrackError::InvalidStage(
            "Document id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(VeritrackError::InvalidStage(format!(
            "Document id length {} exceeds maximum {} bytes",
            id.len(),
            MAX_ID_LENGTH
        )));
    }
    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(VeritrackError::InvalidStage(
            "Document id must not contain path separators".to_string(),
        ));
    }
    Ok(DocumentId::new(id))
}

/// Validate a stage id string from a request body.
fn validate_stage_id(id: &str) -> Result<(), VeritrackError> {
    if id.is_empty() {
        return Err(VeritrackError::InvalidStage(
            "Stage id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(VeritrackError::InvalidStage(format!(
            "Stage id length {} exceeds maximum {} bytes",
            id.len(),
            MAX_ID_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// START RUN REQUEST/RESPONSE
// =============================================================================

/// One stage definition in a custom stage list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub estimated_secs: u32,
}

impl StageSpec {
    /// Convert to a core Stage, validating fields.
    pub fn to_stage(&self) -> Result<Stage, VeritrackError> {
        validate_stage_id(&self.id)?;
        if self.name.len() > MAX_TEXT_LENGTH || self.description.len() > MAX_TEXT_LENGTH {
            return Err(VeritrackError::InvalidStage(format!(
                "Stage text exceeds maximum {} bytes",
                MAX_TEXT_LENGTH
            )));
        }
        if self.estimated_secs > MAX_STAGE_DURATION_SECS {
            return Err(VeritrackError::InvalidStage(format!(
                "Estimated duration {}s exceeds maximum {}s",
                self.estimated_secs, MAX_STAGE_DURATION_SECS
            )));
        }
        Ok(Stage::new(
            &self.id,
            &self.name,
            &self.description,
            self.estimated_secs,
        ))
    }
}

/// Request to register and start a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunRequest {
    pub document_id: String,
    pub framework: String,
    /// Processing mode name; unknown names fall back to "smart".
    #[serde(default)]
    pub mode: Option<String>,
    /// Custom ordered stage list; omit for the default pipeline.
    #[serde(default)]
    pub stages: Option<Vec<StageSpec>>,
}

impl StartRunRequest {
    /// Validate and convert the request into registry inputs.
    pub fn to_parts(
        &self,
    ) -> Result<(DocumentId, ProcessingMode, Option<Vec<Stage>>), VeritrackError> {
        let document_id = validate_document_id(&self.document_id)?;

        if self.framework.is_empty() || self.framework.len() > MAX_ID_LENGTH {
            return Err(VeritrackError::InvalidStage(format!(
                "Framework must be 1..={} bytes",
                MAX_ID_LENGTH
            )));
        }

        let mode = self
            .mode
            .as_deref()
            .map(ProcessingMode::parse_lossy)
            .unwrap_or_default();

        let stages = match &self.stages {
            None => None,
            Some(specs) => {
                if specs.len() > MAX_STAGES {
                    return Err(VeritrackError::InvalidStage(format!(
                        "Stage count {} exceeds maximum {}",
                        specs.len(),
                        MAX_STAGES
                    )));
                }
                let mut stages = Vec::with_capacity(specs.len());
                for spec in specs {
                    let stage = spec.to_stage()?;
                    if stages.iter().any(|s: &Stage| s.id == stage.id) {
                        return Err(VeritrackError::InvalidStage(format!(
                            "Duplicate stage id: {}",
                            stage.id
                        )));
                    }
                    stages.push(stage);
                }
                Some(stages)
            }
        };

        Ok((document_id, mode, stages))
    }
}

/// Response to a start-run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunResponse {
    pub success: bool,
    pub document_id: Option<String>,
    pub status: Option<String>,
    pub total_estimated_secs: Option<u64>,
    pub error: Option<String>,
}

impl StartRunResponse {
    pub fn started(run: &Run) -> Self {
        Self {
            success: true,
            document_id: Some(run.document_id.as_str().to_string()),
            status: Some(run.status.name().to_string()),
            total_estimated_secs: Some(run.tracker.total_estimated_secs()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            document_id: None,
            status: None,
            total_estimated_secs: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// MUTATION REQUESTS
// =============================================================================

/// Request to update one stage's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdateRequest {
    pub stage_id: String,
    /// Raw progress value; the engine clamps to [0, 100].
    pub progress: i64,
}

impl StageUpdateRequest {
    pub fn validate(&self) -> Result<(), VeritrackError> {
        validate_stage_id(&self.stage_id)
    }
}

/// Request to advance past a named stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub stage_id: String,
}

impl AdvanceRequest {
    pub fn validate(&self) -> Result<(), VeritrackError> {
        validate_stage_id(&self.stage_id)
    }
}

/// Request to mark a run failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailRequest {
    pub message: String,
}

impl FailRequest {
    pub fn validate(&self) -> Result<(), VeritrackError> {
        if self.message.len() > MAX_TEXT_LENGTH {
            return Err(VeritrackError::InvalidStage(format!(
                "Failure message exceeds maximum {} bytes",
                MAX_TEXT_LENGTH
            )));
        }
        Ok(())
    }
}

/// Generic acknowledgement for mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    pub status: Option<String>,
    pub overall_hundredths: Option<u32>,
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok(run: &Run) -> Self {
        Self {
            success: true,
            status: Some(run.status.name().to_string()),
            overall_hundredths: Some(run.tracker.overall_hundredths()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            overall_hundredths: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PROGRESS RESPONSE
// =============================================================================

/// One stage in a progress response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageJson {
    pub id: String,
    pub name: String,
    pub description: String,
    pub estimated_secs: u32,
    pub progress: u8,
}

impl StageJson {
    fn from_stage(stage: &Stage) -> Self {
        Self {
            id: stage.id.as_str().to_string(),
            name: stage.name.clone(),
            description: stage.description.clone(),
            estimated_secs: stage.estimated_secs,
            progress: stage.progress,
        }
    }
}

/// Full progress snapshot for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub document_id: Option<String>,
    pub framework: Option<String>,
    pub mode: Option<String>,
    pub status: Option<String>,
    pub overall_hundredths: Option<u32>,
    /// Pre-rendered percentage string, e.g. "6.25%".
    pub overall_display: Option<String>,
    pub current_stage: Option<StageJson>,
    #[serde(default)]
    pub stages: Vec<StageJson>,
    pub elapsed_secs: Option<u64>,
    pub remaining_secs: Option<u64>,
    /// Pre-rendered "{m}m {s}s" strings for direct display.
    pub elapsed_display: Option<String>,
    pub remaining_display: Option<String>,
    pub failure: Option<String>,
    pub error: Option<String>,
}

impl ProgressResponse {
    pub fn from_run(run: &Run, now_ms: u64) -> Self {
        let elapsed = run.elapsed_secs(now_ms);
        let remaining = run.tracker.estimated_time_remaining_secs(now_ms);
        Self {
            success: true,
            document_id: Some(run.document_id.as_str().to_string()),
            framework: Some(run.framework.clone()),
            mode: Some(run.mode.name().to_string()),
            status: Some(run.status.name().to_string()),
            overall_hundredths: Some(run.tracker.overall_hundredths()),
            overall_display: Some(format_percent(run.tracker.overall_hundredths())),
            current_stage: run.tracker.current_stage().map(StageJson::from_stage),
            stages: run.tracker.stages().iter().map(StageJson::from_stage).collect(),
            elapsed_secs: Some(elapsed),
            remaining_secs: Some(remaining),
            elapsed_display: Some(format_duration(elapsed)),
            remaining_display: Some(format_duration(remaining)),
            failure: run.failure.clone(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            document_id: None,
            framework: None,
            mode: None,
            status: None,
            overall_hundredths: None,
            overall_display: None,
            current_stage: None,
            stages: vec![],
            elapsed_secs: None,
            remaining_secs: None,
            elapsed_display: None,
            remaining_display: None,
            failure: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EXPORT RESPONSE
// =============================================================================

/// Snapshot export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded
    pub checksum: Option<u64>,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(data: Vec<u8>, checksum: u64) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                &data,
            )),
            checksum: Some(checksum),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            checksum: None,
            error: Some(msg.into()),
        }
    }
}
