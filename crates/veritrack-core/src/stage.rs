//! # Stage Definitions
//!
//! A Stage is a named phase of a multi-step pipeline run with an
//! author-supplied duration estimate (its weight in the overall progress
//! calculation) and a `0..=100` completion value.
//!
//! The default stage set mirrors the compliance pipeline:
//!
//! | Stage | Estimated Duration |
//! |-------|--------------------|
//! | upload | 10s |
//! | processing | 30s |
//! | extraction | 45s |
//! | compliance | 60s |
//! | finalization | 15s |
//!
//! These identifiers and weights are contractual: consumers may override
//! the list, but the defaults never change silently.

use crate::StageId;
use crate::primitives::MAX_STAGE_PROGRESS;
use serde::{Deserialize, Serialize};

// =============================================================================
// DEFAULT STAGE WEIGHTS (Contractual Reference Values)
// =============================================================================

/// Estimated duration of the upload stage, in seconds.
pub const UPLOAD_SECS: u32 = 10;

/// Estimated duration of the processing stage, in seconds.
pub const PROCESSING_SECS: u32 = 30;

/// Estimated duration of the extraction stage, in seconds.
pub const EXTRACTION_SECS: u32 = 45;

/// Estimated duration of the compliance analysis stage, in seconds.
pub const COMPLIANCE_SECS: u32 = 60;

/// Estimated duration of the finalization stage, in seconds.
pub const FINALIZATION_SECS: u32 = 15;

// =============================================================================
// STAGE
// =============================================================================

/// A named phase of a pipeline run.
///
/// `estimated_secs` is the stage's weight in the duration-weighted overall
/// progress mean, not an enforced timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Unique key within the run's stage sequence.
    pub id: StageId,
    /// Human-readable display name.
    pub name: String,
    /// Short description shown next to the progress indicator.
    pub description: String,
    /// Author-supplied duration estimate in seconds (progress weight).
    pub estimated_secs: u32,
    /// Completion value, always within `0..=100`.
    pub progress: u8,
}

impl Stage {
    /// Create a new stage with zero progress.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        estimated_secs: u32,
    ) -> Self {
        Self {
            id: StageId::new(id),
            name: name.into(),
            description: description.into(),
            estimated_secs,
            progress: 0,
        }
    }

    /// Set the completion value, clamping to `0..=100`.
    ///
    /// Accepts any `i64` so callers never have to pre-validate: -50 clamps
    /// to 0, 500 clamps to 100.
    pub fn set_progress(&mut self, value: i64) {
        self.progress = clamp_progress(value);
    }

    /// Check if this stage has reached full completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= MAX_STAGE_PROGRESS
    }
}

/// Clamp a raw progress value to the `0..=100` stage range.
#[must_use]
pub fn clamp_progress(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_STAGE_PROGRESS)) as u8
}

// =============================================================================
// DEFAULT STAGE SET
// =============================================================================

/// The default five-stage compliance pipeline.
///
/// Total estimated duration: 160 seconds.
#[must_use]
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new(
            "upload",
            "Document Upload",
            "Uploading document to the analysis service",
            UPLOAD_SECS,
        ),
        Stage::new(
            "processing",
            "Processing",
            "Preparing document for extraction",
            PROCESSING_SECS,
        ),
        Stage::new(
            "extraction",
            "Content Extraction",
            "Extracting text and structure",
            EXTRACTION_SECS,
        ),
        Stage::new(
            "compliance",
            "Compliance Analysis",
            "Scoring document against the checklist",
            COMPLIANCE_SECS,
        ),
        Stage::new(
            "finalization",
            "Finalization",
            "Assembling the compliance report",
            FINALIZATION_SECS,
        ),
    ]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_absorbs_out_of_range_input() {
        assert_eq!(clamp_progress(-50), 0);
        assert_eq!(clamp_progress(0), 0);
        assert_eq!(clamp_progress(73), 73);
        assert_eq!(clamp_progress(100), 100);
        assert_eq!(clamp_progress(500), 100);
    }

    #[test]
    fn set_progress_clamps_on_write() {
        let mut stage = Stage::new("upload", "Upload", "", UPLOAD_SECS);
        stage.set_progress(500);
        assert_eq!(stage.progress, 100);
        stage.set_progress(-50);
        assert_eq!(stage.progress, 0);
    }

    #[test]
    fn default_stage_set_is_contractual() {
        let stages = default_stages();
        let ids: Vec<&str> = stages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "upload",
                "processing",
                "extraction",
                "compliance",
                "finalization"
            ]
        );

        let total: u32 = stages.iter().map(|s| s.estimated_secs).sum();
        assert_eq!(total, 160);
    }

    #[test]
    fn new_stage_starts_at_zero() {
        let stage = Stage::new("compliance", "Compliance Analysis", "", COMPLIANCE_SECS);
        assert_eq!(stage.progress, 0);
        assert!(!stage.is_complete());
    }
}
