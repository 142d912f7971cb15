//! # Core Type Definitions
//!
//! This module contains all core types for the Veritrack progress engine:
//! - Identifiers (`StageId`, `DocumentId`)
//! - Run lifecycle types (`RunStatus`, `ProcessingMode`)
//! - Error types (`VeritrackError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for time math to prevent overflow

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a stage within a run's stage sequence.
///
/// Stage identifiers are caller-supplied strings ("upload", "extraction").
/// Equality is plain string equality; the tracker never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageId(pub String);

impl StageId {
    /// Create a new stage identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for the document whose pipeline run is being tracked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Create a new document identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// RUN STATUS
// =============================================================================

/// Lifecycle status of a tracked run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Registered but not yet started.
    #[default]
    Pending,
    /// Stages are being worked through.
    Processing,
    /// All stages finished.
    Completed,
    /// The run was aborted with a failure message.
    Failed,
}

impl RunStatus {
    /// Get the status name as used in snapshots and API responses.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Processing => "processing",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    /// Check if this status is terminal (Completed or Failed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PROCESSING MODE
// =============================================================================

/// How the backing analysis pipeline processes the document.
///
/// The tracker does not change behavior per mode; the mode is carried
/// through snapshots so consumers can label runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Full checklist analysis.
    #[default]
    Smart,
    /// Fast single-pass analysis.
    Zap,
    /// Side-by-side comparison against a prior run.
    Comparison,
}

impl ProcessingMode {
    /// Get the mode name as used in snapshots and API responses.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingMode::Smart => "smart",
            ProcessingMode::Zap => "zap",
            ProcessingMode::Comparison => "comparison",
        }
    }

    /// Parse a mode name; unknown names map to the default (Smart).
    ///
    /// Tolerant by design: a mislabeled run is acceptable, a rejected
    /// run is not.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "zap" => ProcessingMode::Zap,
            "comparison" => ProcessingMode::Comparison,
            _ => ProcessingMode::Smart,
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Veritrack system.
///
/// Tracker and registry mutations are deliberately infallible (invalid
/// input is clamped or ignored); these errors cover the fallible edges of
/// the system: serialization, file I/O, configuration, and boundary
/// validation in the app layer.
#[derive(Debug, Error)]
pub enum VeritrackError {
    /// No run is registered for the given document.
    #[error("Run not found for document: {0}")]
    RunNotFound(DocumentId),

    /// A stage definition failed boundary validation.
    #[error("Invalid stage definition: {0}")]
    InvalidStage(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be parsed.
    #[error("Config error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminal_classification() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Processing.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn status_display_names() {
        assert_eq!(RunStatus::Processing.to_string(), "processing");
        assert_eq!(RunStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn mode_parse_lossy_defaults_to_smart() {
        assert_eq!(ProcessingMode::parse_lossy("zap"), ProcessingMode::Zap);
        assert_eq!(
            ProcessingMode::parse_lossy("comparison"),
            ProcessingMode::Comparison
        );
        assert_eq!(ProcessingMode::parse_lossy("turbo"), ProcessingMode::Smart);
    }

    #[test]
    fn identifiers_order_deterministically() {
        let mut ids = vec![
            DocumentId::new("doc-c"),
            DocumentId::new("doc-a"),
            DocumentId::new("doc-b"),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "doc-a");
        assert_eq!(ids[2].as_str(), "doc-c");
    }
}
