//! # Run Registry
//!
//! One compliance pipeline run per document, with lifecycle status and
//! failure capture. The registry is the in-memory source of truth for the
//! app layer; snapshot persistence lives in `formats` plus the app's file
//! I/O.
//!
//! Mutations addressing an unknown document are silent no-ops, the same
//! tolerant-update policy the tracker follows: progress signals may keep
//! arriving after a run was cleaned up, and that must never be an error.

use crate::tracker::Tracker;
use crate::{DocumentId, ProcessingMode, RunStatus, Stage, StageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// RUN
// =============================================================================

/// A tracked pipeline run for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// The document this run analyzes.
    pub document_id: DocumentId,
    /// Compliance framework the document is checked against.
    pub framework: String,
    /// Processing mode label carried through for consumers.
    pub mode: ProcessingMode,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Stage-level progress state.
    pub tracker: Tracker,
    /// Failure message, set only when status is Failed.
    pub failure: Option<String>,
    /// Epoch milliseconds when the run reached a terminal status.
    pub finished_at_ms: Option<u64>,
}

impl Run {
    /// Create a pending run; `start` transitions it to Processing.
    #[must_use]
    pub fn new(
        document_id: DocumentId,
        framework: impl Into<String>,
        mode: ProcessingMode,
        tracker: Tracker,
    ) -> Self {
        Self {
            document_id,
            framework: framework.into(),
            mode,
            status: RunStatus::Pending,
            tracker,
            failure: None,
            finished_at_ms: None,
        }
    }

    /// Start the run's tracker and mark it Processing.
    pub fn start(&mut self, now_ms: u64, start_stage: Option<&StageId>) {
        self.tracker.start_processing(now_ms, start_stage);
        self.status = RunStatus::Processing;
        self.failure = None;
        self.finished_at_ms = None;
    }

    /// Force completion of every stage and mark the run Completed.
    pub fn complete(&mut self, now_ms: u64) {
        self.tracker.complete_processing();
        self.status = RunStatus::Completed;
        self.finished_at_ms = Some(now_ms);
    }

    /// Mark the run Failed, keeping whatever progress was reached.
    pub fn fail(&mut self, now_ms: u64, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.failure = Some(message.into());
        self.finished_at_ms = Some(now_ms);
    }

    /// Whole seconds this run has been (or was) underway.
    ///
    /// Frozen at the finish timestamp once terminal, so completed runs
    /// report a stable elapsed time.
    #[must_use]
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        match self.finished_at_ms {
            Some(end) => self.tracker.elapsed_secs(end),
            None => self.tracker.elapsed_secs(now_ms),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// All active runs, keyed by document id.
///
/// `BTreeMap` keeps iteration order deterministic for listings and
/// snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    runs: BTreeMap<DocumentId, Run>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register and start a run, replacing any previous run for the
    /// same document.
    ///
    /// A `stages` of `None` uses the default five-stage pipeline.
    pub fn start_run(
        &mut self,
        document_id: DocumentId,
        framework: impl Into<String>,
        mode: ProcessingMode,
        stages: Option<Vec<Stage>>,
        now_ms: u64,
    ) {
        let tracker = match stages {
            Some(list) => Tracker::new(list),
            None => Tracker::default(),
        };
        let mut run = Run::new(document_id.clone(), framework, mode, tracker);
        run.start(now_ms, None);
        self.runs.insert(document_id, run);
    }

    /// Insert a run as-is, replacing any previous run for the same
    /// document. Used to rehydrate from persisted snapshots.
    pub fn insert(&mut self, run: Run) {
        self.runs.insert(run.document_id.clone(), run);
    }

    /// Update one stage's progress for a document. Unknown documents and
    /// unknown stages are no-ops.
    pub fn update_stage(&mut self, document_id: &DocumentId, stage_id: &StageId, value: i64) {
        if let Some(run) = self.runs.get_mut(document_id) {
            run.tracker.update_stage_progress(stage_id, value);
        }
    }

    /// Advance a document's run past the named stage. No-op for unknown
    /// documents, unknown stages, or the last stage.
    pub fn advance_stage(&mut self, document_id: &DocumentId, stage_id: &StageId) {
        if let Some(run) = self.runs.get_mut(document_id) {
            run.tracker.advance_to_next_stage(stage_id);
        }
    }

    /// Complete a document's run. Unknown documents are a no-op.
    pub fn complete_run(&mut self, document_id: &DocumentId, now_ms: u64) {
        if let Some(run) = self.runs.get_mut(document_id) {
            run.complete(now_ms);
        }
    }

    /// Fail a document's run with a message. Unknown documents are a no-op.
    pub fn fail_run(&mut self, document_id: &DocumentId, now_ms: u64, message: impl Into<String>) {
        if let Some(run) = self.runs.get_mut(document_id) {
            run.fail(now_ms, message);
        }
    }

    /// Look up the run for a document.
    #[must_use]
    pub fn get(&self, document_id: &DocumentId) -> Option<&Run> {
        self.runs.get(document_id)
    }

    /// Remove a run from tracking, returning it if present.
    pub fn remove(&mut self, document_id: &DocumentId) -> Option<Run> {
        self.runs.remove(document_id)
    }

    /// Document ids of every tracked run, in deterministic order.
    #[must_use]
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.runs.keys().cloned().collect()
    }

    /// Number of runs that are not yet terminal.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.runs.values().filter(|r| !r.status.is_terminal()).count()
    }

    /// Total number of tracked runs, terminal included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Check if no runs are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> DocumentId {
        DocumentId::new(id)
    }

    #[test]
    fn start_run_begins_processing_at_first_stage() {
        let mut registry = Registry::new();
        registry.start_run(doc("d1"), "SOC2", ProcessingMode::Smart, None, 1_000);

        let run = registry.get(&doc("d1")).expect("run exists");
        assert_eq!(run.status, RunStatus::Processing);
        assert_eq!(
            run.tracker.current_stage().map(|s| s.id.as_str()),
            Some("upload")
        );
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn start_run_replaces_previous_run_for_document() {
        let mut registry = Registry::new();
        registry.start_run(doc("d1"), "SOC2", ProcessingMode::Smart, None, 1_000);
        registry.update_stage(&doc("d1"), &StageId::new("upload"), 100);

        registry.start_run(doc("d1"), "HIPAA", ProcessingMode::Zap, None, 2_000);
        let run = registry.get(&doc("d1")).expect("run exists");
        assert_eq!(run.framework, "HIPAA");
        assert_eq!(run.tracker.overall_hundredths(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn mutations_on_unknown_document_are_noops() {
        let mut registry = Registry::new();
        registry.update_stage(&doc("ghost"), &StageId::new("upload"), 50);
        registry.advance_stage(&doc("ghost"), &StageId::new("upload"));
        registry.complete_run(&doc("ghost"), 1_000);
        registry.fail_run(&doc("ghost"), 1_000, "nope");

        assert!(registry.is_empty());
    }

    #[test]
    fn complete_run_is_terminal_with_frozen_elapsed() {
        let mut registry = Registry::new();
        registry.start_run(doc("d1"), "SOC2", ProcessingMode::Smart, None, 10_000);
        registry.complete_run(&doc("d1"), 25_000);

        let run = registry.get(&doc("d1")).expect("run exists");
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.tracker.overall_hundredths(), 10_000);
        assert_eq!(run.elapsed_secs(25_000), 15);
        // Elapsed frozen at finish time even as the clock keeps moving.
        assert_eq!(run.elapsed_secs(90_000), 15);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn fail_run_keeps_partial_progress() {
        let mut registry = Registry::new();
        registry.start_run(doc("d1"), "SOC2", ProcessingMode::Smart, None, 0);
        registry.update_stage(&doc("d1"), &StageId::new("upload"), 100);
        registry.fail_run(&doc("d1"), 5_000, "extraction timed out");

        let run = registry.get(&doc("d1")).expect("run exists");
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.failure.as_deref(), Some("extraction timed out"));
        assert_eq!(run.tracker.overall_hundredths(), 625);
    }

    #[test]
    fn remove_drops_tracking() {
        let mut registry = Registry::new();
        registry.start_run(doc("d1"), "SOC2", ProcessingMode::Smart, None, 0);

        let removed = registry.remove(&doc("d1"));
        assert!(removed.is_some());
        assert!(registry.get(&doc("d1")).is_none());
        assert!(registry.remove(&doc("d1")).is_none());
    }

    #[test]
    fn insert_rehydrates_without_restarting() {
        let mut registry = Registry::new();
        let mut run = Run::new(doc("d1"), "SOC2", ProcessingMode::Smart, Tracker::default());
        run.start(1_000, None);
        run.tracker.update_stage_progress(&StageId::new("upload"), 100);
        let expected = run.tracker.overall_hundredths();

        registry.insert(run);
        let restored = registry.get(&doc("d1")).expect("run exists");
        assert_eq!(restored.status, RunStatus::Processing);
        assert_eq!(restored.tracker.overall_hundredths(), expected);
    }

    #[test]
    fn document_ids_are_sorted() {
        let mut registry = Registry::new();
        registry.start_run(doc("b"), "SOC2", ProcessingMode::Smart, None, 0);
        registry.start_run(doc("a"), "SOC2", ProcessingMode::Smart, None, 0);
        registry.start_run(doc("c"), "SOC2", ProcessingMode::Smart, None, 0);

        let ids = registry.document_ids();
        let ids: Vec<&str> = ids.iter().map(|d| d.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
