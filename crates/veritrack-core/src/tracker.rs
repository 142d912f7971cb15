//! # Stage Progress Tracker
//!
//! The single source of truth for "how far along is this multi-step
//! operation and how long until it finishes."
//!
//! Overall progress is the duration-weighted mean of per-stage completion,
//! not simply which stage is current: a run sitting at the start of a long
//! stage reports less progress than one at the start of a short stage.
//!
//! ## Tolerant-Update Policy
//!
//! None of the mutating operations return errors. Out-of-range progress is
//! clamped, unknown stage identifiers are ignored, and advancing past the
//! last stage is a no-op. A stalled progress bar is acceptable; a crashing
//! one is not. Callers that want strict validation do it at their own
//! boundary (the app layer does).
//!
//! ## Determinism
//!
//! The tracker never reads the wall clock. Every time-dependent operation
//! takes `now_ms` (epoch milliseconds) from the caller, which keeps the
//! engine testable and this crate free of I/O.

use crate::StageId;
use crate::primitives::{MAX_STAGE_PROGRESS, PROGRESS_COMPLETE, PROGRESS_SCALE};
use crate::stage::{Stage, default_stages};
use serde::{Deserialize, Serialize};

// =============================================================================
// TRACKER
// =============================================================================

/// Progress state for one multi-stage run.
///
/// Stage order is insertion order; the tracker never reorders or drops
/// stages. `started_at_ms == 0` means "not started".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    stages: Vec<Stage>,
    current: Option<StageId>,
    started_at_ms: u64,
    estimated_end_ms: Option<u64>,
    overall_hundredths: u32,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(default_stages())
    }
}

impl Tracker {
    /// Create a tracker over a caller-supplied ordered stage list.
    ///
    /// An empty list is accepted; such a tracker simply never has a
    /// current stage.
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            current: None,
            started_at_ms: 0,
            estimated_end_ms: None,
            overall_hundredths: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Begin the run at `now_ms`.
    ///
    /// The current stage becomes `start_stage` if given (stored verbatim,
    /// even if it names no stage in the list), otherwise the first stage,
    /// otherwise nothing for an empty list. The estimated end time is
    /// `now_ms` plus the sum of every stage's duration estimate. Overall
    /// progress resets to 0; per-stage values are left alone so a caller
    /// restarting a reconfigured run keeps whatever it set up.
    pub fn start_processing(&mut self, now_ms: u64, start_stage: Option<&StageId>) {
        self.current = start_stage
            .cloned()
            .or_else(|| self.stages.first().map(|s| s.id.clone()));

        self.started_at_ms = now_ms;
        let total_ms = self.total_estimated_secs().saturating_mul(1000);
        self.estimated_end_ms = Some(now_ms.saturating_add(total_ms));
        self.overall_hundredths = 0;
    }

    /// Update one stage's completion value, clamped to `0..=100`.
    ///
    /// Only the stage whose id matches is touched; order and siblings are
    /// untouched. An unknown id is a deliberate no-op, since callers may
    /// reference a stage after the list was reconfigured.
    pub fn update_stage_progress(&mut self, stage_id: &StageId, value: i64) {
        let Some(stage) = self.stages.iter_mut().find(|s| &s.id == stage_id) else {
            return;
        };
        stage.set_progress(value);
        self.overall_hundredths = self.weighted_mean_hundredths();
    }

    /// Finish the named stage and move the pointer to the one after it.
    ///
    /// No-op when the id names the last stage or no stage at all: this is
    /// best-effort progress feedback, not a strict state machine. The
    /// overall value changes only through the implied 100% stage update.
    pub fn advance_to_next_stage(&mut self, stage_id: &StageId) {
        let Some(pos) = self.stages.iter().position(|s| &s.id == stage_id) else {
            return;
        };
        if pos + 1 >= self.stages.len() {
            return;
        }

        self.stages[pos].progress = MAX_STAGE_PROGRESS;
        self.overall_hundredths = self.weighted_mean_hundredths();
        self.current = Some(self.stages[pos + 1].id.clone());
    }

    /// Force terminal state: every stage and the overall value report 100%.
    ///
    /// Idempotent; safe to call regardless of the current position.
    pub fn complete_processing(&mut self) {
        for stage in &mut self.stages {
            stage.progress = MAX_STAGE_PROGRESS;
        }
        self.overall_hundredths = PROGRESS_COMPLETE;
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The stage the pointer currently rests on, if it names a real stage.
    ///
    /// `None` before start, or when the pointer references a stage that is
    /// no longer in the list.
    #[must_use]
    pub fn current_stage(&self) -> Option<&Stage> {
        let current = self.current.as_ref()?;
        self.stages.iter().find(|s| &s.id == current)
    }

    /// The raw current-stage pointer, without list lookup.
    #[must_use]
    pub fn current_stage_id(&self) -> Option<&StageId> {
        self.current.as_ref()
    }

    /// The ordered stage list.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Overall progress in hundredths of a percent (`0..=10_000`).
    #[must_use]
    pub fn overall_hundredths(&self) -> u32 {
        self.overall_hundredths
    }

    /// Check if overall progress has reached 100%.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.overall_hundredths >= PROGRESS_COMPLETE
    }

    /// Check if `start_processing` has been called.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started_at_ms != 0
    }

    /// Epoch milliseconds of the start call, 0 when not started.
    #[must_use]
    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Projected finish time in epoch milliseconds, set by `start_processing`.
    #[must_use]
    pub fn estimated_end_ms(&self) -> Option<u64> {
        self.estimated_end_ms
    }

    /// Sum of every stage's duration estimate, in seconds.
    #[must_use]
    pub fn total_estimated_secs(&self) -> u64 {
        self.stages
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(u64::from(s.estimated_secs)))
    }

    /// Whole seconds until the projected finish time, ceiling rounded.
    ///
    /// Returns 0 when no end time is set or the run is already complete.
    /// Advisory display math only; nothing enforces this estimate.
    #[must_use]
    pub fn estimated_time_remaining_secs(&self, now_ms: u64) -> u64 {
        let Some(end_ms) = self.estimated_end_ms else {
            return 0;
        };
        if self.is_complete() {
            return 0;
        }
        end_ms.saturating_sub(now_ms).div_ceil(1000)
    }

    /// Whole seconds since the start call, 0 before start.
    ///
    /// Non-decreasing while running; purely for display.
    #[must_use]
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        if self.started_at_ms == 0 {
            return 0;
        }
        now_ms.saturating_sub(self.started_at_ms) / 1000
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    /// Duration-weighted mean of per-stage completion, in hundredths.
    ///
    /// `Σ(progress × estimated_secs) × 100 / Σ(estimated_secs)`. A stage
    /// list whose durations sum to zero reports 0 rather than dividing by
    /// zero.
    fn weighted_mean_hundredths(&self) -> u32 {
        let total_secs = self.total_estimated_secs();
        if total_secs == 0 {
            return 0;
        }

        let weighted: u64 = self.stages.iter().fold(0u64, |acc, s| {
            acc.saturating_add(u64::from(s.progress) * u64::from(s.estimated_secs))
        });

        let hundredths = weighted.saturating_mul(u64::from(PROGRESS_SCALE)) / total_secs;
        hundredths.min(u64::from(PROGRESS_COMPLETE)) as u32
    }
}

// =============================================================================
// FORMATTING HELPERS
// =============================================================================

/// Render a second count as `"{m}m {s}s"`, or `"{s}s"` under one minute.
///
/// Pure and deterministic; used by every display surface.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Render fixed-point hundredths as a percentage string: `625` → `"6.25%"`.
#[must_use]
pub fn format_percent(hundredths: u32) -> String {
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}

// =============================================================================
// TESTS
// =============================================================================
