//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! These tests ensure the tracker's clamping, weighting, and tolerance
//! invariants hold for arbitrary stage lists and update sequences.

use proptest::collection::vec;
use proptest::prelude::*;
use veritrack_core::{Stage, StageId, Tracker};

/// Build a tracker with generated stage durations, ids "s0", "s1", ...
fn tracker_from_durations(durations: &[u32]) -> Tracker {
    let stages = durations
        .iter()
        .enumerate()
        .map(|(i, d)| Stage::new(format!("s{}", i), format!("Stage {}", i), "", *d))
        .collect();
    Tracker::new(stages)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Stage progress stays in [0, 100] no matter what values are written.
    #[test]
    fn stage_progress_always_in_range(
        durations in vec(0u32..1000, 1..12),
        updates in vec((0usize..12, -500i64..600), 0..40)
    ) {
        let mut tracker = tracker_from_durations(&durations);

        for (idx, value) in updates {
            let id = StageId::new(format!("s{}", idx));
            tracker.update_stage_progress(&id, value);
        }

        for stage in tracker.stages() {
            prop_assert!(stage.progress <= 100);
        }
        prop_assert!(tracker.overall_hundredths() <= 10_000);
    }

    /// Overall progress equals the integer duration-weighted mean.
    #[test]
    fn overall_matches_weighted_mean_formula(
        durations in vec(0u32..1000, 1..12),
        updates in vec((0usize..12, 0i64..101), 1..40)
    ) {
        let mut tracker = tracker_from_durations(&durations);

        for (idx, value) in &updates {
            let id = StageId::new(format!("s{}", idx));
            tracker.update_stage_progress(&id, *value);
        }

        let total: u64 = tracker.stages().iter()
            .map(|s| u64::from(s.estimated_secs))
            .sum();
        let weighted: u64 = tracker.stages().iter()
            .map(|s| u64::from(s.progress) * u64::from(s.estimated_secs))
            .sum();
        let expected = if total == 0 { 0 } else { weighted * 100 / total };

        // An all-zero-duration list must report 0, never an undefined value.
        prop_assert_eq!(u64::from(tracker.overall_hundredths()), expected);
    }

    /// complete_processing forces the terminal state from any prior state.
    #[test]
    fn complete_is_always_terminal(
        durations in vec(0u32..1000, 0..12),
        updates in vec((0usize..12, -500i64..600), 0..20),
        now_ms in 0u64..10_000_000
    ) {
        let mut tracker = tracker_from_durations(&durations);
        tracker.start_processing(now_ms, None);

        for (idx, value) in updates {
            let id = StageId::new(format!("s{}", idx));
            tracker.update_stage_progress(&id, value);
        }

        tracker.complete_processing();

        prop_assert_eq!(tracker.overall_hundredths(), 10_000);
        prop_assert!(tracker.stages().iter().all(|s| s.progress == 100));
        prop_assert_eq!(tracker.estimated_time_remaining_secs(now_ms), 0);
    }

    /// Advancing past the last stage or an unknown stage changes nothing.
    #[test]
    fn advance_beyond_sequence_is_identity(
        durations in vec(1u32..1000, 1..12),
        now_ms in 0u64..10_000_000
    ) {
        let mut tracker = tracker_from_durations(&durations);
        tracker.start_processing(now_ms, None);

        let last = StageId::new(format!("s{}", durations.len() - 1));
        let unknown = StageId::new("no-such-stage");

        let before = tracker.clone();
        tracker.advance_to_next_stage(&last);
        prop_assert_eq!(&tracker, &before);

        tracker.advance_to_next_stage(&unknown);
        prop_assert_eq!(&tracker, &before);
    }

    /// Walking every stage forward visits stages in insertion order and
    /// leaves a trail of 100% stages behind the pointer.
    #[test]
    fn advancing_walks_in_insertion_order(durations in vec(1u32..1000, 2..10)) {
        let mut tracker = tracker_from_durations(&durations);
        tracker.start_processing(0, None);

        for i in 0..durations.len() - 1 {
            let id = StageId::new(format!("s{}", i));
            tracker.advance_to_next_stage(&id);

            let current = tracker.current_stage().expect("pointer on real stage");
            let expected = format!("s{}", i + 1);
            prop_assert_eq!(current.id.as_str(), expected.as_str());
            prop_assert!(tracker.stages()[..=i].iter().all(|s| s.progress == 100));
        }
    }

    /// Elapsed time is non-decreasing while the clock moves forward.
    #[test]
    fn elapsed_is_monotonic(
        start_ms in 0u64..1_000_000,
        offsets in vec(0u64..100_000, 1..20)
    ) {
        let mut tracker = tracker_from_durations(&[10, 20]);
        tracker.start_processing(start_ms, None);

        let mut now = start_ms;
        let mut previous = 0;
        for offset in offsets {
            now = now.saturating_add(offset);
            let elapsed = tracker.elapsed_secs(now);
            prop_assert!(elapsed >= previous);
            previous = elapsed;
        }
    }

    /// Remaining time is the ceiling of the millisecond gap, never negative.
    #[test]
    fn remaining_is_ceiling_of_gap(
        durations in vec(1u32..100, 1..8),
        start_ms in 0u64..1_000_000,
        probe_offset_ms in 0u64..20_000_000
    ) {
        let mut tracker = tracker_from_durations(&durations);
        tracker.start_processing(start_ms, None);

        let end_ms = tracker.estimated_end_ms().expect("end set after start");
        let now = start_ms.saturating_add(probe_offset_ms);
        let remaining = tracker.estimated_time_remaining_secs(now);

        let gap_ms = end_ms.saturating_sub(now);
        prop_assert_eq!(remaining, gap_ms.div_ceil(1000));
    }

    /// format_duration round-trips back to the input second count.
    #[test]
    fn format_duration_preserves_total_seconds(secs in 0u64..100_000) {
        let rendered = veritrack_core::format_duration(secs);

        let reconstructed = if let Some((m, rest)) = rendered.split_once("m ") {
            let minutes: u64 = m.parse().expect("minutes");
            let seconds: u64 = rest.trim_end_matches('s').parse().expect("seconds");
            minutes * 60 + seconds
        } else {
            rendered.trim_end_matches('s').parse().expect("seconds")
        };

        prop_assert_eq!(reconstructed, secs);
    }
}
