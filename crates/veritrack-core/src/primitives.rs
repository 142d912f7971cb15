//! # Engine Constants
//!
//! Hardcoded runtime constants for the Veritrack CORE.
//!
//! Veritrack starts with zero runs but fixed logic. These values are
//! compiled into the binary and are immutable at runtime.

/// Scale factor for fixed-point progress percentages.
///
/// Overall progress is stored in hundredths of a percent (integer only):
/// `12.5% == 1250`. Per-stage progress stays a plain `0..=100` integer.
pub const PROGRESS_SCALE: u32 = 100;

/// Fully complete overall progress, in hundredths of a percent.
pub const PROGRESS_COMPLETE: u32 = 100 * PROGRESS_SCALE;

/// Maximum per-stage progress value.
pub const MAX_STAGE_PROGRESS: u8 = 100;

/// Magic bytes for the Veritrack snapshot format header.
///
/// - File Header = Magic Bytes ("VTRK") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"VTRK";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for stage and document identifier strings.
///
/// Identifiers longer than this will be rejected at the API boundary.
/// This prevents memory exhaustion from malicious or malformed input.
pub const MAX_ID_LENGTH: usize = 256;

/// Maximum length for stage names, descriptions, and failure messages.
pub const MAX_TEXT_LENGTH: usize = 4096;

/// Maximum number of stages in a single run.
///
/// Stage lists longer than this will be rejected to prevent DoS.
pub const MAX_STAGES: usize = 256;

/// Maximum estimated duration for a single stage, in seconds (30 days).
///
/// Bounds the estimated-end-time arithmetic so duration sums cannot
/// overflow when converted to milliseconds.
pub const MAX_STAGE_DURATION_SECS: u32 = 30 * 24 * 60 * 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_complete_is_ten_thousand() {
        assert_eq!(PROGRESS_COMPLETE, 10_000);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"VTRK");
    }
}
