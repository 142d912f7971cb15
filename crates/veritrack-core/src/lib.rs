//! # veritrack-core
//!
//! The deterministic progress engine for Veritrack - THE LOGIC.
//!
//! This crate models multi-stage document compliance pipeline runs: an
//! ordered stage list with duration-weighted overall progress, per-document
//! run lifecycle tracking, and a binary snapshot format.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the ONLY place where run state exists (stateful)
//! - Never reads the wall clock; callers pass epoch-millisecond timestamps
//! - Never raises errors from progress mutations; invalid input is clamped
//!   or ignored (tolerant-update policy)
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod primitives;
pub mod registry;
pub mod stage;
pub mod tracker;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{DocumentId, ProcessingMode, RunStatus, StageId, VeritrackError};

// =============================================================================
// RE-EXPORTS: Progress Engine
// =============================================================================

pub use registry::{Registry, Run};
pub use stage::{Stage, clamp_progress, default_stages};
pub use tracker::{Tracker, format_duration, format_percent};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{SnapshotHeader, run_from_bytes, run_to_bytes, snapshot_checksum};
