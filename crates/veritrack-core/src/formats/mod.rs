//! # Formats Module
//!
//! Snapshot serialization for Veritrack runs. Pure byte transforms only;
//! file I/O lives in the app layer.

mod persistence;

pub use persistence::{
    MAX_SNAPSHOT_PAYLOAD_SIZE, SnapshotHeader, run_from_bytes, run_to_bytes, snapshot_checksum,
};
