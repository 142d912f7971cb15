//! # Snapshot Format
//!
//! Binary serialization for run snapshots.
//!
//! Format: Header (5 bytes) + postcard-serialized run data.
//! - 4 bytes: Magic ("VTRK")
//! - 1 byte: Version
//!
//! ## Validation
//!
//! Snapshots travel over the export endpoint and sit on disk where other
//! processes can scribble on them, so parsing validates before allocating:
//! - Maximum payload size limit (`MAX_SNAPSHOT_PAYLOAD_SIZE`)
//! - Header validation before payload parsing
//! - Graceful error handling for corrupted data

use crate::registry::Run;
use crate::{VeritrackError, primitives};

// =============================================================================
// SIZE LIMITS
// =============================================================================

/// Maximum allowed payload size for the snapshot format.
///
/// A run snapshot is a few kilobytes even with the largest permitted stage
/// list; 4 MB is a generous ceiling that still prevents allocation-based
/// memory exhaustion from corrupted or hostile data.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Minimum valid snapshot size (header only).
const MIN_SNAPSHOT_SIZE: usize = 5;

// =============================================================================
// SNAPSHOT HEADER
// =============================================================================

/// The snapshot header precedes all run data.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), VeritrackError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(VeritrackError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(VeritrackError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VeritrackError> {
        if bytes.len() < MIN_SNAPSHOT_SIZE {
            return Err(VeritrackError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a run to snapshot bytes (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn run_to_bytes(run: &Run) -> Result<Vec<u8>, VeritrackError> {
    let header = SnapshotHeader::new();

    let payload = postcard::to_stdvec(run)
        .map_err(|e| VeritrackError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_SNAPSHOT_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a run from snapshot bytes.
///
/// This is a pure transformation - no file I/O.
///
/// Validates, in order and before touching the payload:
/// 1. Minimum data size (header must be present)
/// 2. Maximum payload size (prevents memory exhaustion)
/// 3. Header magic bytes and version
pub fn run_from_bytes(bytes: &[u8]) -> Result<Run, VeritrackError> {
    if bytes.len() < MIN_SNAPSHOT_SIZE {
        return Err(VeritrackError::DeserializationError(
            "Data too short: minimum 5 bytes required".to_string(),
        ));
    }

    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(VeritrackError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_SNAPSHOT_SIZE..];
    let run: Run = postcard::from_bytes(payload).map_err(|e| {
        VeritrackError::DeserializationError(format!("Failed to deserialize run data: {}", e))
    })?;

    Ok(run)
}

/// FNV-1a 64-bit checksum over snapshot bytes.
///
/// Integrity marker for export payloads, not a cryptographic hash.
#[must_use]
pub fn snapshot_checksum(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// =============================================================================
// TESTS
// =============================================================================
