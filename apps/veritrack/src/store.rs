//! # Snapshot Store
//!
//! File persistence for run snapshots: one `{document_id}_progress.vtrk`
//! file per tracked document, written through the core's binary snapshot
//! format. The core stays pure; every filesystem touch lives here.
//!
//! Snapshot writes are advisory. A failed write is logged and swallowed by
//! callers driving live runs (the in-memory registry remains the source of
//! truth); reads surface errors so the CLI can report missing or corrupt
//! files.

use std::path::{Path, PathBuf};
use veritrack_core::{
    DocumentId, Run, VeritrackError, formats::MAX_SNAPSHOT_PAYLOAD_SIZE, run_from_bytes,
    run_to_bytes,
};

/// File name suffix for run snapshots.
pub const SNAPSHOT_SUFFIX: &str = "_progress.vtrk";

// =============================================================================
// PATHS
// =============================================================================

/// Snapshot file path for a document.
///
/// Document ids are validated at the API/CLI boundary to contain no path
/// separators, so joining is safe here.
#[must_use]
pub fn snapshot_path(data_dir: &Path, document_id: &DocumentId) -> PathBuf {
    data_dir.join(format!("{}{}", document_id.as_str(), SNAPSHOT_SUFFIX))
}

// =============================================================================
// READ / WRITE
// =============================================================================

/// Persist a run snapshot, creating the data directory if needed.
pub fn save_run(data_dir: &Path, run: &Run) -> Result<(), VeritrackError> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| VeritrackError::IoError(format!("Create data dir: {}", e)))?;

    let bytes = run_to_bytes(run)?;
    let path = snapshot_path(data_dir, &run.document_id);
    std::fs::write(&path, &bytes)
        .map_err(|e| VeritrackError::IoError(format!("Write snapshot: {}", e)))?;
    Ok(())
}

/// Load a run snapshot for a document.
pub fn load_run(data_dir: &Path, document_id: &DocumentId) -> Result<Run, VeritrackError> {
    let path = snapshot_path(data_dir, document_id);
    if !path.exists() {
        return Err(VeritrackError::RunNotFound(document_id.clone()));
    }

    // Validate size before reading to avoid loading an oversized file
    // that the parser would reject anyway.
    let metadata = std::fs::metadata(&path)
        .map_err(|e| VeritrackError::IoError(format!("Read snapshot metadata: {}", e)))?;
    if metadata.len() > MAX_SNAPSHOT_PAYLOAD_SIZE as u64 {
        return Err(VeritrackError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let bytes = std::fs::read(&path)
        .map_err(|e| VeritrackError::IoError(format!("Read snapshot: {}", e)))?;
    run_from_bytes(&bytes)
}

/// Delete a document's snapshot file. Missing files are fine.
pub fn delete_snapshot(data_dir: &Path, document_id: &DocumentId) -> Result<(), VeritrackError> {
    let path = snapshot_path(data_dir, document_id);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VeritrackError::IoError(format!("Delete snapshot: {}", e))),
    }
}

/// Load every readable snapshot in the data directory, sorted by document
/// id. Corrupt or foreign files are skipped with a warning rather than
/// failing the whole listing.
pub fn list_runs(data_dir: &Path) -> Result<Vec<Run>, VeritrackError> {
    let mut runs = Vec::new();

    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(runs),
        Err(e) => return Err(VeritrackError::IoError(format!("Read data dir: {}", e))),
    };

    for entry in entries {
        let entry = entry.map_err(|e| VeritrackError::IoError(format!("Read data dir: {}", e)))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(document_id) = name.strip_suffix(SNAPSHOT_SUFFIX) else {
            continue;
        };

        match load_run(data_dir, &DocumentId::new(document_id)) {
            Ok(run) => runs.push(run),
            Err(e) => {
                tracing::warn!("Skipping unreadable snapshot {}: {}", name, e);
            }
        }
    }

    runs.sort_by(|a, b| a.document_id.cmp(&b.document_id));
    Ok(runs)
}

// =============================================================================
// CLOCK
// =============================================================================

/// Current wall-clock time in epoch milliseconds.
///
/// The only place the application reads the clock; everything below this
/// layer takes timestamps as arguments.
#[must_use]
pub fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use veritrack_core::{ProcessingMode, Tracker};

    fn sample_run(id: &str) -> Run {
        let mut run = Run::new(
            DocumentId::new(id),
            "SOC2",
            ProcessingMode::Smart,
            Tracker::default(),
        );
        run.start(1_000, None);
        run
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let run = sample_run("doc-1");

        save_run(dir.path(), &run).expect("save");
        let loaded = load_run(dir.path(), &DocumentId::new("doc-1")).expect("load");
        assert_eq!(loaded, run);
    }

    #[test]
    fn load_missing_is_run_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = load_run(dir.path(), &DocumentId::new("ghost"));
        assert!(matches!(result, Err(VeritrackError::RunNotFound(_))));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let run = sample_run("doc-2");
        save_run(dir.path(), &run).expect("save");

        delete_snapshot(dir.path(), &run.document_id).expect("delete");
        delete_snapshot(dir.path(), &run.document_id).expect("delete again");
        assert!(load_run(dir.path(), &run.document_id).is_err());
    }

    #[test]
    fn list_skips_foreign_and_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        save_run(dir.path(), &sample_run("b-doc")).expect("save");
        save_run(dir.path(), &sample_run("a-doc")).expect("save");

        std::fs::write(dir.path().join("notes.txt"), b"hello").expect("write");
        std::fs::write(dir.path().join("bad_progress.vtrk"), b"XXXXcorrupt").expect("write");

        let runs = list_runs(dir.path()).expect("list");
        let ids: Vec<&str> = runs.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a-doc", "b-doc"]);
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(list_runs(&missing).expect("list").is_empty());
    }
}
