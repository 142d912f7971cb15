//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! The `watch` command is the display-side observer: it re-reads a run's
//! snapshot file on a fixed interval (one second by default) and renders
//! elapsed, remaining, and overall progress until the run reaches a
//! terminal status.

use crate::api::validate_document_id;
use crate::config::AppConfig;
use crate::{api, store};
use std::path::Path;
use veritrack_core::{
    DocumentId, ProcessingMode, Registry, Run, Tracker, VeritrackError, format_duration,
    format_percent,
};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
///
/// Configuration precedence: command-line flags, then the config file
/// (if given), then built-in defaults. Previously persisted snapshots
/// are rehydrated into the registry so restarts keep run history.
pub async fn cmd_server(
    data_dir_flag: Option<&Path>,
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), VeritrackError> {
    let config = match config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let data_dir = data_dir_flag
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.data_dir.clone());

    let mut registry = Registry::new();
    for run in store::list_runs(&data_dir)? {
        registry.insert(run);
    }
    if !registry.is_empty() {
        tracing::info!(
            runs = registry.len(),
            active = registry.active_count(),
            "Rehydrated runs from snapshots"
        );
    }

    println!("Veritrack Progress Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Data dir: {:?}", data_dir);
    println!();
    println!("Endpoints:");
    println!("  POST   /runs                      - Register and start a run");
    println!("  GET    /runs/{{document}}           - Get progress snapshot");
    println!("  POST   /runs/{{document}}/stage     - Update stage progress");
    println!("  POST   /runs/{{document}}/advance   - Advance past a stage");
    println!("  POST   /runs/{{document}}/complete  - Complete a run");
    println!("  POST   /runs/{{document}}/fail      - Fail a run");
    println!("  GET    /runs/{{document}}/export    - Export binary snapshot");
    println!("  DELETE /runs/{{document}}           - Remove a run");
    println!("  GET    /health                    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, registry, data_dir).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show one run's progress snapshot.
pub fn cmd_status(data_dir: &Path, document: &str, json_mode: bool) -> Result<(), VeritrackError> {
    let document_id = validate_document_id(document)?;
    let run = store::load_run(data_dir, &document_id)?;
    let now_ms = store::now_epoch_ms();

    if json_mode {
        let response = api::ProgressResponse::from_run(&run, now_ms);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_default()
        );
        return Ok(());
    }

    print_run(&run, now_ms);
    Ok(())
}

/// Render one run's full state to stdout.
fn print_run(run: &Run, now_ms: u64) {
    println!("Veritrack Run Status");
    println!("====================");
    println!("Document:  {}", run.document_id);
    println!("Framework: {}", run.framework);
    println!("Mode:      {}", run.mode.name());
    println!("Status:    {}", run.status.name());
    if let Some(failure) = &run.failure {
        println!("Failure:   {}", failure);
    }
    println!();
    println!(
        "Overall:   {}",
        format_percent(run.tracker.overall_hundredths())
    );
    println!("Elapsed:   {}", format_duration(run.elapsed_secs(now_ms)));
    println!(
        "Remaining: {}",
        format_duration(run.tracker.estimated_time_remaining_secs(now_ms))
    );
    println!();
    println!("Stages:");
    for stage in run.tracker.stages() {
        let marker = if run.tracker.current_stage_id() == Some(&stage.id) {
            ">"
        } else {
            " "
        };
        println!(
            "  {} {:<14} {:>3}%  (est {})",
            marker,
            stage.name,
            stage.progress,
            format_duration(u64::from(stage.estimated_secs))
        );
    }
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List all persisted runs.
pub fn cmd_list(data_dir: &Path, json_mode: bool) -> Result<(), VeritrackError> {
    let runs = store::list_runs(data_dir)?;
    let now_ms = store::now_epoch_ms();

    if json_mode {
        let entries: Vec<api::ProgressResponse> = runs
            .iter()
            .map(|run| api::ProgressResponse::from_run(run, now_ms))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).unwrap_or_default()
        );
        return Ok(());
    }

    if runs.is_empty() {
        println!("No runs found in {:?}", data_dir);
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<12} {:>9} {:>10}",
        "DOCUMENT", "FRAMEWORK", "STATUS", "OVERALL", "ELAPSED"
    );
    for run in &runs {
        println!(
            "{:<24} {:<10} {:<12} {:>9} {:>10}",
            run.document_id.as_str(),
            run.framework,
            run.status.name(),
            format_percent(run.tracker.overall_hundredths()),
            format_duration(run.elapsed_secs(now_ms))
        );
    }
    Ok(())
}

// =============================================================================
// WATCH COMMAND
// =============================================================================

/// Poll a run's snapshot and display live progress until it is terminal.
pub async fn cmd_watch(
    data_dir: &Path,
    document: &str,
    interval_ms: u64,
) -> Result<(), VeritrackError> {
    let document_id = validate_document_id(document)?;
    let interval_ms = interval_ms.max(100);
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(interval_ms));

    println!("Watching {} (every {}ms, Ctrl+C to stop)", document_id, interval_ms);
    println!();

    loop {
        ticker.tick().await;

        let run = store::load_run(data_dir, &document_id)?;
        let now_ms = store::now_epoch_ms();
        let stage_name = run
            .tracker
            .current_stage()
            .map_or("-", |s| s.name.as_str());

        println!(
            "[{:<9}] {:>8} overall | stage: {:<14} | elapsed {} | remaining {}",
            run.status.name(),
            format_percent(run.tracker.overall_hundredths()),
            stage_name,
            format_duration(run.elapsed_secs(now_ms)),
            format_duration(run.tracker.estimated_time_remaining_secs(now_ms))
        );

        if run.status.is_terminal() {
            println!();
            match &run.failure {
                Some(message) => println!("Run failed: {}", message),
                None => println!("Run completed in {}", format_duration(run.elapsed_secs(now_ms))),
            }
            return Ok(());
        }
    }
}

// =============================================================================
// DEMO COMMAND
// =============================================================================

/// Pause between demo progress steps. The demo runs much faster than
/// the stage estimates; it exists to exercise the pipeline, not to
/// simulate real durations.
const DEMO_STEP_MS: u64 = 200;

/// Drive the default pipeline through a local demonstration run,
/// persisting a snapshot after every mutation so a concurrent `watch`
/// can follow along.
pub async fn cmd_demo(data_dir: &Path) -> Result<(), VeritrackError> {
    let document_id = DocumentId::new("demo-document");
    let mut run = Run::new(
        document_id.clone(),
        "SOC2",
        ProcessingMode::Smart,
        Tracker::default(),
    );
    run.start(store::now_epoch_ms(), None);
    store::save_run(data_dir, &run)?;

    println!("Demo run started for {}", document_id);

    let stage_ids: Vec<_> = run
        .tracker
        .stages()
        .iter()
        .map(|s| s.id.clone())
        .collect();

    for stage_id in &stage_ids {
        for value in [25, 50, 75] {
            tokio::time::sleep(std::time::Duration::from_millis(DEMO_STEP_MS)).await;
            run.tracker.update_stage_progress(stage_id, value);
            store::save_run(data_dir, &run)?;
            println!(
                "  {} at {}%  (overall {})",
                stage_id,
                value,
                format_percent(run.tracker.overall_hundredths())
            );
        }
        tokio::time::sleep(std::time::Duration::from_millis(DEMO_STEP_MS)).await;
        run.tracker.advance_to_next_stage(stage_id);
        store::save_run(data_dir, &run)?;
    }

    run.complete(store::now_epoch_ms());
    store::save_run(data_dir, &run)?;

    println!();
    println!(
        "Demo run completed: {}",
        format_percent(run.tracker.overall_hundredths())
    );
    println!("Snapshot: {:?}", store::snapshot_path(data_dir, &document_id));
    Ok(())
}
