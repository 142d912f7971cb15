//! # Veritrack - Compliance Pipeline Progress Server
//!
//! The main binary for the Veritrack progress tracking service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) for driving run progress
//! - CLI interface for inspecting and watching persisted runs
//! - Snapshot file persistence, one file per tracked document
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                apps/veritrack (THE BINARY)                 │
//! │                                                            │
//! │  ┌───────────┐   ┌───────────┐   ┌────────────────────┐   │
//! │  │   CLI     │   │ HTTP API  │   │   Snapshot Store   │   │
//! │  │  (clap)   │   │  (axum)   │   │  (file per run)    │   │
//! │  └─────┬─────┘   └─────┬─────┘   └─────────┬──────────┘   │
//! │        │               │                   │              │
//! │        └───────────────┼───────────────────┘              │
//! │                        ▼                                  │
//! │               ┌─────────────────┐                         │
//! │               │ veritrack-core  │                         │
//! │               │   (THE LOGIC)   │                         │
//! │               └─────────────────┘                         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! veritrack server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! veritrack list
//! veritrack status doc-2024-001
//! veritrack watch doc-2024-001 --interval-ms 1000
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veritrack::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments first so --verbose can shape the log filter.
    let cli = cli::Cli::parse();

    // Initialize tracing — VERITRACK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("VERITRACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    // RUST_LOG wins when set; --verbose lowers the default threshold.
    let default_filter = if cli.verbose {
        "veritrack=debug,veritrack_core=debug,tower_http=debug"
    } else {
        "veritrack=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Veritrack startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗   ██╗███████╗██████╗ ██╗████████╗██████╗  █████╗  ██████╗██╗  ██╗
  ██║   ██║██╔════╝██╔══██╗██║╚══██╔══╝██╔══██╗██╔══██╗██╔════╝██║ ██╔╝
  ██║   ██║█████╗  ██████╔╝██║   ██║   ██████╔╝███████║██║     █████╔╝
  ╚██╗ ██╔╝██╔══╝  ██╔══██╗██║   ██║   ██╔══██╗██╔══██║██║     ██╔═██╗
   ╚████╔╝ ███████╗██║  ██║██║   ██║   ██║  ██║██║  ██║╚██████╗██║  ██╗
    ╚═══╝  ╚══════╝╚═╝  ╚═╝╚═╝   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝

  Compliance Pipeline Progress Server v{}

  Deterministic • Tolerant • Observable
"#,
        env!("CARGO_PKG_VERSION")
    );
}
