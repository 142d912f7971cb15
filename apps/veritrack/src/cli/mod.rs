//! # Veritrack CLI Module
//!
//! This module implements the CLI interface for Veritrack.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show one run's progress snapshot
//! - `list` - List all persisted runs
//! - `watch` - Poll a run's snapshot and display live progress
//! - `demo` - Drive the default pipeline through a local run

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use veritrack_core::VeritrackError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Veritrack - Compliance Pipeline Progress Server
///
/// Tracks document analysis runs through an ordered stage pipeline with
/// duration-weighted overall progress.
#[derive(Parser, Debug)]
#[command(name = "veritrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding run snapshot files (default: veritrack-data)
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show one run's progress snapshot
    Status {
        /// Document id of the run
        document: String,
    },

    /// List all persisted runs
    List,

    /// Poll a run's snapshot and display live progress
    Watch {
        /// Document id of the run
        document: String,

        /// Poll interval in milliseconds
        #[arg(short, long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Drive the default pipeline through a local demonstration run
    Demo,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), VeritrackError> {
    let json_mode = cli.json_mode;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("veritrack-data"));

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(cli.data_dir.as_deref(), cli.config.as_deref(), host, port).await
        }
        Some(Commands::Status { document }) => cmd_status(&data_dir, &document, json_mode),
        Some(Commands::List) => cmd_list(&data_dir, json_mode),
        Some(Commands::Watch {
            document,
            interval_ms,
        }) => cmd_watch(&data_dir, &document, interval_ms).await,
        Some(Commands::Demo) => cmd_demo(&data_dir).await,
        None => {
            // No subcommand - list runs by default
            cmd_list(&data_dir, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn verbose_flag_parses_globally() {
        let cli = Cli::try_parse_from(["veritrack", "list", "--verbose"]).expect("parse");
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["veritrack", "list"]).expect("parse");
        assert!(!cli.verbose);
    }

    #[test]
    fn data_dir_flag_is_optional() {
        let cli = Cli::try_parse_from(["veritrack", "list"]).expect("parse");
        assert!(cli.data_dir.is_none());

        let cli =
            Cli::try_parse_from(["veritrack", "-D", "/tmp/vt", "list"]).expect("parse");
        assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/tmp/vt")));
    }
}
