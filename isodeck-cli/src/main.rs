//! Isodeck CLI - console front end for the disc-image library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "isodeck",
    version = isodeck::VERSION,
    about = "Mount and manage a personal disc-image library"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactively select and mount images from the library
    Mount,

    /// Unmount images previously mounted by isodeck
    Unmount {
        /// Unmount every active isodeck mount
        #[arg(long)]
        all: bool,

        /// Lazy unmount: detach now, finish when no longer busy
        #[arg(long)]
        lazy: bool,
    },

    /// Scan directories for ISO images and add them to the library
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// List the image library
    List,

    /// Show the active configuration
    Config,
}

fn main() -> ExitCode {
    // Logs go to a file so the interactive session stays clean; the guard
    // must outlive every command.
    let _log_guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: {}", e);
            None
        }
    };

    let cli = Cli::parse();
    debug!(version = isodeck::VERSION, command = ?cli.command, "starting");

    let result = match cli.command.unwrap_or(Command::Mount) {
        Command::Mount => commands::mount::run(),
        Command::Unmount { all, lazy } => {
            commands::unmount::run(commands::unmount::UnmountArgs { all, lazy })
        }
        Command::Scan { dirs } => commands::library::scan(dirs),
        Command::List => commands::library::list(),
        Command::Config => commands::config::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<isodeck::logging::WorkerGuard, CliError> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("isodeck")
        .join("logs");
    isodeck::logging::init_logging(&log_dir).map_err(CliError::Logging)
}
