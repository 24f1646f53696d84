//! Unmount session over active isodeck mounts.
//!
//! Enumerates `iso_*` mounts under the configured root and releases the
//! selected ones, using the same index/range selection grammar as the mount
//! session. Mount-point directories are removed once emptied.

use console::style;

use isodeck::config::ConfigFile;
use isodeck::mount::{active_mounts, release_mount, ActiveMount};
use isodeck::selection::parse_selection;

use super::{print_numbered_list, prompt};
use crate::error::CliError;

/// Arguments for the unmount command.
#[derive(Debug, Clone, Copy)]
pub struct UnmountArgs {
    /// Release every active mount without prompting.
    pub all: bool,

    /// Lazy unmount (detach now, finish when no longer busy).
    pub lazy: bool,
}

/// Run the unmount command.
pub fn run(args: UnmountArgs) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();

    let mounts = active_mounts(&config.mount.root)
        .map_err(|e| CliError::Unmount(format!("could not read mount table: {}", e)))?;

    if mounts.is_empty() {
        println!("No isodeck mounts are active.");
        return Ok(());
    }

    if args.all {
        release_batch(&mounts, args.lazy);
        return Ok(());
    }

    let points: Vec<_> = mounts.iter().map(|m| m.mount_point.clone()).collect();
    print_numbered_list(&points);

    let input = prompt("Mounts to release (e.g. '1-3', '00' for all; blank to cancel)")?;

    if input.is_empty() {
        return Ok(());
    }
    if input == "00" {
        release_batch(&mounts, args.lazy);
        return Ok(());
    }

    let selection = parse_selection(&input, mounts.len());
    for error in &selection.errors {
        println!("{}", style(error).red());
    }

    let selected: Vec<ActiveMount> = selection
        .indices
        .iter()
        .map(|&i| mounts[i - 1].clone())
        .collect();
    release_batch(&selected, args.lazy);

    Ok(())
}

fn release_batch(mounts: &[ActiveMount], lazy: bool) {
    for mount in mounts {
        match release_mount(&mount.mount_point, lazy) {
            Ok(()) => println!(
                "{}",
                style(format!("released {}", mount.mount_point.display())).green()
            ),
            Err(e) => println!(
                "{}",
                style(format!(
                    "failed to release {}: {}",
                    mount.mount_point.display(),
                    e
                ))
                .red()
            ),
        }
    }
}
