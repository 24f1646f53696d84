//! Interactive mount session.
//!
//! Presents the numbered library, reads a selection (`1-3`, `1 5`, `00` for
//! all, `/` for filter mode, blank to return), runs the orchestrator with a
//! progress bar, and prints the consolidated report grouped by
//! classification. The loop continues until the operator returns.

use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use isodeck::config::ConfigFile;
use isodeck::library::{filter_images, ImageLibrary};
use isodeck::mount::{MountEngine, OutcomeReport, SystemBackend};
use isodeck::orchestrator::MountOrchestrator;
use isodeck::progress::ProgressCallback;

use super::{print_numbered_list, prompt};
use crate::error::CliError;

const SELECTION_PROMPT: &str =
    "Images to mount (e.g. '1-3', '1 5', '00' for all; '/' to filter; blank to return)";

/// Run the interactive mount session.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let library = ImageLibrary::new(&config.library.cache_file);

    let engine = MountEngine::new(SystemBackend::new()).with_mount_root(&config.mount.root);
    let orchestrator = MountOrchestrator::new(engine, config.orchestrator_config());

    println!("isodeck v{}", isodeck::VERSION);

    loop {
        let images = library.load()?;
        if images.is_empty() {
            println!(
                "{}",
                style("Image library is empty. Run `isodeck scan <dir>` first.").yellow()
            );
            return Ok(());
        }

        println!();
        print_numbered_list(&images);

        let input = prompt(SELECTION_PROMPT)?;
        if input.is_empty() {
            return Ok(());
        }

        if input == "/" {
            filter_session(&orchestrator, &images)?;
            continue;
        }

        mount_batch(&orchestrator, &images, &input);
    }
}

/// Filter mode: narrow the list by a `;`-separated query, then select
/// against the filtered list until the operator returns.
fn filter_session(
    orchestrator: &MountOrchestrator<SystemBackend>,
    images: &[PathBuf],
) -> Result<(), CliError> {
    let query = prompt("Filter query (case-insensitive, multi-term separator ';'; blank to return)")?;
    if query.is_empty() {
        return Ok(());
    }

    let filtered = filter_images(images, &query);
    if filtered.is_empty() {
        println!("{}", style("No images match the query.").yellow());
        return Ok(());
    }

    loop {
        println!();
        println!("{}", style("Filtered results:").bold());
        print_numbered_list(&filtered);

        let input = prompt("Filtered images to mount ('00' for all; blank to return)")?;
        if input.is_empty() {
            return Ok(());
        }

        mount_batch(orchestrator, &filtered, &input);
    }
}

/// One orchestration call with a live progress bar and report rendering.
fn mount_batch(
    orchestrator: &MountOrchestrator<SystemBackend>,
    images: &[PathBuf],
    input: &str,
) {
    let bar = ProgressBar::new(images.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let bar_handle = bar.clone();
    let callback: ProgressCallback = Box::new(move |completed, total| {
        bar_handle.set_length(total as u64);
        bar_handle.set_position(completed as u64);
    });

    orchestrator.run(images, input, Some(callback));
    bar.finish_and_clear();

    print_report(&orchestrator.take_report());
}

/// Consolidated end-of-batch report, grouped by classification.
fn print_report(report: &OutcomeReport) {
    if report.is_empty() {
        println!("{}", style("Nothing to do.").dim());
        return;
    }

    for line in &report.mounted {
        println!("{}", style(line).green());
    }
    for line in &report.skipped {
        println!("{}", style(line).yellow());
    }
    for line in &report.failed {
        println!("{}", style(line).red());
    }
    for line in &report.input_errors {
        println!("{}", style(line).red());
    }
}
