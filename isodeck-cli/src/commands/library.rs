//! Library maintenance commands: scan and list.

use std::path::PathBuf;

use console::style;

use isodeck::config::ConfigFile;
use isodeck::library::ImageLibrary;

use super::print_numbered_list;
use crate::error::CliError;

/// Scan directories for ISO images and merge them into the library cache.
pub fn scan(dirs: Vec<PathBuf>) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let library = ImageLibrary::new(&config.library.cache_file);

    let added = library.scan(&dirs)?;
    let total = library.load()?.len();

    println!(
        "Added {} image(s); library now holds {}.",
        style(added).green(),
        total
    );
    Ok(())
}

/// Print the library as the numbered list the mount session uses.
pub fn list() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let library = ImageLibrary::new(&config.library.cache_file);

    let images = library.load()?;
    if images.is_empty() {
        println!("Image library is empty. Run `isodeck scan <dir>` first.");
        return Ok(());
    }

    print_numbered_list(&images);
    println!("{} image(s).", images.len());
    Ok(())
}
