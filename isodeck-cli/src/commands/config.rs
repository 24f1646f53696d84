//! Configuration display command.

use isodeck::config::ConfigFile;

use crate::error::CliError;

/// Show the configuration file location and active values.
pub fn run() -> Result<(), CliError> {
    let path = ConfigFile::default_path()?;
    let config = ConfigFile::load().unwrap_or_default();

    println!("Config file:      {}", path.display());
    println!();
    println!("[mount]");
    println!("root              = {}", config.mount.root.display());
    println!("max_concurrency   = {}", config.mount.max_concurrency);
    println!("poll_interval_ms  = {}", config.mount.poll_interval_ms);
    println!();
    println!("[library]");
    println!("cache_file        = {}", config.library.cache_file.display());

    Ok(())
}
