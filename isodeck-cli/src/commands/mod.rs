//! CLI command implementations.

pub mod config;
pub mod library;
pub mod mount;
pub mod unmount;

use std::io;
use std::path::Path;

use console::style;
use dialoguer::Input;

use crate::error::CliError;

/// Reads one trimmed line from the operator; an empty line is allowed and
/// means "return".
pub fn prompt(message: &str) -> Result<String, CliError> {
    let input: String = Input::new()
        .with_prompt(message)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::Prompt(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
    Ok(input.trim().to_string())
}

/// Prints a numbered, 1-based list of paths for selection prompts.
pub fn print_numbered_list<P: AsRef<Path>>(items: &[P]) {
    let width = items.len().to_string().len();
    for (i, item) in items.iter().enumerate() {
        // Pad before styling so ANSI codes do not skew the column.
        let number = format!("{:>width$}", i + 1, width = width);
        println!("{}. {}", style(number).cyan(), item.as_ref().display());
    }
}
