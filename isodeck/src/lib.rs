//! Isodeck - console manager for a personal disc-image library.
//!
//! This library holds the core of the tool: scanning and caching the image
//! library, parsing operator selections, and orchestrating bounded
//! concurrent read-only loopback mounts with filesystem-type fallback and
//! live progress reporting. The `isodeck-cli` crate provides the terminal
//! front end.

pub mod config;
pub mod library;
pub mod logging;
pub mod mount;
pub mod orchestrator;
pub mod pool;
pub mod progress;
pub mod selection;

/// Crate version, surfaced in the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
