//! Persistent configuration.
//!
//! Settings live in an INI file under the user configuration directory
//! (`~/.config/isodeck/config.ini` on Linux). Missing file or missing keys
//! fall back to defaults, so `ConfigFile::load().unwrap_or_default()` is
//! always a safe way to start.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use crate::mount::DEFAULT_MOUNT_ROOT;
use crate::orchestrator::{default_concurrency, OrchestratorConfig};

/// Default progress poll interval in milliseconds.
const DEFAULT_POLL_MS: u64 = 100;

/// Errors loading or saving the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    Io { path: PathBuf, source: io::Error },

    /// The file exists but is not valid INI.
    Parse { path: PathBuf, reason: String },

    /// No configuration directory could be determined for this user.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, reason } => {
                write!(f, "config file {} is malformed: {}", path.display(), reason)
            }
            ConfigError::NoConfigDir => {
                write!(f, "could not determine a configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Mount-related settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    /// Directory mount points are created under.
    pub root: PathBuf,

    /// Ceiling on concurrent mount workers.
    pub max_concurrency: usize,

    /// Progress poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            max_concurrency: default_concurrency(),
            poll_interval_ms: DEFAULT_POLL_MS,
        }
    }
}

/// Library-related settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Path of the image cache file.
    pub cache_file: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            cache_file: base.join("isodeck").join("library.cache"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// `[mount]` section.
    pub mount: MountConfig,

    /// `[library]` section.
    pub library: LibraryConfig,
}

impl ConfigFile {
    /// Default on-disk location of the configuration file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("isodeck").join("config.ini"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads from the default location, falling back to defaults for a
    /// missing file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(section) = ini.section(Some("mount")) {
            if let Some(root) = section.get("root") {
                config.mount.root = PathBuf::from(root);
            }
            if let Some(value) = section.get("max_concurrency") {
                if let Ok(n) = value.parse::<usize>() {
                    config.mount.max_concurrency = n.max(1);
                }
            }
            if let Some(value) = section.get("poll_interval_ms") {
                if let Ok(ms) = value.parse::<u64>() {
                    config.mount.poll_interval_ms = ms.max(1);
                }
            }
        }

        if let Some(section) = ini.section(Some("library")) {
            if let Some(cache) = section.get("cache_file") {
                config.library.cache_file = PathBuf::from(cache);
            }
        }

        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("mount"))
            .set("root", self.mount.root.to_string_lossy().into_owned())
            .set("max_concurrency", self.mount.max_concurrency.to_string())
            .set(
                "poll_interval_ms",
                self.mount.poll_interval_ms.to_string(),
            );
        ini.with_section(Some("library")).set(
            "cache_file",
            self.library.cache_file.to_string_lossy().into_owned(),
        );

        ini.write_to_file(path).map_err(io_error)?;
        Ok(())
    }

    /// Orchestrator settings derived from this configuration.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_concurrency: self.mount.max_concurrency,
            poll_interval: Duration::from_millis(self.mount.poll_interval_ms),
        }
    }
}
