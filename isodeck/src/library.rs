//! The image library: the candidate list the mount session selects from.
//!
//! Known image paths live in a plain cache file, one absolute path per line.
//! Scanning walks directories for `.iso` files and merges them in; loading
//! prunes entries whose file has disappeared since the last scan and returns
//! the list sorted case-insensitively, ready for numbered display.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Errors from library cache operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Reading or writing the cache file failed.
    #[error("cache file {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A scan root does not exist or is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Cache-backed collection of known image paths.
pub struct ImageLibrary {
    cache_path: PathBuf,
}

impl ImageLibrary {
    /// Opens the library at the given cache file path. The file need not
    /// exist yet.
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
        }
    }

    /// The cache file backing this library.
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Loads the library, pruning entries whose file no longer exists.
    ///
    /// The pruned list is written back so stale entries do not accumulate.
    /// Returns the surviving paths sorted case-insensitively.
    pub fn load(&self) -> Result<Vec<PathBuf>, LibraryError> {
        let contents = match fs::read_to_string(&self.cache_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LibraryError::Cache {
                    path: self.cache_path.clone(),
                    source: e,
                })
            }
        };

        let entries: Vec<PathBuf> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(PathBuf::from)
            .collect();

        let mut surviving: Vec<PathBuf> =
            entries.iter().filter(|p| p.is_file()).cloned().collect();
        let pruned = entries.len() - surviving.len();
        if pruned > 0 {
            debug!(pruned, "removed stale cache entries");
            self.write_cache(&surviving)?;
        }

        sort_case_insensitive(&mut surviving);
        Ok(surviving)
    }

    /// Scans `roots` for `.iso` files and merges them into the cache.
    ///
    /// Returns the number of images newly added.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<usize, LibraryError> {
        for root in roots {
            if !root.is_dir() {
                return Err(LibraryError::NotADirectory(root.clone()));
            }
        }

        let mut known: BTreeSet<PathBuf> = self.load()?.into_iter().collect();
        let before = known.len();

        for root in roots {
            for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let is_iso = entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("iso"))
                    .unwrap_or(false);
                if is_iso {
                    known.insert(entry.path().to_path_buf());
                }
            }
        }

        let added = known.len() - before;
        let mut all: Vec<PathBuf> = known.into_iter().collect();
        sort_case_insensitive(&mut all);
        self.write_cache(&all)?;

        info!(added, total = all.len(), "library scan complete");
        Ok(added)
    }

    fn write_cache(&self, entries: &[PathBuf]) -> Result<(), LibraryError> {
        let to_cache_error = |source: io::Error| LibraryError::Cache {
            path: self.cache_path.clone(),
            source,
        };

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(to_cache_error)?;
        }

        let mut file = fs::File::create(&self.cache_path).map_err(to_cache_error)?;
        for entry in entries {
            writeln!(file, "{}", entry.display()).map_err(to_cache_error)?;
        }
        Ok(())
    }
}

/// Sorts paths by their display form, case-insensitively.
pub fn sort_case_insensitive(paths: &mut [PathBuf]) {
    paths.sort_by_key(|p| p.to_string_lossy().to_lowercase());
}

/// Filter-mode matching: keeps images whose path contains any of the
/// `;`-separated query terms, case-insensitively.
pub fn filter_images(images: &[PathBuf], query: &str) -> Vec<PathBuf> {
    let terms: Vec<String> = query
        .split(';')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return images.to_vec();
    }

    images
        .iter()
        .filter(|path| {
            let haystack = path.to_string_lossy().to_lowercase();
            terms.iter().any(|term| haystack.contains(term))
        })
        .cloned()
        .collect()
}
