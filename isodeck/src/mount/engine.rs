//! Per-image mount state machine.
//!
//! One [`MountEngine`] is shared by all workers; each call to
//! [`MountEngine::mount_image`] takes a single candidate image through the
//! full sequence:
//!
//! 1. derive the deterministic mount point
//! 2. skip if the target already looks mounted
//! 3. verify privilege
//! 4. ensure the mount-point directory exists
//! 5. try the filesystem-type chain, loading kernel modules best-effort
//! 6. on exhaustion, remove the directory and fail
//!
//! Every failure is contained to the image it belongs to; the engine never
//! aborts a batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::backend::MountBackend;
use super::fstype::{FsCandidate, FS_CANDIDATES};
use super::outcome::MountDisposition;
use super::point::{derive_mount_point, DEFAULT_MOUNT_ROOT};

/// Transient record of one image's trip through the state machine.
///
/// Created by a worker, classified, rendered, and discarded.
#[derive(Debug, Clone)]
pub struct MountAttempt {
    /// The image that was processed.
    pub source: PathBuf,

    /// The derived mount point.
    pub mount_point: PathBuf,

    /// Filesystem types attempted, in order.
    pub tried: Vec<&'static str>,

    /// Terminal classification.
    pub disposition: MountDisposition,
}

impl MountAttempt {
    /// Operator-facing result line for the classification sets.
    pub fn display_line(&self) -> String {
        match &self.disposition {
            MountDisposition::Mounted { fstype } => format!(
                "{} mounted at {} [{}]",
                self.source.display(),
                self.mount_point.display(),
                fstype
            ),
            MountDisposition::Skipped => format!(
                "{} already mounted at {}",
                self.source.display(),
                self.mount_point.display()
            ),
            MountDisposition::Failed { reason } => {
                format!("{}: {}", self.source.display(), reason)
            }
        }
    }
}

/// The mount state machine, generic over the OS boundary.
pub struct MountEngine<B: MountBackend> {
    backend: B,
    mount_root: PathBuf,
    candidates: &'static [FsCandidate],
}

impl<B: MountBackend> MountEngine<B> {
    /// Creates an engine mounting under the default root (`/mnt`).
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            candidates: FS_CANDIDATES,
        }
    }

    /// Overrides the mount root. Used by configuration and by tests.
    pub fn with_mount_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mount_root = root.into();
        self
    }

    /// The directory mount points are created under.
    pub fn mount_root(&self) -> &Path {
        &self.mount_root
    }

    /// Derives the mount point this engine would use for `source`.
    pub fn mount_point_for(&self, source: &Path) -> PathBuf {
        derive_mount_point(&self.mount_root, source)
    }

    /// Runs one image through the state machine.
    pub fn mount_image(&self, source: &Path) -> MountAttempt {
        let mount_point = self.mount_point_for(source);
        let mut tried = Vec::new();

        debug!(
            source = %source.display(),
            mount_point = %mount_point.display(),
            "processing image"
        );

        if self.backend.is_mount_point(&mount_point) {
            debug!(mount_point = %mount_point.display(), "target already mounted, skipping");
            return MountAttempt {
                source: source.to_path_buf(),
                mount_point,
                tried,
                disposition: MountDisposition::Skipped,
            };
        }

        if !self.backend.is_privileged() {
            return MountAttempt {
                source: source.to_path_buf(),
                mount_point,
                tried,
                disposition: MountDisposition::Failed {
                    reason: "root privileges required".to_string(),
                },
            };
        }

        if let Err(e) = fs::create_dir_all(&mount_point) {
            return MountAttempt {
                source: source.to_path_buf(),
                mount_point: mount_point.clone(),
                tried,
                disposition: MountDisposition::Failed {
                    reason: format!(
                        "failed to create mount point {}: {}",
                        mount_point.display(),
                        e
                    ),
                },
            };
        }

        for candidate in self.candidates {
            if let Some(module) = candidate.module {
                if let Err(e) = self.backend.load_module(module) {
                    warn!(
                        module,
                        fstype = candidate.fstype,
                        error = %e,
                        "failed to load kernel module"
                    );
                }
            }

            tried.push(candidate.fstype);
            match self
                .backend
                .mount_readonly(source, &mount_point, candidate.fstype)
            {
                Ok(()) => {
                    info!(
                        source = %source.display(),
                        mount_point = %mount_point.display(),
                        fstype = candidate.fstype,
                        "image mounted"
                    );
                    return MountAttempt {
                        source: source.to_path_buf(),
                        mount_point,
                        tried,
                        disposition: MountDisposition::Mounted {
                            fstype: candidate.fstype,
                        },
                    };
                }
                Err(e) => {
                    debug!(
                        source = %source.display(),
                        fstype = candidate.fstype,
                        error = %e,
                        "mount attempt failed, falling through"
                    );
                }
            }
        }

        // Every candidate failed: undo the directory we made.
        let _ = fs::remove_dir(&mount_point);

        MountAttempt {
            source: source.to_path_buf(),
            mount_point,
            tried,
            disposition: MountDisposition::Failed {
                reason: "unsupported filesystem".to_string(),
            },
        }
    }
}
