//! The OS boundary for mount operations.
//!
//! Everything the engine asks of the operating system (mount-point flag
//! inspection, the privilege check, kernel-module loading, and the mount
//! call itself) goes through the [`MountBackend`] trait. Production uses
//! [`SystemBackend`]; tests substitute a scripted double so the state
//! machine can be exercised without privileges or real devices.

use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

/// Operations the mount engine needs from the operating system.
pub trait MountBackend: Send + Sync {
    /// Best-effort check whether `path` is already a mount point.
    ///
    /// The production implementation inspects `statvfs` flags, which can
    /// misclassify unusual directories; callers treat a positive answer as
    /// a reason to skip, never as proof.
    fn is_mount_point(&self, path: &Path) -> bool;

    /// Whether the effective user may perform mounts.
    fn is_privileged(&self) -> bool;

    /// Request the kernel module backing a filesystem type. Failure is
    /// reported to the caller but never blocks the subsequent attempt.
    fn load_module(&self, module: &str) -> io::Result<()>;

    /// Attempt a read-only loopback mount of `source` at `target` with the
    /// given filesystem type.
    fn mount_readonly(&self, source: &Path, target: &Path, fstype: &str) -> io::Result<()>;
}

/// [`MountBackend`] implementation backed by the live system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl SystemBackend {
    /// Creates the system backend.
    pub fn new() -> Self {
        Self
    }
}

impl MountBackend for SystemBackend {
    fn is_mount_point(&self, path: &Path) -> bool {
        let c_path = match CString::new(path.as_os_str().as_bytes()) {
            Ok(p) => p,
            Err(_) => return false,
        };

        let mut vfs = MaybeUninit::<libc::statvfs>::uninit();
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), vfs.as_mut_ptr()) };
        if rc != 0 {
            // Missing target or stat error: not mounted as far as we know.
            return false;
        }
        let vfs = unsafe { vfs.assume_init() };

        // Inherited heuristic: a cleared ST_NODEV flag marks a mounted
        // filesystem root.
        (vfs.f_flag & libc::ST_NODEV) == 0
    }

    fn is_privileged(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    fn load_module(&self, module: &str) -> io::Result<()> {
        let status = Command::new("modprobe")
            .arg(module)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("modprobe {} exited with {}", module, status),
            ))
        }
    }

    fn mount_readonly(&self, source: &Path, target: &Path, fstype: &str) -> io::Result<()> {
        debug!(
            source = %source.display(),
            target = %target.display(),
            fstype,
            "attempting loopback mount"
        );

        // mount(8) handles loop-device setup for the `loop` option; that
        // matches the behavior this tool has always had.
        let output = Command::new("mount")
            .arg("-t")
            .arg(fstype)
            .arg("-o")
            .arg("loop,ro")
            .arg(source)
            .arg(target)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("mount exited with {}: {}", output.status, stderr.trim()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_directory_reads_as_mount_point() {
        // The filesystem root is always a mount point.
        let backend = SystemBackend::new();
        assert!(backend.is_mount_point(Path::new("/")));
    }

    #[test]
    fn test_missing_path_is_not_a_mount_point() {
        let backend = SystemBackend::new();
        assert!(!backend.is_mount_point(Path::new("/definitely/not/a/real/path")));
    }

    #[test]
    fn test_privilege_check_matches_euid() {
        let backend = SystemBackend::new();
        let euid_is_root = unsafe { libc::geteuid() == 0 };
        assert_eq!(backend.is_privileged(), euid_is_root);
    }
}
