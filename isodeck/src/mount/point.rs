//! Deterministic mount-point naming.
//!
//! This module is the single source of truth for where an image gets
//! mounted. The directory name combines the image's file stem with a short
//! hash of the full path, so the name stays human-readable while two images
//! that share a base name (`discs/a/game.iso`, `discs/b/game.iso`) land on
//! distinct mount points.

use std::path::{Path, PathBuf};

/// Default parent directory for mount points.
pub const DEFAULT_MOUNT_ROOT: &str = "/mnt";

/// Directory-name prefix for every mount point this tool creates.
pub const MOUNT_POINT_PREFIX: &str = "iso_";

/// Number of base36 digits taken from the path hash.
const SHORT_HASH_LEN: usize = 5;

/// Derives the mount point for `source` under `root`.
///
/// Format: `<root>/iso_<stem>_<hash5>`. The derivation is a pure function of
/// the full source path: identical paths always produce the identical mount
/// point, within a process and across runs.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use isodeck::mount::derive_mount_point;
///
/// let a = derive_mount_point(Path::new("/mnt"), Path::new("/library/game.iso"));
/// let b = derive_mount_point(Path::new("/mnt"), Path::new("/library/game.iso"));
/// assert_eq!(a, b);
/// assert!(a.to_string_lossy().starts_with("/mnt/iso_game_"));
/// ```
pub fn derive_mount_point(root: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let hash = fnv1a64(source.to_string_lossy().as_bytes());
    let short = base36_short(hash);

    root.join(format!("{}{}_{}", MOUNT_POINT_PREFIX, stem, short))
}

/// FNV-1a, 64-bit. Written out here because the derivation must be stable
/// across processes, which the standard library's randomized hasher does not
/// guarantee.
fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// First [`SHORT_HASH_LEN`] base36 digits of `value`, least significant
/// first.
fn base36_short(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut out = String::with_capacity(SHORT_HASH_LEN);
    for _ in 0..SHORT_HASH_LEN {
        out.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}
