//! Active-mount enumeration.
//!
//! Reads `/proc/self/mountinfo` and filters to the `iso_*` mount points this
//! tool creates, so the unmount session can present the same numbered-list
//! selection the mount session uses.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::point::MOUNT_POINT_PREFIX;

/// One active mount owned by this tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMount {
    /// Mounted source (the loop device or image path as the kernel reports
    /// it).
    pub source: PathBuf,

    /// Mount-point directory.
    pub mount_point: PathBuf,

    /// Filesystem type as reported by the kernel.
    pub fstype: String,
}

/// Lists active `iso_*` mounts under `root`, sorted by mount point.
pub fn active_mounts(root: &Path) -> io::Result<Vec<ActiveMount>> {
    let contents = fs::read_to_string("/proc/self/mountinfo")?;
    Ok(parse_mountinfo(&contents, root))
}

/// Parses mountinfo content, keeping entries under `root` whose directory
/// name carries our prefix.
fn parse_mountinfo(contents: &str, root: &Path) -> Vec<ActiveMount> {
    let mut mounts = Vec::new();

    for line in contents.lines() {
        // Format: ... <mount point> <options> ... - <fstype> <source> <super options>
        let (left, right) = match line.split_once(" - ") {
            Some(parts) => parts,
            None => continue,
        };

        let left_fields: Vec<&str> = left.split_whitespace().collect();
        if left_fields.len() < 5 {
            continue;
        }
        let mount_point = PathBuf::from(decode_mount_escapes(left_fields[4]));

        let right_fields: Vec<&str> = right.split_whitespace().collect();
        if right_fields.len() < 2 {
            continue;
        }
        let fstype = right_fields[0].to_string();
        let source = PathBuf::from(decode_mount_escapes(right_fields[1]));

        if mount_point.parent() != Some(root) {
            continue;
        }
        let ours = mount_point
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(MOUNT_POINT_PREFIX))
            .unwrap_or(false);
        if !ours {
            continue;
        }

        mounts.push(ActiveMount {
            source,
            mount_point,
            fstype,
        });
    }

    mounts.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    mounts
}

/// Undo the octal escapes mountinfo applies to whitespace in paths.
fn decode_mount_escapes(value: &str) -> String {
    value
        .replace("\\134", "\\")
        .replace("\\040", " ")
        .replace("\\011", "\t")
        .replace("\\012", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
36 25 0:31 / /mnt/iso_game_a1b2c rw,relatime shared:1 - iso9660 /dev/loop3 ro\n\
37 25 0:32 / /mnt/iso_tools_9z8y7 rw,relatime shared:2 - udf /dev/loop4 ro\n\
38 25 0:33 / /mnt/other rw,relatime shared:3 - ext4 /dev/sda2 rw\n\
39 25 0:34 / /home/user/iso_fake rw,relatime shared:4 - ext4 /dev/sda3 rw\n";

    #[test]
    fn test_parses_only_prefixed_entries_under_root() {
        let mounts = parse_mountinfo(SAMPLE, Path::new("/mnt"));
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].mount_point, PathBuf::from("/mnt/iso_game_a1b2c"));
        assert_eq!(mounts[0].fstype, "iso9660");
        assert_eq!(mounts[0].source, PathBuf::from("/dev/loop3"));
        assert_eq!(mounts[1].fstype, "udf");
    }

    #[test]
    fn test_other_roots_are_ignored() {
        let mounts = parse_mountinfo(SAMPLE, Path::new("/home/user"));
        // `/home/user/iso_fake` matches prefix and root, nothing else does.
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, PathBuf::from("/home/user/iso_fake"));
    }

    #[test]
    fn test_escaped_spaces_are_decoded() {
        let line = "40 25 0:35 / /mnt/iso_two\\040discs_ab1cd rw - iso9660 /dev/loop5 ro\n";
        let mounts = parse_mountinfo(line, Path::new("/mnt"));
        assert_eq!(
            mounts[0].mount_point,
            PathBuf::from("/mnt/iso_two discs_ab1cd")
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mounts = parse_mountinfo("not a mountinfo line\nshort - x\n", Path::new("/mnt"));
        assert!(mounts.is_empty());
    }

    #[test]
    fn test_results_sorted_by_mount_point() {
        let reversed = "\
37 25 0:32 / /mnt/iso_zzz_11111 rw - udf /dev/loop4 ro\n\
36 25 0:31 / /mnt/iso_aaa_22222 rw - iso9660 /dev/loop3 ro\n";
        let mounts = parse_mountinfo(reversed, Path::new("/mnt"));
        assert_eq!(mounts[0].mount_point, PathBuf::from("/mnt/iso_aaa_22222"));
    }
}
