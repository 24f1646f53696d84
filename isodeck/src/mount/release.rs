//! Unmounting and mount-point cleanup.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::info;

/// Unmounts `mount_point` and removes its directory once empty.
///
/// With `detach` set the kernel performs a lazy unmount, releasing the name
/// immediately and finishing once the filesystem is no longer busy.
pub fn release_mount(mount_point: &Path, detach: bool) -> io::Result<()> {
    let c_target = CString::new(mount_point.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;

    let flags = if detach { libc::MNT_DETACH } else { 0 };
    let rc = unsafe { libc::umount2(c_target.as_ptr(), flags) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    info!(mount_point = %mount_point.display(), detach, "unmounted");

    // Only an emptied mount point is removed; a busy lazy unmount leaves
    // the directory behind for the next pass.
    if mount_point
        .read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
    {
        let _ = fs::remove_dir(mount_point);
    }

    Ok(())
}
