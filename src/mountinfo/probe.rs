//! Filesystem probes run against each mount point while building a catalog.

use std::io;
use std::path::Path;

/// Source of device identity and capacity information for mount points.
///
/// [`SystemProbe`] asks the kernel; tests substitute a table-driven implementation.
pub trait MountProbe {
    /// Returns the `st_dev` of `path` as reported by `stat(2)`.
    fn device_id(&self, path: &Path) -> io::Result<u64>;

    /// Returns the total number of blocks of the filesystem containing `path` (`statvfs(3)`).
    fn total_blocks(&self, path: &Path) -> io::Result<u64>;
}

/// Probes the live system with `stat(2)` and `statvfs(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl MountProbe for SystemProbe {
    fn device_id(&self, path: &Path) -> io::Result<u64> {
        let st = nix::sys::stat::stat(path)?;
        Ok(u64::from(st.st_dev))
    }

    fn total_blocks(&self, path: &Path) -> io::Result<u64> {
        let vfs = nix::sys::statvfs::statvfs(path)?;
        Ok(u64::from(vfs.blocks()))
    }
}
