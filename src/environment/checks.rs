use super::{Error, Result};
use std::fs;
use std::path::Path;

/// Marker files left behind by container runtimes, relative to the container root.
const CONTAINER_MARKERS: &[&str] = &[".dockerenv", "run/.containerenv"];

/// Returns `true` if the namespace links `ours` and `theirs` point to different namespaces.
///
/// Namespace links read like `mnt:[4026531841]`; two processes share a namespace exactly when
/// the link targets are equal.
///
/// # Errors
///
/// Returns [`Error::ReadNamespace`] if either link cannot be read, which is common for
/// `/proc/1/ns/*` without `CAP_SYS_PTRACE`.
pub fn namespaces_differ(ours: &Path, theirs: &Path) -> Result<bool> {
    let read = |path: &Path| {
        fs::read_link(path).map_err(|source| Error::ReadNamespace {
            path: path.to_path_buf(),
            source,
        })
    };

    Ok(read(ours)? != read(theirs)?)
}

/// Returns `true` if a container runtime marker file exists below `root`.
pub fn has_container_markers(root: &Path) -> bool {
    CONTAINER_MARKERS
        .iter()
        .any(|marker| fs::symlink_metadata(root.join(marker)).is_ok())
}
