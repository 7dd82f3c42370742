//! Classification of mounts into pseudo ("dummy") and network ("remote") filesystems.
//!
//! The rules follow the long-standing `mountlist` conventions used by `df`-like tools.

/// Filesystem types that hold no real storage.
///
/// `none` is included unconditionally. Bind mounts also show up with type `none` on some
/// systems; callers that want to keep those can consult
/// [`MountEntry::has_mount_option`](super::MountEntry::has_mount_option) for `bind`.
pub const DUMMY_FILESYSTEMS: &[&str] = &[
    "autofs",
    "proc",
    "subfs",
    // Linux 2.6/3.x
    "debugfs",
    "devpts",
    "fusectl",
    "mqueue",
    "rpc_pipefs",
    "sysfs",
    // FreeBSD, Linux 2.4
    "devfs",
    // NetBSD 3.0
    "kernfs",
    // Irix 6.5
    "ignore",
    "none",
];

/// Filesystem types whose `//host/share` sources denote a network share.
const SHARE_FILESYSTEMS: &[&str] = &["smbfs", "cifs"];

/// Source used by autofs for host maps.
const AUTOFS_HOSTS_SOURCE: &str = "-hosts";

/// Returns `true` if `filesystem_type` is a pseudo filesystem.
pub fn is_dummy(filesystem_type: &str) -> bool {
    DUMMY_FILESYSTEMS.contains(&filesystem_type)
}

/// Returns `true` if the mount is backed by a network filesystem.
///
/// A mount is remote if its source contains a `:` (`server:/export`), if it is an SMB/CIFS
/// share addressed as `//host/share`, or if it is an autofs `-hosts` map.
pub fn is_remote(mount_source: &str, filesystem_type: &str) -> bool {
    mount_source.contains(':')
        || (mount_source.starts_with("//") && SHARE_FILESYSTEMS.contains(&filesystem_type))
        || mount_source == AUTOFS_HOSTS_SOURCE
}
