use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};

use super::classify;
use super::decode::{decode_octal_escapes, persistent_id};
use super::hash::fast_hash;
use super::parser::MountInfoLine;

bitflags::bitflags! {
    /// Classification flags derived while building a catalog.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    #[serde(transparent)]
    pub struct MountFlags: u32 {
        /// Pseudo filesystem without real storage (`proc`, `sysfs`, ...).
        const DUMMY = 0x01;
        /// Network-backed filesystem.
        const REMOTE = 0x02;
        /// Another mount of the same device has a shorter mount point, or an equally long one
        /// listed earlier.
        const SAME_DEVICE = 0x08;
        /// `stat` or `statvfs` failed on the mount point.
        const NO_STAT = 0x10;
        /// `statvfs` reports zero total blocks.
        const NO_SIZE = 0x20;
    }
}

/// Filesystem fields of a mountinfo line, present only when the line has a ` - ` separator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilesystemInfo {
    filesystem_type: String,
    #[serde(skip)]
    filesystem_type_hash: u32,
    mount_source: String,
    #[serde(skip)]
    mount_source_hash: u32,
    super_options: String,
}

impl FilesystemInfo {
    pub fn new(
        filesystem_type: impl Into<String>,
        mount_source: impl Into<String>,
        super_options: impl Into<String>,
    ) -> Self {
        let filesystem_type = filesystem_type.into();
        let mount_source = mount_source.into();
        Self {
            filesystem_type_hash: fast_hash(filesystem_type.as_bytes()),
            mount_source_hash: fast_hash(mount_source.as_bytes()),
            filesystem_type,
            mount_source,
            super_options: super_options.into(),
        }
    }

    /// Filesystem type, e.g. `ext4`.
    pub fn filesystem_type(&self) -> &str {
        &self.filesystem_type
    }

    /// Mount source, e.g. `/dev/sda1` or `server:/export`.
    pub fn mount_source(&self) -> &str {
        &self.mount_source
    }

    /// Comma-separated superblock options.
    pub fn super_options(&self) -> &str {
        &self.super_options
    }

    pub fn filesystem_type_hash(&self) -> u32 {
        self.filesystem_type_hash
    }

    pub fn mount_source_hash(&self) -> u32 {
        self.mount_source_hash
    }

    /// Returns `true` if `option` is one of the comma-separated super options.
    pub fn has_super_option(&self, option: &str) -> bool {
        contains_option_token(&self.super_options, option)
    }
}

/// One row of the mount table together with its derived state.
///
/// Entries are created by [`MountCatalog`](super::MountCatalog) and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MountEntry {
    id: u32,
    parent_id: u32,
    device_major: u32,
    device_minor: u32,
    #[serde(serialize_with = "serialize_lossy_path")]
    root: PathBuf,
    #[serde(skip)]
    root_hash: u32,
    #[serde(serialize_with = "serialize_lossy_path")]
    mount_point: PathBuf,
    #[serde(skip)]
    mount_point_hash: u32,
    mount_options: String,
    persistent_id: String,
    #[serde(skip)]
    persistent_id_hash: u32,
    optional_field_count: usize,
    #[serde(flatten)]
    filesystem: Option<FilesystemInfo>,
    #[serde(skip)]
    device_id: Option<u64>,
    flags: MountFlags,
}

impl MountEntry {
    /// Builds an entry from a parsed line: decodes paths, derives the persistent id and
    /// evaluates the dummy and remote predicates. Probe-derived state starts empty.
    pub(super) fn from_line(line: &MountInfoLine<'_>) -> Self {
        let root = decode_octal_escapes(line.root);
        let mount_point = decode_octal_escapes(line.mount_point);
        let persistent_id = persistent_id(&mount_point);

        let filesystem = line.filesystem.as_ref().map(|fs| {
            FilesystemInfo::new(
                String::from_utf8_lossy(fs.fs_type),
                String::from_utf8_lossy(fs.source),
                String::from_utf8_lossy(fs.super_options),
            )
        });

        let mut flags = MountFlags::empty();
        if let Some(fs) = &filesystem {
            flags.set(MountFlags::DUMMY, classify::is_dummy(fs.filesystem_type()));
            flags.set(
                MountFlags::REMOTE,
                classify::is_remote(fs.mount_source(), fs.filesystem_type()),
            );
        }

        Self {
            id: line.mount_id,
            parent_id: line.parent_id,
            device_major: line.major,
            device_minor: line.minor,
            root_hash: fast_hash(&root),
            root: bytes_to_path(root),
            mount_point_hash: fast_hash(&mount_point),
            mount_point: bytes_to_path(mount_point),
            mount_options: String::from_utf8_lossy(line.mount_options).into_owned(),
            persistent_id_hash: fast_hash(persistent_id.as_bytes()),
            persistent_id,
            optional_field_count: line.optional_field_count,
            filesystem,
            device_id: None,
            flags,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn parent_id(&self) -> u32 {
        self.parent_id
    }

    pub fn device_major(&self) -> u32 {
        self.device_major
    }

    pub fn device_minor(&self) -> u32 {
        self.device_minor
    }

    /// Decoded path of the device subtree visible at this mount.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_hash(&self) -> u32 {
        self.root_hash
    }

    /// Decoded absolute mount point.
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    pub fn mount_point_hash(&self) -> u32 {
        self.mount_point_hash
    }

    /// Raw per-mount options.
    pub fn mount_options(&self) -> &str {
        &self.mount_options
    }

    /// Returns `true` if `option` is one of the comma-separated per-mount options.
    pub fn has_mount_option(&self, option: &str) -> bool {
        contains_option_token(&self.mount_options, option)
    }

    /// Mount point with every character unsafe for a metric name replaced by `_`.
    pub fn persistent_id(&self) -> &str {
        &self.persistent_id
    }

    pub fn persistent_id_hash(&self) -> u32 {
        self.persistent_id_hash
    }

    pub fn optional_field_count(&self) -> usize {
        self.optional_field_count
    }

    /// Fields after the ` - ` separator, if the line had one.
    pub fn filesystem(&self) -> Option<&FilesystemInfo> {
        self.filesystem.as_ref()
    }

    pub fn filesystem_type(&self) -> Option<&str> {
        self.filesystem.as_ref().map(FilesystemInfo::filesystem_type)
    }

    pub fn mount_source(&self) -> Option<&str> {
        self.filesystem.as_ref().map(FilesystemInfo::mount_source)
    }

    pub fn super_options(&self) -> Option<&str> {
        self.filesystem.as_ref().map(FilesystemInfo::super_options)
    }

    /// Hash of the filesystem type, `0` if absent.
    pub fn filesystem_type_hash(&self) -> u32 {
        self.filesystem
            .as_ref()
            .map_or(0, FilesystemInfo::filesystem_type_hash)
    }

    /// Hash of the mount source, `0` if absent.
    pub fn mount_source_hash(&self) -> u32 {
        self.filesystem
            .as_ref()
            .map_or(0, FilesystemInfo::mount_source_hash)
    }

    /// `st_dev` of the mount point, `0` if it was not probed or `stat` failed.
    pub fn device_id(&self) -> u64 {
        self.device_id.unwrap_or(0)
    }

    pub fn flags(&self) -> MountFlags {
        self.flags
    }

    pub fn is_dummy(&self) -> bool {
        self.flags.contains(MountFlags::DUMMY)
    }

    pub fn is_remote(&self) -> bool {
        self.flags.contains(MountFlags::REMOTE)
    }

    pub fn is_same_device(&self) -> bool {
        self.flags.contains(MountFlags::SAME_DEVICE)
    }

    pub fn has_stat(&self) -> bool {
        !self.flags.contains(MountFlags::NO_STAT)
    }

    pub fn has_size(&self) -> bool {
        !self.flags.contains(MountFlags::NO_SIZE)
    }

    pub(super) fn stat_device_id(&self) -> Option<u64> {
        self.device_id
    }

    pub(super) fn set_device_id(&mut self, device_id: u64) {
        self.device_id = Some(device_id);
    }

    pub(super) fn insert_flags(&mut self, flags: MountFlags) {
        self.flags.insert(flags);
    }

    /// Length of the decoded mount point in bytes.
    pub(super) fn mount_point_len(&self) -> usize {
        self.mount_point.as_os_str().len()
    }
}

/// Returns `true` if the comma-separated `options` contains `token` as a whole entry.
///
/// Empty entries never match, so an empty `token` never matches either.
pub fn contains_option_token(options: &str, token: &str) -> bool {
    options
        .split(',')
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| candidate == token)
}

fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(OsString::from_vec(bytes))
}

fn serialize_lossy_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mountinfo::parser::parse_mount_info_line;

    fn entry(line: &str) -> MountEntry {
        MountEntry::from_line(&parse_mount_info_line(line.as_bytes()).unwrap())
    }

    #[test]
    fn test_entry_from_line() {
        let e = entry("36 25 8:1 / /mnt/My\\040Disk rw,noatime shared:7 - ext4 /dev/sda1 rw,relatime");
        assert_eq!(e.id(), 36);
        assert_eq!(e.parent_id(), 25);
        assert_eq!((e.device_major(), e.device_minor()), (8, 1));
        assert_eq!(e.mount_point(), Path::new("/mnt/My Disk"));
        assert_eq!(e.persistent_id(), "_mnt_My_Disk");
        assert_eq!(e.mount_options(), "rw,noatime");
        assert_eq!(e.optional_field_count(), 1);
        assert_eq!(e.filesystem_type(), Some("ext4"));
        assert_eq!(e.mount_source(), Some("/dev/sda1"));
        assert_eq!(e.super_options(), Some("rw,relatime"));
        assert_eq!(e.flags(), MountFlags::empty());
        assert_eq!(e.device_id(), 0);
    }

    #[test]
    fn test_root_is_decoded() {
        let e = entry("36 25 8:1 /srv\\040data /srv rw - ext4 /dev/sda1 rw");
        assert_eq!(e.root(), Path::new("/srv data"));
    }

    #[test]
    fn test_hashes_follow_decoded_values() {
        let e = entry("36 25 8:1 / /mnt/a\\040b rw - ext4 /dev/sda1 rw");
        assert_eq!(e.mount_point_hash(), fast_hash(b"/mnt/a b"));
        assert_eq!(e.persistent_id_hash(), fast_hash(b"_mnt_a_b"));
        assert_eq!(e.root_hash(), fast_hash(b"/"));
        assert_eq!(e.filesystem_type_hash(), fast_hash(b"ext4"));
        assert_eq!(e.mount_source_hash(), fast_hash(b"/dev/sda1"));
    }

    #[test]
    fn test_missing_separator_leaves_filesystem_absent() {
        let e = entry("36 25 8:1 / /mnt rw shared:1");
        assert!(e.filesystem().is_none());
        assert_eq!(e.filesystem_type(), None);
        assert_eq!(e.mount_source(), None);
        assert_eq!(e.super_options(), None);
        assert_eq!(e.filesystem_type_hash(), 0);
        assert_eq!(e.mount_source_hash(), 0);
        assert_eq!(e.flags(), MountFlags::empty());
    }

    #[test]
    fn test_classification_flags() {
        assert!(entry("1 0 0:20 / /sys rw - sysfs sysfs rw").is_dummy());
        assert!(entry("1 0 0:20 / /sys rw - sysfs whatever rw").is_dummy());
        assert!(entry("1 0 0:50 / /mnt/nfs rw - nfs4 server:/export rw").is_remote());
        assert!(entry("1 0 0:50 / /net rw - autofs -hosts rw").is_remote());
        assert!(entry("1 0 0:50 / /net rw - autofs -hosts rw").is_dummy());
        assert!(!entry("1 0 8:1 / / rw - ext4 /dev/sda1 rw").is_remote());
    }

    #[test]
    fn test_mount_and_super_option_tokens() {
        let e = entry("1 0 8:1 / /data rw,bind,,noatime - ext4 /dev/sda1 rw,ro,relatime");
        assert!(e.has_mount_option("bind"));
        assert!(!e.has_mount_option("bin"));
        assert!(!e.has_mount_option(""));
        let fs = e.filesystem().unwrap();
        assert!(fs.has_super_option("ro"));
        assert!(!fs.has_super_option("r"));
    }

    #[test]
    fn test_contains_option_token() {
        assert!(contains_option_token("rw,ro,relatime", "ro"));
        assert!(contains_option_token("ro", "ro"));
        assert!(!contains_option_token("rw,relatime", "ro"));
        assert!(!contains_option_token("rwro", "ro"));
        assert!(!contains_option_token(",,", ""));
        assert!(contains_option_token(",,ro,", "ro"));
    }

    #[test]
    fn test_serialize_entry() {
        let e = entry("36 25 8:1 / /mnt rw - ext4 /dev/sda1 rw");
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["mount_point"], "/mnt");
        assert_eq!(value["filesystem_type"], "ext4");
        assert_eq!(value["mount_source"], "/dev/sda1");
        assert_eq!(value["device_major"], 8);
        assert!(value.get("mount_point_hash").is_none());
    }
}
