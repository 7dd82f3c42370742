use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::fsutil;

use super::entry::{MountEntry, MountFlags};
use super::hash::fast_hash;
use super::parser::{ParseError, parse_mount_info_line};
use super::probe::{MountProbe, SystemProbe};
use super::{Error, Result};

/// Mount table of the current process, relative to the host prefix.
pub const MOUNTINFO_SELF: &str = "proc/self/mountinfo";
/// Mount table of the init process, used when the current process' table is unreadable.
pub const MOUNTINFO_INIT: &str = "proc/1/mountinfo";

/// Ordered, immutable collection of the mounts listed in a mountinfo file.
///
/// Entries keep the order of the source file. Duplicate mounts of the same device are kept and
/// flagged with [`MountFlags::SAME_DEVICE`] rather than removed. A catalog is never updated in
/// place; callers build a new one on every poll.
///
/// # Example
///
/// ```no_run
/// use mount_catalog::mountinfo::MountCatalog;
///
/// let catalog = MountCatalog::read("/").unwrap();
/// for entry in catalog.iter().filter(|e| !e.is_dummy() && !e.is_same_device()) {
///     println!("{}", entry.mount_point().display());
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct MountCatalog {
    entries: Vec<MountEntry>,
}

impl MountCatalog {
    /// Builds a catalog from the mount table below `host_prefix`, probing mount points with
    /// [`SystemProbe`].
    ///
    /// `<host_prefix>/proc/self/mountinfo` is tried first, then `<host_prefix>/proc/1/mountinfo`.
    /// An empty prefix means `/`.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnavailable`] if neither mount table can be opened.
    /// - [`Error::ReadLine`] if reading the opened mount table fails.
    pub fn read(host_prefix: impl AsRef<Path>) -> Result<Self> {
        Self::read_with_probe(host_prefix, &SystemProbe)
    }

    /// Same as [`MountCatalog::read`] with a custom probe.
    ///
    /// # Errors
    ///
    /// See [`MountCatalog::read`].
    pub fn read_with_probe<P>(host_prefix: impl AsRef<Path>, probe: &P) -> Result<Self>
    where
        P: MountProbe + ?Sized,
    {
        let (reader, origin) = open_source(host_prefix.as_ref())?;
        Self::from_reader(reader, &origin, probe)
    }

    /// Builds a catalog from mountinfo content.
    ///
    /// Malformed lines are logged and skipped. `origin` only appears in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadLine`] if reading from `reader` fails.
    pub fn from_reader<R, P>(mut reader: R, origin: &Path, probe: &P) -> Result<Self>
    where
        R: BufRead,
        P: MountProbe + ?Sized,
    {
        let mut catalog = Self::default();
        let mut line = Vec::with_capacity(256);
        let mut lineno = 0;

        while reader
            .read_until(b'\n', &mut line)
            .map_err(|source| Error::ReadLine {
                path: origin.to_path_buf(),
                source,
            })?
            != 0
        {
            lineno += 1;
            match parse_mount_info_line(&line) {
                Ok(parsed) => catalog.push(MountEntry::from_line(&parsed), probe),
                Err(ParseError::TooFewFields { count }) => log::debug!(
                    "Ignoring line {lineno} of `{}` with {count} fields",
                    origin.display()
                ),
                Err(source) => log::error!(
                    "{}",
                    Error::Parse {
                        path: origin.to_path_buf(),
                        line: lineno,
                        source,
                    }
                ),
            }

            line.clear();
        }

        log::debug!(
            "Cataloged {} mounts from `{}`",
            catalog.len(),
            origin.display()
        );
        Ok(catalog)
    }

    /// Probes the entry's mount point, flags device duplicates and appends it.
    fn push<P>(&mut self, mut entry: MountEntry, probe: &P)
    where
        P: MountProbe + ?Sized,
    {
        if entry.filesystem().is_some() {
            match probe.device_id(entry.mount_point()) {
                Ok(device_id) => {
                    entry.set_device_id(device_id);
                    self.mark_same_device(&mut entry, device_id);
                }
                Err(err) => {
                    log::debug!("stat `{}` failed: {err}", entry.mount_point().display());
                    entry.insert_flags(MountFlags::NO_STAT);
                }
            }
        }

        match probe.total_blocks(entry.mount_point()) {
            Ok(0) => entry.insert_flags(MountFlags::NO_SIZE),
            Ok(_) => {}
            Err(err) => {
                log::debug!("statvfs `{}` failed: {err}", entry.mount_point().display());
                entry.insert_flags(MountFlags::NO_STAT);
            }
        }

        log::trace!(
            "mountinfo: {} {} {}:{} root `{}`, persistent id `{}`, mount point `{}`, mount options `{}`, filesystem `{}`, mount source `{}`, super options `{}`, {:?}",
            entry.id(),
            entry.parent_id(),
            entry.device_major(),
            entry.device_minor(),
            entry.root().display(),
            entry.persistent_id(),
            entry.mount_point().display(),
            entry.mount_options(),
            entry.filesystem_type().unwrap_or_default(),
            entry.mount_source().unwrap_or_default(),
            entry.super_options().unwrap_or_default(),
            entry.flags(),
        );

        self.entries.push(entry);
    }

    /// Of two mounts sharing a device, the one with the longer mount point is the duplicate.
    /// On equal lengths the later entry is.
    fn mark_same_device(&mut self, entry: &mut MountEntry, device_id: u64) {
        for seen in self
            .entries
            .iter_mut()
            .filter(|seen| seen.stat_device_id() == Some(device_id))
        {
            if entry.mount_point_len() < seen.mount_point_len() {
                seen.insert_flags(MountFlags::SAME_DEVICE);
            } else {
                entry.insert_flags(MountFlags::SAME_DEVICE);
            }
        }
    }

    /// Returns the first entry backed by device `major:minor`.
    pub fn find_by_device(&self, major: u32, minor: u32) -> Option<&MountEntry> {
        self.entries
            .iter()
            .find(|e| e.device_major() == major && e.device_minor() == minor)
    }

    /// Returns the first entry with the given filesystem type and mount source.
    pub fn find_by_filesystem_and_source(
        &self,
        filesystem_type: &str,
        mount_source: &str,
    ) -> Option<&MountEntry> {
        let type_hash = fast_hash(filesystem_type.as_bytes());
        let source_hash = fast_hash(mount_source.as_bytes());

        self.entries.iter().find(|e| {
            e.filesystem().is_some_and(|fs| {
                fs.filesystem_type_hash() == type_hash
                    && fs.mount_source_hash() == source_hash
                    && fs.filesystem_type() == filesystem_type
                    && fs.mount_source() == mount_source
            })
        })
    }

    /// Returns the first entry with the given filesystem type whose super options contain
    /// `option` as a whole comma-separated token.
    pub fn find_by_filesystem_and_super_option(
        &self,
        filesystem_type: &str,
        option: &str,
    ) -> Option<&MountEntry> {
        let type_hash = fast_hash(filesystem_type.as_bytes());

        self.entries.iter().find(|e| {
            e.filesystem().is_some_and(|fs| {
                fs.filesystem_type_hash() == type_hash
                    && fs.filesystem_type() == filesystem_type
                    && fs.has_super_option(option)
            })
        })
    }

    pub fn entries(&self) -> &[MountEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MountEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MountCatalog {
    type Item = &'a MountEntry;
    type IntoIter = std::slice::Iter<'a, MountEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Opens the current process' mount table below `host_prefix`, falling back to the init
/// process' table.
fn open_source(host_prefix: &Path) -> Result<(BufReader<File>, PathBuf)> {
    let primary_path = fsutil::join_under_prefix(host_prefix, MOUNTINFO_SELF);
    let primary = match fsutil::open_file_reader(&primary_path) {
        Ok(reader) => return Ok((reader, primary_path)),
        Err(err) => err,
    };
    log::debug!("{primary}, trying the init process mount table");

    let fallback_path = fsutil::join_under_prefix(host_prefix, MOUNTINFO_INIT);
    match fsutil::open_file_reader(&fallback_path) {
        Ok(reader) => Ok((reader, fallback_path)),
        Err(fallback) => Err(Error::SourceUnavailable { primary, fallback }),
    }
}
