//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure:
//!
//! ```text
//! ID PARENT_ID MAJOR:MINOR ROOT MOUNT_POINT MOUNT_OPTIONS [OPT_FIELD ...] - FS_TYPE SOURCE SUPER_OPTIONS
//! ```
//!
//! Lines are handled as raw bytes because mount points are not required to be UTF-8. Path
//! fields are returned still escaped; see [`super::decode`].

/// Minimum number of whitespace-separated fields a line needs to be considered.
pub const MIN_FIELDS: usize = 5;

/// Token separating the optional fields from the filesystem fields.
const SEPARATOR: &[u8] = b"-";

/// Represents a parsed mountinfo line, borrowing from the input.
#[derive(Debug, PartialEq, Eq)]
pub struct MountInfoLine<'a> {
    /// Mount ID field.
    pub mount_id: u32,
    /// Parent mount ID field.
    pub parent_id: u32,
    /// Major device number.
    pub major: u32,
    /// Minor device number.
    pub minor: u32,
    /// Root of the mount within the filesystem, still escaped.
    pub root: &'a [u8],
    /// Mount point relative to the process's root, still escaped.
    pub mount_point: &'a [u8],
    /// Per-mount options (empty if the line ends after the mount point).
    pub mount_options: &'a [u8],
    /// Number of optional fields between the mount options and the separator.
    pub optional_field_count: usize,
    /// Fields after the separator, if the separator is present.
    pub filesystem: Option<FilesystemFields<'a>>,
}

/// The three fields following the ` - ` separator.
#[derive(Debug, PartialEq, Eq)]
pub struct FilesystemFields<'a> {
    /// Filesystem type (e.g., `ext4`, `cgroup2`).
    pub fs_type: &'a [u8],
    /// Source of the mount (e.g., device).
    pub source: &'a [u8],
    /// Superblock options.
    pub super_options: &'a [u8],
}

/// Errors that cause a mountinfo line to be skipped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected at least 5 fields, found {count}")]
    TooFewFields { count: usize },

    #[error("cannot parse major:minor from `{field}`")]
    MissingMajorMinorSeparator { field: String },
}

/// Parses a single line of mountinfo data.
///
/// Numeric fields are parsed leniently: leading decimal digits are used, a field without digits
/// reads as `0`, and values too large for `u32` saturate. A missing separator is tolerated and
/// leaves [`MountInfoLine::filesystem`] empty. If the separator is present but fewer than three
/// fields follow it, the missing ones read as empty.
///
/// # Errors
///
/// - [`ParseError::TooFewFields`] if the line has fewer than [`MIN_FIELDS`] fields.
/// - [`ParseError::MissingMajorMinorSeparator`] if the third field has no `:`.
pub fn parse_mount_info_line(line: &[u8]) -> Result<MountInfoLine<'_>, ParseError> {
    let fields: Vec<&[u8]> = split_fields(line).collect();
    if fields.len() < MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            count: fields.len(),
        });
    }

    let mount_id = parse_unsigned_prefix(fields[0]);
    let parent_id = parse_unsigned_prefix(fields[1]);

    let major_minor = fields[2];
    let (major, minor) = major_minor
        .iter()
        .position(|&b| b == b':')
        .map(|at| (&major_minor[..at], &major_minor[at + 1..]))
        .ok_or_else(|| ParseError::MissingMajorMinorSeparator {
            field: String::from_utf8_lossy(major_minor).into_owned(),
        })?;

    let root = fields[3];
    let mount_point = fields[4];

    let mut rest = fields[MIN_FIELDS..].iter().copied();
    let mount_options = rest.next().unwrap_or_default();

    let mut optional_field_count = 0;
    let mut found_separator = false;
    for field in rest.by_ref() {
        if field == SEPARATOR {
            found_separator = true;
            break;
        }
        optional_field_count += 1;
    }

    let filesystem = found_separator.then(|| FilesystemFields {
        fs_type: rest.next().unwrap_or_default(),
        source: rest.next().unwrap_or_default(),
        super_options: rest.next().unwrap_or_default(),
    });

    Ok(MountInfoLine {
        mount_id,
        parent_id,
        major: parse_unsigned_prefix(major),
        minor: parse_unsigned_prefix(minor),
        root,
        mount_point,
        mount_options,
        optional_field_count,
        filesystem,
    })
}

/// Splits a line on spaces and tabs, dropping empty fields and the line terminator.
fn split_fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
        .filter(|field| !field.is_empty())
}

/// Parses the leading decimal digits of `field`, saturating at `u32::MAX`.
fn parse_unsigned_prefix(field: &[u8]) -> u32 {
    field
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, &d| {
            acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_mountinfo_line() {
        let line = b"42 35 8:1 / /mnt rw,nosuid - ext4 /dev/sda1 rw,data=ordered\n";
        let result = parse_mount_info_line(line).unwrap();

        assert_eq!(result.mount_id, 42);
        assert_eq!(result.parent_id, 35);
        assert_eq!(result.major, 8);
        assert_eq!(result.minor, 1);
        assert_eq!(result.root, b"/");
        assert_eq!(result.mount_point, b"/mnt");
        assert_eq!(result.mount_options, b"rw,nosuid");
        assert_eq!(result.optional_field_count, 0);
        assert_eq!(
            result.filesystem,
            Some(FilesystemFields {
                fs_type: b"ext4",
                source: b"/dev/sda1",
                super_options: b"rw,data=ordered",
            })
        );
    }

    #[test]
    fn counts_multiple_optional_fields() {
        let line = b"70 56 0:45 / /var rw,relatime shared:20 master:1 propagate_from:2 - ext4 /dev/sdb1 rw,errors=remount-ro";
        let result = parse_mount_info_line(line).unwrap();
        assert_eq!(result.optional_field_count, 3);
        assert_eq!(result.filesystem.unwrap().fs_type, b"ext4");
    }

    #[test]
    fn tolerates_missing_separator() {
        let line = b"42 35 0:22 / /mnt rw,nosuid shared:1 ext4 /dev/sda1 rw";
        let result = parse_mount_info_line(line).unwrap();
        assert!(result.filesystem.is_none());
        assert_eq!(result.optional_field_count, 4);
    }

    #[test]
    fn tolerates_line_ending_after_mount_point() {
        let result = parse_mount_info_line(b"1 0 0:1 / /").unwrap();
        assert_eq!(result.mount_options, b"");
        assert_eq!(result.optional_field_count, 0);
        assert!(result.filesystem.is_none());
    }

    #[test]
    fn missing_post_separator_fields_read_as_empty() {
        let result = parse_mount_info_line(b"42 35 0:22 / /mnt rw - ext4").unwrap();
        let fs = result.filesystem.unwrap();
        assert_eq!(fs.fs_type, b"ext4");
        assert_eq!(fs.source, b"");
        assert_eq!(fs.super_options, b"");
    }

    #[test]
    fn error_on_too_few_fields() {
        let err = parse_mount_info_line(b"42 35 0:22 /").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { count: 4 }));
    }

    #[test]
    fn error_on_empty_line() {
        let err = parse_mount_info_line(b"").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { count: 0 }));
    }

    #[test]
    fn error_on_missing_major_minor_separator() {
        let err = parse_mount_info_line(b"42 35 8-1 / /mnt rw - ext4 /dev/sda1 rw").unwrap_err();
        match err {
            ParseError::MissingMajorMinorSeparator { field } => assert_eq!(field, "8-1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn major_minor_round_trip() {
        for (major, minor) in [(0, 0), (8, 1), (253, 7), (259, 1048575), (u32::MAX, 1)] {
            let line = format!("1 0 {major}:{minor} / /mnt rw - ext4 /dev/x rw");
            let result = parse_mount_info_line(line.as_bytes()).unwrap();
            assert_eq!((result.major, result.minor), (major, minor));
        }
    }

    #[test]
    fn splits_on_tabs_and_repeated_spaces() {
        let line = b"25\t1  0:24 /\t/proc rw,relatime   - proc proc rw";
        let result = parse_mount_info_line(line).unwrap();
        assert_eq!(result.mount_id, 25);
        assert_eq!(result.mount_point, b"/proc");
        assert_eq!(result.filesystem.unwrap().fs_type, b"proc");
    }

    #[test]
    fn keeps_escaped_paths_verbatim() {
        let line = br"36 25 0:32 /a\040b /mnt/My\040Disk rw - ext4 /dev/sda1 rw";
        let result = parse_mount_info_line(line).unwrap();
        assert_eq!(result.root, br"/a\040b");
        assert_eq!(result.mount_point, br"/mnt/My\040Disk");
    }

    #[test]
    fn lenient_numeric_fields() {
        assert_eq!(parse_unsigned_prefix(b"123abc"), 123);
        assert_eq!(parse_unsigned_prefix(b"abc"), 0);
        assert_eq!(parse_unsigned_prefix(b""), 0);
        assert_eq!(parse_unsigned_prefix(b"99999999999"), u32::MAX);
    }
}
