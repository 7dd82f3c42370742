//! Rendering of a [`MountCatalog`] for consumers of the agent's output.

use std::io::Write;

use crate::mountinfo::{MountCatalog, MountEntry, MountFlags};

/// Flag names in the order they are printed by [`write_text`].
const FLAG_NAMES: &[(MountFlags, &str)] = &[
    (MountFlags::DUMMY, "DUMMY"),
    (MountFlags::REMOTE, "REMOTE"),
    (MountFlags::SAME_DEVICE, "SAMEDEV"),
    (MountFlags::NO_STAT, "NOSTAT"),
    (MountFlags::NO_SIZE, "NOSIZE"),
];

/// Writes `catalog` as a JSON array followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(
    catalog: &MountCatalog,
    mut writer: W,
    pretty: bool,
) -> std::io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, catalog)?;
    } else {
        serde_json::to_writer(&mut writer, catalog)?;
    }
    writeln!(writer)
}

/// Writes one line per entry: ids, device, mount point, filesystem type, source and flags.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_text<W: Write>(catalog: &MountCatalog, mut writer: W) -> std::io::Result<()> {
    for entry in catalog {
        writeln!(writer, "{}", text_line(entry))?;
    }
    Ok(())
}

fn text_line(entry: &MountEntry) -> String {
    let mut line = format!(
        "{} {} {}:{} {} {} {}",
        entry.id(),
        entry.parent_id(),
        entry.device_major(),
        entry.device_minor(),
        entry.mount_point().display(),
        entry.filesystem_type().unwrap_or("-"),
        entry.mount_source().unwrap_or("-"),
    );
    for (flag, name) in FLAG_NAMES {
        if entry.flags().contains(*flag) {
            line.push(' ');
            line.push_str(name);
        }
    }
    line
}
