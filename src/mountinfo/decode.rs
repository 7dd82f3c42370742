//! Decoding of path fields in mountinfo lines.
//!
//! The kernel escapes space, tab, newline and backslash in the `root` and `mount point` fields
//! as three-digit octal sequences (`\040`, `\011`, `\012`, `\134`). See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html).
//!
//! # Example
//!
//! ```rust
//! use mount_catalog::mountinfo::decode::decode_octal_escapes;
//!
//! assert_eq!(decode_octal_escapes(br"/mnt/My\040Disk"), b"/mnt/My Disk");
//! ```

/// Decodes `\nnn` octal escapes into the raw byte they encode.
///
/// A backslash followed by exactly three octal digits (`0`-`7`) whose value fits in a byte is
/// replaced by that byte. Any other backslash is a malformed escape: it is replaced, together
/// with the UTF-8 character (or stray byte) following it, if any, by a single `_`.
///
/// The output is never longer than the input.
pub fn decode_octal_escapes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let byte = raw[i];
        if byte != b'\\' {
            out.push(byte);
            i += 1;
            continue;
        }

        let rest = &raw[i + 1..];
        match octal_byte(rest) {
            Some(decoded) => {
                out.push(decoded);
                i += 4;
            }
            None => {
                out.push(b'_');
                i += 1 + rest.first().map_or(0, |&lead| utf8_width(lead).min(rest.len()));
            }
        }
    }

    out
}

/// Derives a persistent identifier from a decoded mount point.
///
/// Every byte outside `[A-Za-z0-9._-]` becomes `_`, so the result has exactly as many bytes as
/// the input and is always plain ASCII.
///
/// # Example
///
/// ```rust
/// use mount_catalog::mountinfo::decode::persistent_id;
///
/// assert_eq!(persistent_id(b"/var/lib/docker"), "_var_lib_docker");
/// ```
pub fn persistent_id(decoded: &[u8]) -> String {
    decoded
        .iter()
        .map(|&b| {
            if is_identifier_byte(b) {
                b as char
            } else {
                '_'
            }
        })
        .collect()
}

#[inline]
fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_')
}

/// Parses the first three bytes of `digits` as an octal byte value.
fn octal_byte(digits: &[u8]) -> Option<u8> {
    let &[a, b, c] = digits.get(..3)? else {
        return None;
    };

    let mut value: u16 = 0;
    for d in [a, b, c] {
        if !(b'0'..=b'7').contains(&d) {
            return None;
        }
        value = (value << 3) | u16::from(d - b'0');
    }

    u8::try_from(value).ok()
}

/// Width of the UTF-8 sequence introduced by `lead`; stray bytes count as one.
#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}
