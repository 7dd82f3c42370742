use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use mount_catalog::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/mountinfo")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Resolves `path` below `prefix`, treating `path` as relative even when it is absolute.
///
/// An empty prefix stands for the real root `/`.
///
/// # Example
/// ```
/// # use std::path::{Path, PathBuf};
/// # use mount_catalog::fsutil::join_under_prefix;
/// assert_eq!(
///     join_under_prefix(Path::new("/host"), "/proc/1/mountinfo"),
///     PathBuf::from("/host/proc/1/mountinfo")
/// );
/// assert_eq!(
///     join_under_prefix(Path::new(""), "proc/self/mountinfo"),
///     PathBuf::from("/proc/self/mountinfo")
/// );
/// ```
pub fn join_under_prefix(prefix: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let relative = path.strip_prefix("/").unwrap_or(path);
    if prefix.as_os_str().is_empty() {
        Path::new("/").join(relative)
    } else {
        prefix.join(relative)
    }
}
