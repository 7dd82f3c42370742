use std::path::PathBuf;

/// Errors that may occur while inspecting the runtime environment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read namespace link `{path}`: {source}")]
    ReadNamespace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
