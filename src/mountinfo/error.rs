use std::path::PathBuf;

use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "no readable mount table: {primary}; fallback `{}` also failed",
        .fallback.path.display()
    )]
    SourceUnavailable {
        primary: fsutil::FileOpenError,
        #[source]
        fallback: fsutil::FileOpenError,
    },
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("skipping line {line} of `{path}`: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: super::parser::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
