//! Agent configuration read from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `MOUNT_CATALOG_HOST_PREFIX` | prefix under which the host's `/proc` is visible | `/` |
//! | `MOUNT_CATALOG_POLL_INTERVAL_SECS` | rebuild period, `0` or unset builds once | unset |
//! | `MOUNT_CATALOG_OUTPUT` | `json` or `text` | `json` |

use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const HOST_PREFIX_VAR: &str = "MOUNT_CATALOG_HOST_PREFIX";
pub const POLL_INTERVAL_VAR: &str = "MOUNT_CATALOG_POLL_INTERVAL_SECS";
pub const OUTPUT_VAR: &str = "MOUNT_CATALOG_OUTPUT";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("environment variable `{var}` is not valid unicode")]
    NotUnicode { var: &'static str },
    #[error("environment variable `{var}` has invalid value `{value}`: expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// How a catalog is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Prefix below which `proc/self/mountinfo` is looked up. Empty means `/`.
    pub host_prefix: PathBuf,
    /// Rebuild period; `None` builds the catalog once.
    pub poll_interval: Option<Duration>,
    pub output: OutputFormat,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] naming the first variable with an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var_os(var))
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let host_prefix = lookup(HOST_PREFIX_VAR).map(PathBuf::from).unwrap_or_default();

        let poll_interval = match unicode_var(&lookup, POLL_INTERVAL_VAR)? {
            None => None,
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| Error::InvalidValue {
                        var: POLL_INTERVAL_VAR,
                        value: value.clone(),
                        expected: "a whole number of seconds",
                    })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        let output = match unicode_var(&lookup, OUTPUT_VAR)? {
            None => OutputFormat::default(),
            Some(value) => value.parse::<OutputFormat>().map_err(|()| Error::InvalidValue {
                var: OUTPUT_VAR,
                value: value.clone(),
                expected: "`json` or `text`",
            })?,
        };

        Ok(Self {
            host_prefix,
            poll_interval,
            output,
        })
    }

    /// Returns `true` if no host prefix other than `/` is configured.
    pub fn uses_own_root(&self) -> bool {
        self.host_prefix.as_os_str().is_empty() || self.host_prefix == std::path::Path::new("/")
    }
}

fn unicode_var(
    lookup: &impl Fn(&str) -> Option<OsString>,
    var: &'static str,
) -> Result<Option<String>> {
    lookup(var)
        .map(|value| value.into_string().map_err(|_| Error::NotUnicode { var }))
        .transpose()
}
