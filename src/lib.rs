//! Mount Catalog: builds a classified catalog of mounted filesystems from the kernel's
//! mount table for a monitoring agent.
//!
//! The library parses `/proc/<pid>/mountinfo`, decodes escaped paths, flags pseudo, network,
//! duplicate-device and sizeless mounts, and offers read-only lookups over the result. The
//! binary prints the catalog once or on a fixed interval.

use std::io;
use std::time::Instant;

use config::{Config, OutputFormat};
use environment::RuntimeEnvironment;
use error::ResultOkLogExt;
use mountinfo::MountCatalog;

pub mod config;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod mountinfo;
pub mod report;

/// Runs the agent.
///
/// Reads [`Config`] from the environment, then builds the mount catalog and writes it to
/// stdout, either once or every poll interval.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid configuration variables.
/// - No readable mount table below the host prefix (in one-shot mode).
/// - Failure to write to stdout.
///
/// In poll mode an unreadable mount table is logged and retried on the next tick.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    log::debug!("Configuration: {config:?}");

    if config.uses_own_root()
        && environment::detect_runtime_environment(&config.host_prefix)
            == RuntimeEnvironment::Container
    {
        log::warn!(
            "Detected container runtime environment, but `{}` is not set; reporting the container's own mounts",
            config::HOST_PREFIX_VAR
        );
    }

    let Some(interval) = config.poll_interval else {
        let catalog = MountCatalog::read(&config.host_prefix)?;
        emit(&catalog, config.output, true)?;
        return Ok(());
    };

    loop {
        let before = Instant::now();
        if let Some(catalog) = MountCatalog::read(&config.host_prefix).ok_log() {
            log::trace!(
                "Building catalog of {} mounts took {} microseconds",
                catalog.len(),
                before.elapsed().as_micros()
            );
            emit(&catalog, config.output, false)?;
        }
        std::thread::sleep(interval);
    }
}

fn emit(catalog: &MountCatalog, output: OutputFormat, pretty: bool) -> io::Result<()> {
    let stdout = io::stdout().lock();
    match output {
        OutputFormat::Json => report::write_json(catalog, stdout, pretty),
        OutputFormat::Text => report::write_text(catalog, stdout),
    }
}
