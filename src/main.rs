/// Entry point for the mount catalog agent.
///
/// Builds the catalog of mounted filesystems and prints it to stdout. Logging is configured
/// through `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no mount table can be read.
///
/// # Examples
///
/// ```bash
/// MOUNT_CATALOG_HOST_PREFIX=/host MOUNT_CATALOG_OUTPUT=text RUST_LOG=debug cargo run
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    mount_catalog::run()
}
