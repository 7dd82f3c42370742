//! Catalog of mounted filesystems built from `/proc/<pid>/mountinfo`.
//!
//! [`MountCatalog`] parses the mount table, decodes escaped paths, classifies every mount
//! (pseudo, network, duplicate device, unreadable, sizeless) and answers lookups by device,
//! by filesystem type and source, and by filesystem type and super option.
mod catalog;
pub mod classify;
pub mod decode;
mod entry;
mod error;
pub mod hash;
pub mod parser;
mod probe;

pub use catalog::{MOUNTINFO_INIT, MOUNTINFO_SELF, MountCatalog};
pub use entry::{FilesystemInfo, MountEntry, MountFlags, contains_option_token};
pub use error::{Error, Result};
pub use probe::{MountProbe, SystemProbe};
