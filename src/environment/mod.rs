//! Runtime environment detection.
//!
//! Tells whether the agent shares the host's mount namespace view or runs inside a container,
//! where `/proc/self/mountinfo` describes the container's mounts instead of the host's.
mod checks;
mod detect;
mod error;

pub use detect::{RuntimeEnvironment, detect_runtime_environment};
pub use error::{Error, Result};
