use std::path::Path;

use super::checks::{has_container_markers, namespaces_differ};
use crate::fsutil::join_under_prefix;

/// Available runtime environments for the agent.
#[derive(Debug, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Running directly on the host.
    Host,
    /// Running inside a containerized environment (e.g., Docker, Kubernetes, Podman).
    Container,
}

/// Detects whether the agent runs in a container or on the host.
///
/// The checks run in order and the first positive one wins:
///
/// 1. The mount namespace of this process differs from the one of the init process found
///    below `host_prefix`.
/// 2. A container runtime marker file exists (`/.dockerenv`, `/run/.containerenv`).
/// 3. The `container` environment variable is set.
///
/// Failing checks are logged as warnings and treated as negative.
pub fn detect_runtime_environment(host_prefix: &Path) -> RuntimeEnvironment {
    detect(
        Path::new("/proc/self/ns/mnt"),
        host_prefix,
        Path::new("/"),
        std::env::var_os("container").is_some(),
    )
}

fn detect(
    own_namespace: &Path,
    host_prefix: &Path,
    root: &Path,
    container_var_set: bool,
) -> RuntimeEnvironment {
    let init = join_under_prefix(host_prefix, "proc/1/ns/mnt");
    match namespaces_differ(own_namespace, &init) {
        Ok(true) => return RuntimeEnvironment::Container,
        Ok(false) => {}
        Err(err) => log::warn!("Mount namespace check failed: {err}"),
    }

    if has_container_markers(root) || container_var_set {
        return RuntimeEnvironment::Container;
    }

    RuntimeEnvironment::Host
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;

    /// Creates `<dir>/own` and, if `init` is given, `<dir>/prefix/proc/1/ns/mnt`.
    fn namespace_links(dir: &Path, own: &str, init: Option<&str>) -> (PathBuf, PathBuf) {
        let own_link = dir.join("own");
        symlink(own, &own_link).unwrap();

        let prefix = dir.join("prefix");
        fs::create_dir_all(prefix.join("proc/1/ns")).unwrap();
        if let Some(init) = init {
            symlink(init, prefix.join("proc/1/ns/mnt")).unwrap();
        }
        (own_link, prefix)
    }

    #[test]
    fn test_shared_namespace_is_host() {
        let dir = tempfile::tempdir().unwrap();
        let (own, prefix) = namespace_links(dir.path(), "mnt:[1]", Some("mnt:[1]"));
        let root = tempfile::tempdir().unwrap();

        assert_eq!(detect(&own, &prefix, root.path(), false), RuntimeEnvironment::Host);
    }

    #[test]
    fn test_different_namespace_is_container() {
        let dir = tempfile::tempdir().unwrap();
        let (own, prefix) = namespace_links(dir.path(), "mnt:[1]", Some("mnt:[2]"));
        let root = tempfile::tempdir().unwrap();

        assert_eq!(
            detect(&own, &prefix, root.path(), false),
            RuntimeEnvironment::Container
        );
    }

    #[test]
    fn test_unreadable_init_namespace_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let (own, prefix) = namespace_links(dir.path(), "mnt:[1]", None);
        let root = tempfile::tempdir().unwrap();

        assert_eq!(detect(&own, &prefix, root.path(), false), RuntimeEnvironment::Host);
        assert_eq!(
            detect(&own, &prefix, root.path(), true),
            RuntimeEnvironment::Container
        );
    }

    #[test]
    fn test_marker_file_is_container() {
        let dir = tempfile::tempdir().unwrap();
        let (own, prefix) = namespace_links(dir.path(), "mnt:[1]", Some("mnt:[1]"));
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join(".dockerenv"), "").unwrap();

        assert_eq!(
            detect(&own, &prefix, root.path(), false),
            RuntimeEnvironment::Container
        );
    }
}
