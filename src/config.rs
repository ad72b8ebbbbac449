//! Daemon configuration

use std::path::{Path, PathBuf};

/// Default location of the Juju hook runner
pub const DEFAULT_JUJU_EXEC: &str = "/usr/bin/juju-exec";

/// Name of the hooks directory relative to the charm directory
pub const HOOKS_DIR: &str = "hooks";

/// Settings the daemon is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticesConfig {
    /// Juju unit the hooks are run for (e.g. "slurmd/0")
    pub unit: String,
    /// Directory scanned for `service-<name>-started|stopped` hooks
    pub hooks_dir: PathBuf,
    /// Program invoked to run a hook
    pub juju_exec: PathBuf,
}

impl NoticesConfig {
    /// Configuration for `unit` with hooks under the current directory
    pub fn new(unit: impl Into<String>) -> Self {
        let charm_dir = std::env::current_dir().unwrap_or_default();
        Self {
            unit: unit.into(),
            hooks_dir: charm_dir.join(HOOKS_DIR),
            juju_exec: PathBuf::from(DEFAULT_JUJU_EXEC),
        }
    }

    pub fn with_hooks_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.hooks_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_juju_exec(mut self, program: impl AsRef<Path>) -> Self {
        self.juju_exec = program.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NoticesConfig::new("slurmd/0");
        assert_eq!(config.unit, "slurmd/0");
        assert!(config.hooks_dir.ends_with("hooks"));
        assert_eq!(config.juju_exec, PathBuf::from("/usr/bin/juju-exec"));
    }

    #[test]
    fn test_overrides() {
        let config = NoticesConfig::new("slurmd/1")
            .with_hooks_dir("/var/lib/juju/agents/unit-slurmd-1/charm/hooks")
            .with_juju_exec("/tmp/fake-juju-exec");
        assert_eq!(
            config.hooks_dir,
            PathBuf::from("/var/lib/juju/agents/unit-slurmd-1/charm/hooks")
        );
        assert_eq!(config.juju_exec, PathBuf::from("/tmp/fake-juju-exec"));
    }
}
