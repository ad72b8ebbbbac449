//! Platform detection
//!
//! Selects how the notices unit file is laid out for the host OS. Chosen
//! once from /etc/os-release before anything is written.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default directory for administrator unit files
pub const SYSTEM_UNIT_DIR: &str = "/etc/systemd/system";

const OS_RELEASE: &str = "/etc/os-release";

/// Host OS family, as far as unit file layout is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Generic,
    /// CentOS 7 (systemd 219)
    CentOs7,
}

/// Systemd integration settings for a platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub kind: PlatformKind,
    /// Directory the notices unit file is written to
    pub unit_dir: PathBuf,
    /// Program prepended to the daemon in ExecStart=
    pub exec_prefix: Vec<String>,
}

impl Platform {
    pub fn generic() -> Self {
        Self {
            kind: PlatformKind::Generic,
            unit_dir: PathBuf::from(SYSTEM_UNIT_DIR),
            exec_prefix: Vec::new(),
        }
    }

    pub fn centos7() -> Self {
        Self {
            kind: PlatformKind::CentOs7,
            unit_dir: PathBuf::from(SYSTEM_UNIT_DIR),
            exec_prefix: vec!["/usr/bin/env".to_string()],
        }
    }

    /// Detect the platform of this host
    pub fn detect() -> Self {
        Self::detect_from(Path::new(OS_RELEASE))
    }

    /// Detect from a specific os-release file (for testing)
    pub fn detect_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_os_release(&content),
            Err(e) => {
                log::debug!("Cannot read {}: {} (assuming generic)", path.display(), e);
                Self::generic()
            }
        }
    }

    pub fn from_os_release(content: &str) -> Self {
        let fields = parse_os_release(content);
        let id = fields.get("ID").map(String::as_str).unwrap_or_default();
        let version = fields.get("VERSION_ID").map(String::as_str).unwrap_or_default();

        if id == "centos" && (version == "7" || version.starts_with("7.")) {
            Self::centos7()
        } else {
            Self::generic()
        }
    }

    pub fn with_unit_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.unit_dir = dir.as_ref().to_path_buf();
        self
    }
}

/// Parse KEY=value lines, stripping optional quotes
fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
