//! Service discovery from charm hooks
//!
//! A charm declares interest in a service by shipping either of:
//!
//! - `hooks/service-<name>-started`
//! - `hooks/service-<name>-stopped`
//!
//! Anything else in the hooks directory is ignored. Newly found services are
//! queried for their current ActiveState and added to the state store;
//! services that are already tracked are left alone.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use super::notify::HookRunner;
use super::state::{service_unit_name, ActiveState};
use super::Daemon;

const HOOK_PREFIX: &str = "service-";
const HOOK_SUFFIXES: [&str; 2] = ["-started", "-stopped"];

/// Source of a unit's current ActiveState
///
/// Implementations never fail: a unit that cannot be queried is `unknown`.
pub trait UnitStateQuery {
    fn active_state(&self, unit_name: &str) -> impl Future<Output = ActiveState>;
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to read hooks directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extract the service name from a hook file name
/// e.g., "service-munged-started" -> Some("munged")
pub fn parse_hook_name(file_name: &str) -> Option<&str> {
    let rest = file_name.strip_prefix(HOOK_PREFIX)?;
    let name = HOOK_SUFFIXES
        .iter()
        .find_map(|suffix| rest.strip_suffix(suffix))?;

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '\\' | ':' | '-'));
    valid.then_some(name)
}

/// Distinct service names declared by hooks in `hooks_dir`
pub fn hook_service_names(hooks_dir: &Path) -> Result<BTreeSet<String>, DiscoveryError> {
    let entries = std::fs::read_dir(hooks_dir).map_err(|source| DiscoveryError::ReadDir {
        path: hooks_dir.to_path_buf(),
        source,
    })?;

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", hooks_dir.display(), e);
                continue;
            }
        };
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(name) = parse_hook_name(file_name) {
            names.insert(name.to_string());
        }
    }

    Ok(names)
}

impl<Q: UnitStateQuery, R: HookRunner> Daemon<Q, R> {
    /// Scan the hooks directory and start tracking newly declared services
    ///
    /// Returns the number of services added. A missing hooks directory is
    /// not an error.
    pub async fn discover(&mut self) -> Result<usize, DiscoveryError> {
        log::info!("Loading services from hooks in {}", self.hooks_dir.display());

        if !self.hooks_dir.exists() {
            log::warn!("Hooks dir {} does not exist.", self.hooks_dir.display());
            return Ok(0);
        }

        let names = hook_service_names(&self.hooks_dir)?;
        log::info!("Services from hooks are {:?}", names);

        let mut added = 0;
        for name in names {
            // The .service suffix is required for the unit object lookup
            let unit_name = service_unit_name(&name);
            if self.states.contains(&unit_name) {
                continue;
            }

            let state = self.query.active_state(&unit_name).await;
            log::debug!("Adding service '{}' with initial state: {}", unit_name, state);
            self.states.set(unit_name, state);
            added += 1;
        }

        Ok(added)
    }
}
