//! Watched service state
//!
//! ```text
//!   discovery ──► unknown / active / inactive / failed ...
//!                        │
//!                        │ PropertiesChanged (settled, different)
//!                        ▼
//!                   new ActiveState ──► notification
//! ```
//!
//! States are kept as systemd reports them. Policy only distinguishes
//! transitional states (ending in "ing"), "active" and the local "unknown".

use std::collections::HashMap;
use std::fmt;

/// Suffix systemd uses for unit files of type service
pub const SERVICE_SUFFIX: &str = ".service";

/// ActiveState of a unit as reported by systemd
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveState(String);

impl ActiveState {
    /// Sentinel for units that could not be queried (not installed yet)
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// "activating", "deactivating", "reloading", ...
    pub fn is_transitional(&self) -> bool {
        self.0.ends_with("ing")
    }

    pub fn is_active(&self) -> bool {
        self.0 == "active"
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl fmt::Display for ActiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActiveState {
    fn from(state: &str) -> Self {
        Self::new(state)
    }
}

impl From<String> for ActiveState {
    fn from(state: String) -> Self {
        Self(state)
    }
}

/// Qualify a service name with the .service suffix
/// e.g., "munged" -> "munged.service"
pub fn service_unit_name(name: &str) -> String {
    if name.ends_with(SERVICE_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SERVICE_SUFFIX)
    }
}

/// Strip the .service suffix used in unit names
/// e.g., "munged.service" -> "munged"
pub fn bare_service_name(name: &str) -> &str {
    name.strip_suffix(SERVICE_SUFFIX).unwrap_or(name)
}

/// Last known ActiveState of every watched service
///
/// Keys are always fully qualified unit names. Entries are never removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStates {
    states: HashMap<String, ActiveState>,
}

impl ServiceStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.states.contains_key(service)
    }

    pub fn get(&self, service: &str) -> Option<&ActiveState> {
        self.states.get(service)
    }

    pub fn set(&mut self, service: impl Into<String>, state: ActiveState) {
        self.states.insert(service.into(), state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ActiveState)> {
        self.states.iter()
    }
}
