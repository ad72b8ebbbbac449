//! Notices daemon
//!
//! ```text
//!     ┌──────────┐
//!     │ Starting │  connect bus, discover, AddMatch, signals
//!     └────┬─────┘
//!          │
//!     ┌────▼─────┐  PropertiesChanged ─► event filter ─► hook task
//!     │ Running  │  SIGHUP            ─► discovery
//!     └────┬─────┘
//!          │ SIGTERM/SIGINT
//!     ┌────▼─────┐
//!     │ Stopping │  in-flight hooks are not awaited
//!     └────┬─────┘
//!     ┌────▼─────┐
//!     │ Stopped  │
//!     └──────────┘
//! ```
//!
//! Bus messages and signals arrive on one mpsc channel and are handled in
//! order on a single task, so the state store needs no locking. The channel
//! is unbounded: while a reload waits on unit state replies nothing drains
//! it, and a blocked bus receive task would stop those replies from being
//! read.

mod discovery;
mod filter;
mod notify;
mod signals;
mod state;

pub use discovery::{hook_service_names, parse_hook_name, DiscoveryError, UnitStateQuery};
pub use notify::{run_hook, HookInvocation, HookRunner, JujuExec, NotificationEvent, Notifier};
pub use signals::{NoticesSignal, SignalHandler};
pub use state::{bare_service_name, service_unit_name, ActiveState, ServiceStates};

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::NoticesConfig;
use crate::dbus::{BusClient, BusError, PropertyChange, SystemdUnits};

/// Everything the daemon loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEvent {
    /// PropertiesChanged broadcast for a unit object
    PropertiesChanged(PropertyChange),
    /// Re-scan the hooks directory (SIGHUP)
    Reload,
    /// Stop the daemon (SIGTERM/SIGINT)
    Terminate,
}

/// Lifecycle phase of the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonPhase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Fatal startup errors
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("D-Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Signal setup failed: {0}")]
    Signal(#[source] std::io::Error),
}

/// Watched service states plus the collaborators that feed and consume them
pub struct Daemon<Q, R> {
    hooks_dir: PathBuf,
    states: ServiceStates,
    query: Q,
    notifier: Notifier<R>,
    phase: DaemonPhase,
}

impl<Q: UnitStateQuery, R: HookRunner> Daemon<Q, R> {
    pub fn new(config: &NoticesConfig, query: Q, runner: R) -> Self {
        Self {
            hooks_dir: config.hooks_dir.clone(),
            states: ServiceStates::new(),
            query,
            notifier: Notifier::new(config.unit.clone(), runner),
            phase: DaemonPhase::Starting,
        }
    }

    pub fn states(&self) -> &ServiceStates {
        &self.states
    }

    #[cfg(test)]
    pub(crate) fn states_mut(&mut self) -> &mut ServiceStates {
        &mut self.states
    }

    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    pub fn phase(&self) -> DaemonPhase {
        self.phase
    }

    /// Process events until Terminate arrives or every sender is gone
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<DaemonEvent>) {
        self.phase = DaemonPhase::Running;
        log::info!("Watching {} services", self.states.len());

        while let Some(event) = events.recv().await {
            match event {
                DaemonEvent::PropertiesChanged(change) => {
                    self.on_properties_changed(&change);
                }
                DaemonEvent::Reload => {
                    log::info!("Received SIGHUP, reloading services from hooks");
                    match self.discover().await {
                        Ok(added) => log::info!("Added {} new services", added),
                        Err(e) => log::error!("Failed to reload services: {}", e),
                    }
                }
                DaemonEvent::Terminate => {
                    log::info!("Stopping juju systemd notices service");
                    break;
                }
            }
        }

        // Hook tasks still in flight are not awaited
        self.phase = DaemonPhase::Stopping;
        events.close();
        self.phase = DaemonPhase::Stopped;
    }
}

/// Run the daemon against the system bus until terminated
pub async fn serve(config: NoticesConfig) -> Result<(), DaemonError> {
    let bus = BusClient::connect().await?;

    let mut daemon: Daemon<SystemdUnits, JujuExec> =
        Daemon::new(&config, bus.units(), JujuExec::new(&config.juju_exec));
    if let Err(e) = daemon.discover().await {
        log::error!("Service discovery failed: {}", e);
    }

    let (tx, rx) = mpsc::unbounded_channel();
    bus.subscribe(tx.clone()).await?;
    SignalHandler::new()
        .map_err(DaemonError::Signal)?
        .spawn_forwarder(tx);

    daemon.run(rx).await;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Bus-free collaborators for daemon tests

    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    pub fn unique_test_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = PathBuf::from(format!("/tmp/notices-test-{}-{}", std::process::id(), id));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Fixed unit states; units not listed are unknown
    #[derive(Clone, Default)]
    pub struct StaticUnits {
        states: HashMap<String, String>,
        queried: Arc<Mutex<Vec<String>>>,
    }

    impl StaticUnits {
        pub fn with(mut self, unit: &str, state: &str) -> Self {
            self.states.insert(unit.to_string(), state.to_string());
            self
        }

        pub fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    impl UnitStateQuery for StaticUnits {
        async fn active_state(&self, unit_name: &str) -> ActiveState {
            self.queried.lock().unwrap().push(unit_name.to_string());
            self.states
                .get(unit_name)
                .map(|s| ActiveState::from(s.as_str()))
                .unwrap_or_else(ActiveState::unknown)
        }
    }

    #[derive(Clone, Default)]
    pub struct Recorder(Arc<Mutex<Vec<HookInvocation>>>);

    impl Recorder {
        pub fn invocations(&self) -> Vec<HookInvocation> {
            self.0.lock().unwrap().clone()
        }
    }

    impl HookRunner for Recorder {
        fn run(&self, invocation: HookInvocation) {
            self.0.lock().unwrap().push(invocation);
        }
    }
}
