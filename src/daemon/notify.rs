//! Hook invocation for confirmed state transitions
//!
//! `active` maps to the `started` hook, every other settled state to
//! `stopped`. Hooks run as `juju-exec <unit> hooks/service-<name>-<event>`
//! in a background task; failures are logged and never retried.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use super::state::{bare_service_name, ActiveState};
use crate::config::HOOKS_DIR;

/// A state transition accepted by the event filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Fully qualified unit name (e.g. "munged.service")
    pub service: String,
    pub state: ActiveState,
}

impl NotificationEvent {
    pub fn new(service: impl Into<String>, state: ActiveState) -> Self {
        Self {
            service: service.into(),
            state,
        }
    }

    /// Hook event token: "started" or "stopped"
    pub fn event_name(&self) -> &'static str {
        if self.state.is_active() {
            "started"
        } else {
            "stopped"
        }
    }

    /// Hook name, e.g. "service-munged-started"
    pub fn hook_name(&self) -> String {
        format!(
            "service-{}-{}",
            bare_service_name(&self.service),
            self.event_name()
        )
    }
}

/// Arguments for one run of the hook runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInvocation {
    /// Juju unit the hook runs for
    pub unit: String,
    /// Hook path relative to the charm directory, e.g. "hooks/service-munged-started"
    pub hook: String,
}

impl HookInvocation {
    pub fn args(&self) -> [&str; 2] {
        [self.unit.as_str(), self.hook.as_str()]
    }
}

/// Something that runs hooks without blocking the caller
pub trait HookRunner {
    fn run(&self, invocation: HookInvocation);
}

/// Turns notification events into hook invocations for one unit
pub struct Notifier<R> {
    unit: String,
    runner: R,
}

impl<R: HookRunner> Notifier<R> {
    pub fn new(unit: impl Into<String>, runner: R) -> Self {
        Self {
            unit: unit.into(),
            runner,
        }
    }

    pub fn notify(&self, event: &NotificationEvent) {
        let invocation = HookInvocation {
            unit: self.unit.clone(),
            hook: format!("{}/{}", HOOKS_DIR, event.hook_name()),
        };
        log::debug!(
            "Service {} is {}, running hook {}",
            event.service,
            event.state,
            invocation.hook
        );
        self.runner.run(invocation);
    }
}

/// Runs hooks through `juju-exec` as detached tokio tasks
#[derive(Debug, Clone)]
pub struct JujuExec {
    program: PathBuf,
}

impl JujuExec {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }
}

impl HookRunner for JujuExec {
    fn run(&self, invocation: HookInvocation) {
        let program = self.program.clone();
        tokio::spawn(async move {
            let cmd = format!("{} {}", program.display(), invocation.args().join(" "));
            match run_hook(&program, &invocation).await {
                Ok(status) if status.success() => {
                    log::info!("Hook command '{}' succeeded.", cmd);
                }
                Ok(status) => {
                    log::error!("Hook command '{}' failed with {}", cmd, status);
                }
                Err(e) => {
                    log::error!("Failed to run hook command '{}': {}", cmd, e);
                }
            }
        });
    }
}

/// Run the hook program to completion
pub async fn run_hook(program: &Path, invocation: &HookInvocation) -> std::io::Result<ExitStatus> {
    log::debug!(
        "Invoking hook {} with command: {} {}",
        invocation.hook,
        program.display(),
        invocation.args().join(" ")
    );
    Command::new(program)
        .args(invocation.args())
        .stdin(Stdio::null())
        .status()
        .await
}
