//! Notices daemon installation
//!
//! Subscribes a charm unit to systemd notices:
//! - Links `hooks/service-<name>-started|stopped` to the charm's dispatch script
//! - Writes `juju-<unit>-systemd-notices.service` running the daemon
//! - daemon-reload, enable and start the unit
//!
//! The unit stays enabled so the daemon comes back after a machine reboot.

mod platform;
mod systemctl;

pub use platform::{Platform, PlatformKind, SYSTEM_UNIT_DIR};
pub use systemctl::Systemctl;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::config::HOOKS_DIR;

/// Daemon binary name, looked up next to the running executable
pub const DAEMON_BINARY: &str = "juju-systemd-notices";

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run systemctl: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("'{command}' failed with {status}: {stderr}")]
    Systemctl {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Cannot quote ExecStart= command: {0}")]
    Quote(#[from] shlex::QuoteError),
}

impl InstallError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Notices daemon subscription for one Juju unit
#[derive(Debug, Clone)]
pub struct SystemdNotices {
    /// Juju unit name (e.g. "slurmd/0")
    unit: String,
    /// Services to watch, without the .service suffix
    services: Vec<String>,
    /// Charm directory holding `dispatch` and `hooks/`
    charm_dir: PathBuf,
    /// Path of the juju-systemd-notices binary
    daemon_exe: PathBuf,
    platform: Platform,
    systemctl: Systemctl,
}

impl SystemdNotices {
    pub fn new(
        unit: impl Into<String>,
        services: impl IntoIterator<Item = impl Into<String>>,
        charm_dir: impl AsRef<Path>,
        daemon_exe: impl AsRef<Path>,
    ) -> Self {
        Self {
            unit: unit.into(),
            services: services.into_iter().map(Into::into).collect(),
            charm_dir: charm_dir.as_ref().to_path_buf(),
            daemon_exe: daemon_exe.as_ref().to_path_buf(),
            platform: Platform::generic(),
            systemctl: Systemctl::default(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_systemctl(mut self, systemctl: Systemctl) -> Self {
        self.systemctl = systemctl;
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Unit file name, e.g. "juju-slurmd-0-systemd-notices.service"
    pub fn service_name(&self) -> String {
        format!("juju-{}-systemd-notices.service", self.unit.replace('/', "-"))
    }

    pub fn service_file(&self) -> PathBuf {
        self.platform.unit_dir.join(self.service_name())
    }

    pub fn hooks_dir(&self) -> PathBuf {
        self.charm_dir.join(HOOKS_DIR)
    }

    /// Hook paths that declare the watched services
    pub fn hook_paths(&self) -> Vec<PathBuf> {
        let hooks_dir = self.hooks_dir();
        self.services
            .iter()
            .flat_map(|service| {
                ["started", "stopped"]
                    .iter()
                    .map(|event| hooks_dir.join(format!("service-{}-{}", service, event)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Render the notices daemon unit file
    pub fn render_unit_file(&self) -> Result<String, InstallError> {
        let daemon = self.daemon_exe.to_string_lossy();
        let args: Vec<&str> = self
            .platform
            .exec_prefix
            .iter()
            .map(String::as_str)
            .chain([&*daemon, self.unit.as_str()])
            .collect();
        let exec_start = shlex::try_join(args)?;

        Ok(format!(
            "[Unit]\n\
             Description=Juju systemd notices daemon\n\
             After=multi-user.target\n\
             \n\
             [Service]\n\
             Type=simple\n\
             Restart=always\n\
             WorkingDirectory={}\n\
             ExecStart={}\n\
             ExecReload=/bin/kill -HUP $MAINPID\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            self.charm_dir.display(),
            exec_start
        ))
    }

    /// Create missing hook links pointing at the charm's dispatch script
    ///
    /// Returns the links that were created.
    pub fn link_hooks(&self) -> Result<Vec<PathBuf>, InstallError> {
        let hooks_dir = self.hooks_dir();
        std::fs::create_dir_all(&hooks_dir).map_err(|e| InstallError::io(&hooks_dir, e))?;

        let dispatch = self.charm_dir.join("dispatch");
        let mut created = Vec::new();
        for hook in self.hook_paths() {
            if hook.symlink_metadata().is_ok() {
                log::debug!("Hook {} already exists. Skipping...", hook.display());
                continue;
            }
            std::os::unix::fs::symlink(&dispatch, &hook).map_err(|e| InstallError::io(&hook, e))?;
            created.push(hook);
        }
        Ok(created)
    }

    /// Write the unit file, then reload, enable and start it
    pub async fn subscribe(&self) -> Result<(), InstallError> {
        log::debug!("Generating systemd notice hooks for {:?}", self.services);
        for hook in self.link_hooks()? {
            log::debug!("Created hook {}", hook.display());
        }

        let service_file = self.service_file();
        let service_name = self.service_name();
        log::debug!("Starting {} daemon", service_name);
        if service_file.exists() {
            log::debug!("Overwriting existing service file {}", service_name);
        }
        std::fs::write(&service_file, self.render_unit_file()?)
            .map_err(|e| InstallError::io(&service_file, e))?;

        log::debug!("Service file {} written. Reloading systemd", service_name);
        self.systemctl.daemon_reload().await?;
        self.systemctl.enable(&service_name).await?;
        self.systemctl.start(&service_name).await?;
        log::debug!("Started {} daemon", service_name);
        Ok(())
    }

    /// Stop the daemon and keep it from starting at boot
    pub async fn stop(&self) -> Result<(), InstallError> {
        let service_name = self.service_name();
        self.systemctl.stop(&service_name).await?;
        self.systemctl.disable(&service_name).await?;
        log::debug!("Stopped {} daemon", service_name);
        Ok(())
    }

    /// Ask the running daemon to pick up new hooks (SIGHUP)
    pub async fn reload(&self) -> Result<(), InstallError> {
        self.systemctl.reload(&self.service_name()).await
    }
}
