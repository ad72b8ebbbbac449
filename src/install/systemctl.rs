//! systemctl wrapper

use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::InstallError;

/// Runs `systemctl` subcommands, failing on nonzero exit
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: PathBuf,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new("systemctl")
    }
}

impl Systemctl {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub async fn run(&self, args: &[&str]) -> Result<(), InstallError> {
        let cmd = format!("{} {}", self.program.display(), args.join(" "));
        log::debug!("systemd: Executing command {}", cmd);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(InstallError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("systemctl command failed: {} ({})", cmd, stderr);
            return Err(InstallError::Systemctl {
                command: cmd,
                status: output.status,
                stderr,
            });
        }
        Ok(())
    }

    /// Reload systemd manager configuration
    pub async fn daemon_reload(&self) -> Result<(), InstallError> {
        self.run(&["daemon-reload"]).await
    }

    pub async fn start(&self, unit: &str) -> Result<(), InstallError> {
        self.run(&["start", unit]).await
    }

    pub async fn stop(&self, unit: &str) -> Result<(), InstallError> {
        self.run(&["stop", unit]).await
    }

    pub async fn reload(&self, unit: &str) -> Result<(), InstallError> {
        self.run(&["reload", unit]).await
    }

    pub async fn enable(&self, unit: &str) -> Result<(), InstallError> {
        self.run(&["enable", unit]).await
    }

    pub async fn disable(&self, unit: &str) -> Result<(), InstallError> {
        self.run(&["disable", unit]).await
    }
}
