//! juju-systemd-noticesctl - manage the notices daemon of a Juju unit
//!
//! Writes, starts, stops and reloads the
//! `juju-<unit>-systemd-notices.service` unit on behalf of a charm.

mod commands;

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use notices::install::{Platform, SystemdNotices, DAEMON_BINARY};

#[derive(Parser)]
#[command(name = "juju-systemd-noticesctl")]
#[command(about = "Manage the Juju systemd notices daemon")]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct Target {
    /// Juju unit name (e.g. "slurmd/0")
    unit: String,

    /// Charm directory holding `dispatch` and `hooks/` (defaults to the current directory)
    #[arg(long)]
    charm_dir: Option<PathBuf>,

    /// Directory to write the unit file to (defaults to the platform's)
    #[arg(long)]
    unit_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Create service hooks and start the notices daemon
    Subscribe {
        #[command(flatten)]
        target: Target,

        /// Services to watch (e.g. "slurmd" or "munged")
        #[arg(required = true)]
        services: Vec<String>,

        /// Path of the notices daemon binary (defaults to the one next to this program)
        #[arg(long)]
        daemon: Option<PathBuf>,
    },

    /// Stop the notices daemon and disable it
    Stop {
        #[command(flatten)]
        target: Target,
    },

    /// Make the notices daemon pick up newly added hooks
    Reload {
        #[command(flatten)]
        target: Target,
    },

    /// Show the notices setup and the state of watched services
    Status {
        #[command(flatten)]
        target: Target,
    },
}

fn notices(
    target: Target,
    services: Vec<String>,
    daemon: Option<PathBuf>,
) -> std::io::Result<SystemdNotices> {
    let charm_dir = match target.charm_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let daemon = match daemon {
        Some(path) => path,
        None => std::env::current_exe()?.with_file_name(DAEMON_BINARY),
    };

    let mut platform = Platform::detect();
    if let Some(dir) = target.unit_dir {
        platform = platform.with_unit_dir(dir);
    }
    log::debug!("Using platform {:?}", platform);

    Ok(SystemdNotices::new(target.unit, services, charm_dir, daemon).with_platform(platform))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Subscribe {
            target,
            services,
            daemon,
        } => {
            commands::subscribe(&notices(target, services, daemon)?).await?;
        }
        Command::Stop { target } => {
            commands::stop(&notices(target, Vec::new(), None)?).await?;
        }
        Command::Reload { target } => {
            commands::reload(&notices(target, Vec::new(), None)?).await?;
        }
        Command::Status { target } => {
            commands::status(&notices(target, Vec::new(), None)?).await?;
        }
    }

    Ok(())
}
