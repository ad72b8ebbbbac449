//! juju-systemd-notices - systemd notices daemon for Juju charms
//!
//! Watches the ActiveState of services named by the charm's
//! `hooks/service-<name>-started|stopped` hooks and runs the matching hook
//! through juju-exec whenever a service settles in a new state.
//!
//! Signals:
//! - SIGTERM/SIGINT: stop
//! - SIGHUP: pick up services from newly added hooks

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::info;

use notices::config::DEFAULT_JUJU_EXEC;
use notices::{daemon, NoticesConfig};

#[derive(Parser)]
#[command(name = "juju-systemd-notices")]
#[command(about = "Systemd notices daemon for emitting Juju events")]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Juju unit to run hooks for (e.g. "slurmd/0")
    unit: String,

    /// Hooks directory (defaults to ./hooks)
    #[arg(long, hide = true)]
    hooks_dir: Option<PathBuf>,

    /// Hook runner program
    #[arg(long, hide = true, default_value = DEFAULT_JUJU_EXEC)]
    juju_exec: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.unit.is_empty() {
        Args::command()
            .error(ErrorKind::InvalidValue, "the unit name must not be empty")
            .exit();
    }

    let mut config = NoticesConfig::new(args.unit).with_juju_exec(&args.juju_exec);
    if let Some(dir) = &args.hooks_dir {
        config = config.with_hooks_dir(dir);
    }

    info!("Starting juju systemd notices service");
    if let Err(e) = daemon::serve(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
