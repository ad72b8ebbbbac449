//! juju-systemd-notices - systemd unit-state notifications for Juju charms
//!
//! A small daemon that:
//! - Discovers watched services from `service-<name>-started|stopped` hooks
//! - Follows `ActiveState` changes of those units over the system D-Bus
//! - Runs the matching Juju hook through `juju-exec` on every settled transition
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Daemon loop                     │
//! ├─────────────────────────────────────────────────┤
//! │  Discovery  │  Event filter  │  Notifier         │
//! ├─────────────────────────────────────────────────┤
//! │      Bus client (zbus)      │  Signal handler    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The `install` module writes and controls the systemd unit that runs the
//! daemon on behalf of a charm.

pub mod config;
pub mod daemon;
pub mod dbus;
pub mod install;

pub use config::NoticesConfig;
pub use daemon::{ActiveState, Daemon, DaemonError, DaemonEvent, ServiceStates};
