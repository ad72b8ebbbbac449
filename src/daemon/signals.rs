//! Signal handling for the notices daemon
//!
//! - SIGTERM/SIGINT: Stop the daemon
//! - SIGHUP: Re-scan the hooks directory for new services
//!
//! Signals are forwarded onto the daemon's event channel so they are
//! handled on the same task as bus messages.

use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;

use super::DaemonEvent;

/// Signals the daemon handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticesSignal {
    /// Shutdown request (SIGTERM)
    Term,
    /// Interrupt (SIGINT, Ctrl+C)
    Int,
    /// Hangup (SIGHUP) - reload services from hooks
    Hup,
}

impl From<NoticesSignal> for DaemonEvent {
    fn from(sig: NoticesSignal) -> Self {
        match sig {
            NoticesSignal::Term | NoticesSignal::Int => DaemonEvent::Terminate,
            NoticesSignal::Hup => DaemonEvent::Reload,
        }
    }
}

pub struct SignalHandler {
    sigterm: Signal,
    sigint: Signal,
    sighup: Signal,
}

impl SignalHandler {
    /// Install handlers for SIGTERM, SIGINT and SIGHUP
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            sighup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal
    pub async fn wait(&mut self) -> NoticesSignal {
        tokio::select! {
            _ = self.sigterm.recv() => NoticesSignal::Term,
            _ = self.sigint.recv() => NoticesSignal::Int,
            _ = self.sighup.recv() => NoticesSignal::Hup,
        }
    }

    /// Spawn a task that forwards signals as daemon events
    pub fn spawn_forwarder(mut self, events: mpsc::UnboundedSender<DaemonEvent>) {
        tokio::spawn(async move {
            loop {
                let sig = self.wait().await;
                log::debug!("Received {:?}", sig);
                if events.send(sig.into()).is_err() {
                    // Daemon loop gone, exit
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{raise, Signal as NixSignal};
    use std::time::Duration;

    #[test]
    fn test_signal_events() {
        assert_eq!(DaemonEvent::from(NoticesSignal::Term), DaemonEvent::Terminate);
        assert_eq!(DaemonEvent::from(NoticesSignal::Int), DaemonEvent::Terminate);
        assert_eq!(DaemonEvent::from(NoticesSignal::Hup), DaemonEvent::Reload);
    }

    #[tokio::test]
    async fn test_sighup_forwarded_as_reload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        SignalHandler::new().unwrap().spawn_forwarder(tx);

        raise(NixSignal::SIGHUP).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("SIGHUP not forwarded");
        assert_eq!(event, Some(DaemonEvent::Reload));
    }
}
