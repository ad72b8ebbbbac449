//! PropertiesChanged subscription
//!
//! One match rule covers every unit object:
//!
//! ```text
//! type='signal',interface='org.freedesktop.DBus.Properties',
//! member='PropertiesChanged',path_namespace='/org/freedesktop/systemd1/unit'
//! ```
//!
//! Matching messages are decoded on the receive task and pushed, in delivery
//! order, onto the daemon's event channel.

use std::collections::HashMap;

use futures_lite::StreamExt;
use tokio::sync::mpsc;
use zbus::message::Type as MessageType;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{Connection, MatchRule, Message, MessageStream};

use super::{SystemdUnits, UNIT_PATH_NAMESPACE};
use crate::daemon::DaemonEvent;

const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
const PROPERTIES_CHANGED: &str = "PropertiesChanged";
const ACTIVE_STATE: &str = "ActiveState";

/// Messages buffered by zbus before the receive task drains them
const MAX_QUEUED: usize = 256;

/// A decoded PropertiesChanged broadcast for a unit object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// Object path the signal was emitted from
    pub path: String,
    /// New ActiveState, if it was among the changed properties
    pub active_state: Option<String>,
}

impl PropertyChange {
    pub fn new(path: impl Into<String>, active_state: Option<&str>) -> Self {
        Self {
            path: path.into(),
            active_state: active_state.map(str::to_string),
        }
    }

    /// Decode a PropertiesChanged signal
    ///
    /// Body signature is `sa{sv}as`: interface name, changed properties,
    /// invalidated property names. Returns None for anything else.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let header = msg.header();
        if header.member().map(|m| m.as_str()) != Some(PROPERTIES_CHANGED) {
            return None;
        }
        let path = header.path()?.to_string();

        let (_interface, changed, _invalidated): (
            String,
            HashMap<String, OwnedValue>,
            Vec<String>,
        ) = match msg.body().deserialize() {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Ignoring malformed PropertiesChanged from {}: {}", path, e);
                return None;
            }
        };

        let active_state = changed.get(ACTIVE_STATE).and_then(|value| match &**value {
            Value::Str(s) => Some(s.to_string()),
            _ => None,
        });

        Some(Self { path, active_state })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Failed to connect to the system bus: {0}")]
    Connect(#[source] zbus::Error),

    #[error("Failed to register PropertiesChanged match rule: {0}")]
    AddMatch(#[source] zbus::Error),
}

/// Match rule for PropertiesChanged on every systemd unit object
fn unit_properties_rule() -> zbus::Result<MatchRule<'static>> {
    Ok(MatchRule::builder()
        .msg_type(MessageType::Signal)
        .interface(PROPERTIES_INTERFACE)?
        .member(PROPERTIES_CHANGED)?
        .path_namespace(UNIT_PATH_NAMESPACE)?
        .build())
}

/// Connection to the system bus
pub struct BusClient {
    connection: Connection,
}

impl BusClient {
    /// Open a connection to the system bus
    pub async fn connect() -> Result<Self, BusError> {
        let connection = Connection::system().await.map_err(BusError::Connect)?;
        log::debug!(
            "Connected to system bus as {}",
            connection
                .unique_name()
                .map(|n| n.to_string())
                .unwrap_or_default()
        );
        Ok(Self { connection })
    }

    /// Unit state queries sharing this connection
    pub fn units(&self) -> SystemdUnits {
        SystemdUnits::new(self.connection.clone())
    }

    /// Register the unit PropertiesChanged match and forward matches to `events`
    ///
    /// The AddMatch call is made before this returns, so a rejected rule is
    /// reported here. The receive task stops when the event channel closes.
    pub async fn subscribe(
        &self,
        events: mpsc::UnboundedSender<DaemonEvent>,
    ) -> Result<(), BusError> {
        let rule = unit_properties_rule().map_err(BusError::AddMatch)?;
        log::debug!("Adding match rule: {}", rule);

        let mut stream = MessageStream::for_match_rule(rule, &self.connection, Some(MAX_QUEUED))
            .await
            .map_err(BusError::AddMatch)?;

        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(e) => {
                        log::warn!("Error receiving D-Bus message: {}", e);
                        continue;
                    }
                };
                log::trace!(
                    "Received message: path: {:?}, interface: {:?}, member: {:?}",
                    msg.header().path().map(|p| p.to_string()),
                    msg.header().interface().map(|i| i.to_string()),
                    msg.header().member().map(|m| m.to_string()),
                );
                let Some(change) = PropertyChange::from_message(&msg) else {
                    continue;
                };
                if events.send(DaemonEvent::PropertiesChanged(change)).is_err() {
                    // Daemon loop gone
                    break;
                }
            }
            log::debug!("PropertiesChanged stream ended");
        });

        Ok(())
    }
}
