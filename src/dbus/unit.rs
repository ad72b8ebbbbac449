//! org.freedesktop.systemd1.Unit client
//!
//! The daemon only reads ActiveState: "active", "inactive", "failed", etc.

use zbus::fdo::IntrospectableProxy;
use zbus::proxy::CacheProperties;
use zbus::{proxy, Connection};

use super::{unit_object_path, SYSTEMD_SERVICE};
use crate::daemon::{ActiveState, UnitStateQuery};

#[proxy(
    interface = "org.freedesktop.systemd1.Unit",
    default_service = "org.freedesktop.systemd1"
)]
trait Unit {
    /// High-level state: "active", "inactive", "activating", "deactivating", "failed"
    #[zbus(property)]
    fn active_state(&self) -> zbus::Result<String>;
}

/// Queries unit state from systemd over an existing bus connection
#[derive(Clone)]
pub struct SystemdUnits {
    connection: Connection,
}

impl SystemdUnits {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Introspect the unit object, then read its ActiveState
    async fn query(&self, unit_name: &str) -> zbus::Result<String> {
        let path = unit_object_path(unit_name);

        let introspectable = IntrospectableProxy::builder(&self.connection)
            .destination(SYSTEMD_SERVICE)?
            .path(path.as_str())?
            .build()
            .await?;
        introspectable.introspect().await?;

        let unit = UnitProxy::builder(&self.connection)
            .path(path.as_str())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        unit.active_state().await
    }
}

impl UnitStateQuery for SystemdUnits {
    async fn active_state(&self, unit_name: &str) -> ActiveState {
        log::debug!(
            "Retrieving state for service {} at object path: {}",
            unit_name,
            unit_object_path(unit_name)
        );
        match self.query(unit_name).await {
            Ok(state) => ActiveState::new(state),
            Err(e) => {
                // Units that are not installed yet have no object on the bus
                log::debug!("Cannot query {}: {} (treating as unknown)", unit_name, e);
                ActiveState::unknown()
            }
        }
    }
}
