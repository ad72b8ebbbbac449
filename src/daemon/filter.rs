//! PropertiesChanged transition filter
//!
//! A change is only reported when all of these hold:
//! - ActiveState is among the changed properties
//! - the unit is a watched service
//! - the new state is settled (not "...ing")
//! - the new state differs from the last recorded one

use super::discovery::UnitStateQuery;
use super::notify::{HookRunner, NotificationEvent};
use super::state::ActiveState;
use super::Daemon;
use crate::dbus::{unit_name_from_path, PropertyChange};

impl<Q: UnitStateQuery, R: HookRunner> Daemon<Q, R> {
    /// Apply one PropertiesChanged broadcast
    ///
    /// Returns true if the change was accepted and a hook was dispatched.
    pub fn on_properties_changed(&mut self, change: &PropertyChange) -> bool {
        let service = unit_name_from_path(&change.path);
        let Some(new_state) = change.active_state.as_deref() else {
            return false;
        };

        let Some(prev_state) = self.states.get(&service) else {
            log::debug!("Dropping event for unwatched service: {}", service);
            return false;
        };

        let new_state = ActiveState::from(new_state);
        // Drop transitioning and duplicate events
        if new_state.is_transitional() || &new_state == prev_state {
            log::debug!("Dropping event - service: {}, state: {}", service, new_state);
            return false;
        }

        log::debug!("Service {} changed state to {}", service, new_state);
        self.states.set(service.clone(), new_state.clone());
        self.notifier
            .notify(&NotificationEvent::new(service, new_state));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::notify::HookInvocation;
    use crate::daemon::testing::{Recorder, StaticUnits};
    use crate::dbus::unit_object_path;
    use crate::NoticesConfig;

    fn daemon_with(states: &[(&str, &str)]) -> (Daemon<StaticUnits, Recorder>, Recorder) {
        let config = NoticesConfig::new("slurmd/0").with_hooks_dir("/nonexistent");
        let recorder = Recorder::default();
        let mut daemon = Daemon::new(&config, StaticUnits::default(), recorder.clone());
        for (service, state) in states {
            daemon.states_mut().set(*service, ActiveState::from(*state));
        }
        (daemon, recorder)
    }

    fn change(service: &str, state: Option<&str>) -> PropertyChange {
        PropertyChange::new(unit_object_path(service), state)
    }

    #[test]
    fn test_accepted_transition_started() {
        let (mut daemon, recorder) = daemon_with(&[("foo.service", "inactive")]);

        assert!(daemon.on_properties_changed(&change("foo.service", Some("active"))));

        assert_eq!(
            daemon.states().get("foo.service"),
            Some(&ActiveState::from("active"))
        );
        assert_eq!(
            recorder.invocations(),
            vec![HookInvocation {
                unit: "slurmd/0".into(),
                hook: "hooks/service-foo-started".into(),
            }]
        );
    }

    #[test]
    fn test_failed_maps_to_stopped() {
        let (mut daemon, recorder) = daemon_with(&[("foo.service", "active")]);

        assert!(daemon.on_properties_changed(&change("foo.service", Some("failed"))));

        let calls = recorder.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].hook, "hooks/service-foo-stopped");
    }

    #[test]
    fn test_duplicate_state_suppressed() {
        let (mut daemon, recorder) = daemon_with(&[("foo.service", "active")]);

        assert!(!daemon.on_properties_changed(&change("foo.service", Some("active"))));

        assert_eq!(
            daemon.states().get("foo.service"),
            Some(&ActiveState::from("active"))
        );
        assert!(recorder.invocations().is_empty());
    }

    #[test]
    fn test_transitional_states_suppressed() {
        for prev in ["active", "inactive", "failed", "unknown"] {
            let (mut daemon, recorder) = daemon_with(&[("foo.service", prev)]);
            for state in ["activating", "deactivating", "reloading"] {
                assert!(!daemon.on_properties_changed(&change("foo.service", Some(state))));
            }
            assert_eq!(
                daemon.states().get("foo.service"),
                Some(&ActiveState::from(prev))
            );
            assert!(recorder.invocations().is_empty());
        }
    }

    #[test]
    fn test_untracked_service_ignored() {
        let (mut daemon, recorder) = daemon_with(&[("foo.service", "inactive")]);

        assert!(!daemon.on_properties_changed(&change("bar.service", Some("active"))));

        assert!(!daemon.states().contains("bar.service"));
        assert_eq!(daemon.states().len(), 1);
        assert!(recorder.invocations().is_empty());
    }

    #[test]
    fn test_change_without_active_state_ignored() {
        let (mut daemon, recorder) = daemon_with(&[("foo.service", "inactive")]);

        assert!(!daemon.on_properties_changed(&change("foo.service", None)));

        assert_eq!(
            daemon.states().get("foo.service"),
            Some(&ActiveState::from("inactive"))
        );
        assert!(recorder.invocations().is_empty());
    }

    #[test]
    fn test_start_stop_cycle() {
        let (mut daemon, recorder) = daemon_with(&[("slurmd.service", "inactive")]);

        for state in ["activating", "active", "active", "deactivating", "inactive", "inactive"] {
            daemon.on_properties_changed(&change("slurmd.service", Some(state)));
        }

        let hooks: Vec<String> = recorder.invocations().into_iter().map(|i| i.hook).collect();
        assert_eq!(
            hooks,
            vec![
                "hooks/service-slurmd-started".to_string(),
                "hooks/service-slurmd-stopped".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_to_inactive_notifies_stopped() {
        let (mut daemon, recorder) = daemon_with(&[("munged.service", "unknown")]);

        assert!(daemon.on_properties_changed(&change("munged.service", Some("inactive"))));
        assert_eq!(recorder.invocations()[0].hook, "hooks/service-munged-stopped");
    }
}
