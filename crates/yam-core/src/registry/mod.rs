//! Authoritative list of launch targets.
//!
//! The registry enumerates targets from the platform (one call per active
//! profile), applies user aliases and the hidden filter, and publishes the
//! result through a `watch` channel. Publishing swaps the whole snapshot,
//! so readers never observe a partial list.

mod refresh;
mod snapshot;

pub use refresh::{refresh_once, spawn_refresh_loop};
pub use snapshot::RegistrySnapshot;

use crate::Result;
use crate::config::{Config, SharedConfig};
use crate::platform::{LauncherPlatform, PlatformError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use yam_types::{LaunchTarget, TargetId};

/// True iff the two lists differ in length or in the identity at any
/// position. Label, alias and hidden-flag differences are ignored so that
/// cosmetic metadata changes do not churn the UI.
#[must_use]
pub fn has_changed(previous: &[LaunchTarget], next: &[LaunchTarget]) -> bool {
    previous.len() != next.len() || previous.iter().zip(next).any(|(a, b)| a.id != b.id)
}

pub struct Registry {
    platform: Arc<dyn LauncherPlatform>,
    config: SharedConfig,
    current: watch::Sender<RegistrySnapshot>,
}

impl Registry {
    #[must_use]
    pub fn new(platform: Arc<dyn LauncherPlatform>, config: SharedConfig) -> Self {
        let (current, _rx) = watch::channel(RegistrySnapshot::default());
        Self {
            platform,
            config,
            current,
        }
    }

    /// Pull the current target list from the platform.
    ///
    /// Blocking: this crosses into the platform once per profile. Never call
    /// it from a latency-sensitive context.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` while the platform is not ready, or
    /// `Error::Platform` if enumeration fails.
    pub fn enumerate(&self, include_hidden: bool) -> Result<RegistrySnapshot> {
        self.enumerate_with(&self.config.get(), include_hidden)
    }

    /// Enumerate visible targets and return the config they were built
    /// under, for [`publish_if_changed`](Self::publish_if_changed).
    ///
    /// # Errors
    ///
    /// As [`enumerate`](Self::enumerate).
    pub fn enumerate_stamped(&self) -> Result<(RegistrySnapshot, Arc<Config>)> {
        let config = self.config.get();
        let snapshot = self.enumerate_with(&config, false)?;
        Ok((snapshot, config))
    }

    fn enumerate_with(&self, config: &Config, include_hidden: bool) -> Result<RegistrySnapshot> {
        let overrides = config.apps.overrides();

        let mut targets = Vec::new();
        for profile in self.platform.profiles()? {
            let listed = match self.platform.list_launch_targets(profile) {
                Ok(listed) => listed,
                Err(PlatformError::NotFound(what)) => {
                    // Profile removed between the two calls
                    debug!("Skipping profile {}: {} not found", profile, what);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            for entry in listed {
                let id = TargetId::new(entry.component, profile);
                let hidden = overrides.is_hidden(&id);
                if hidden && !include_hidden {
                    continue;
                }
                let alias = overrides.alias(&id).map(str::to_string);
                targets.push(LaunchTarget {
                    id,
                    label: entry.label,
                    alias,
                    hidden,
                });
            }
        }

        let snapshot = RegistrySnapshot::new(targets);
        debug!(
            "Enumerated {} targets (include_hidden={})",
            snapshot.len(),
            include_hidden
        );
        Ok(snapshot)
    }

    /// Latest published snapshot
    #[must_use]
    pub fn current(&self) -> RegistrySnapshot {
        self.current.borrow().clone()
    }

    /// Change notifications; the receiver always holds the latest snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.current.subscribe()
    }

    /// Publish `next` if its identity sequence differs from the current
    /// snapshot. Comparison and swap happen under the channel lock.
    ///
    /// `basis` is the config `next` was built under. If the config has been
    /// replaced since, `next` may carry stale aliases or hidden targets and
    /// is dropped.
    pub fn publish_if_changed(&self, next: RegistrySnapshot, basis: &Arc<Config>) -> bool {
        let published = self.current.send_if_modified(|current| {
            if !Arc::ptr_eq(basis, &self.config.get()) {
                debug!("Dropping enumeration built under a replaced config");
                return false;
            }
            if has_changed(current, &next) {
                *current = next;
                true
            } else {
                false
            }
        });
        if published {
            info!("Registry changed, published {} targets", self.current.borrow().len());
        }
        published
    }

    /// Publish unconditionally. Used after explicit user edits (alias,
    /// hide) whose effect should show up immediately.
    pub fn publish(&self, next: RegistrySnapshot) {
        self.current.send_replace(next);
    }

    /// Run one refresh cycle: enumerate visible targets and publish them if
    /// the identity sequence changed.
    ///
    /// # Errors
    ///
    /// Propagates enumeration errors; nothing is published then.
    pub fn refresh_cycle(&self) -> Result<bool> {
        let (next, basis) = self.enumerate_stamped()?;
        Ok(self.publish_if_changed(next, &basis))
    }

    /// Poll-friendly refresh: runs a cycle and returns the current snapshot.
    /// Enumeration failures are logged and leave the snapshot as it was.
    pub fn refresh(&self) -> RegistrySnapshot {
        if let Err(e) = self.refresh_cycle() {
            if e.is_transient() {
                debug!("Registry refresh skipped: {}", e);
            } else {
                tracing::warn!("Registry refresh failed: {}", e);
            }
        }
        self.current()
    }

    /// Re-enumerate and publish regardless of the identity comparison.
    ///
    /// # Errors
    ///
    /// Propagates enumeration errors.
    pub fn republish(&self) -> Result<()> {
        let next = self.enumerate(false)?;
        self.publish(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{FixtureApp, PlatformFixture, StaticPlatform};

    fn ids(pairs: &[(&str, u32, &str)]) -> Vec<LaunchTarget> {
        pairs
            .iter()
            .map(|(c, p, l)| LaunchTarget::new(*c, *p, *l))
            .collect()
    }

    fn registry_with(apps: Vec<FixtureApp>, profiles: Vec<u32>) -> (Arc<StaticPlatform>, Registry) {
        let platform = Arc::new(StaticPlatform::new(PlatformFixture {
            profiles,
            apps,
            ..Default::default()
        }));
        let registry = Registry::new(platform.clone(), SharedConfig::default());
        (platform, registry)
    }

    #[test]
    fn test_has_changed_identical() {
        let a = ids(&[("a", 0, "A"), ("b", 0, "B")]);
        assert!(!has_changed(&a, &a.clone()));
    }

    #[test]
    fn test_has_changed_ignores_labels() {
        let a = ids(&[("chat", 0, "WhatsApp")]);
        let b = ids(&[("chat", 0, "WhatsApp Messenger")]);
        assert!(!has_changed(&a, &b));
    }

    #[test]
    fn test_has_changed_ignores_hidden_flag() {
        let a = ids(&[("a", 0, "A")]);
        let b = vec![LaunchTarget::new("a", 0, "A").with_hidden(true)];
        assert!(!has_changed(&a, &b));
    }

    #[test]
    fn test_has_changed_length() {
        let a = ids(&[("a", 0, "A")]);
        let b = ids(&[("a", 0, "A"), ("b", 0, "B")]);
        assert!(has_changed(&a, &b));
        assert!(has_changed(&b, &a));
    }

    #[test]
    fn test_has_changed_order() {
        let a = ids(&[("a", 0, "A"), ("b", 0, "B")]);
        let b = ids(&[("b", 0, "B"), ("a", 0, "A")]);
        assert!(has_changed(&a, &b));
    }

    #[test]
    fn test_has_changed_profile() {
        let a = ids(&[("a", 0, "A")]);
        let b = ids(&[("a", 10, "A")]);
        assert!(has_changed(&a, &b));
    }

    #[test]
    fn test_enumerate_walks_profiles_in_order() {
        let (_platform, registry) = registry_with(
            vec![
                FixtureApp::new("work.mail", 10, "Mail"),
                FixtureApp::new("calc", 0, "Calculator"),
            ],
            vec![0, 10],
        );
        let snapshot = registry.enumerate(false).unwrap();
        let components: Vec<_> = snapshot.iter().map(LaunchTarget::component).collect();
        assert_eq!(components, vec!["calc", "work.mail"]);
        assert_eq!(snapshot[1].profile(), 10);
    }

    #[test]
    fn test_enumerate_unavailable() {
        let (platform, registry) = registry_with(vec![], vec![0]);
        platform.set_ready(false);
        let err = registry.enumerate(false).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_refresh_publishes_only_on_identity_change() {
        let (platform, registry) =
            registry_with(vec![FixtureApp::new("chat", 0, "WhatsApp")], vec![0]);
        let mut rx = registry.subscribe();

        assert!(registry.refresh_cycle().unwrap());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        platform.set_apps(vec![FixtureApp::new("chat", 0, "WhatsApp Messenger")]);
        assert!(!registry.refresh_cycle().unwrap());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(registry.current()[0].label, "WhatsApp");
    }

    #[test]
    fn test_refresh_returns_current_when_unavailable() {
        let (platform, registry) = registry_with(vec![FixtureApp::new("a", 0, "A")], vec![0]);
        registry.refresh();
        platform.set_ready(false);
        let snapshot = registry.refresh();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_republish_forces_new_labels() {
        let (platform, registry) = registry_with(vec![FixtureApp::new("a", 0, "Old")], vec![0]);
        registry.refresh();
        platform.set_apps(vec![FixtureApp::new("a", 0, "New")]);
        registry.republish().unwrap();
        assert_eq!(registry.current()[0].label, "New");
    }

    #[test]
    fn test_enumeration_from_replaced_config_is_dropped() {
        let (_platform, registry) = registry_with(
            vec![FixtureApp::new("a", 0, "A"), FixtureApp::new("b", 0, "B")],
            vec![0],
        );
        registry.refresh();
        let (stale, basis) = registry.enumerate_stamped().unwrap();

        registry.config.update(|c| {
            c.apps.set_hidden(&TargetId::new("b", 0), true);
        });
        registry.republish().unwrap();
        assert_eq!(registry.current().len(), 1);

        assert!(!registry.publish_if_changed(stale, &basis));
        assert_eq!(registry.current().len(), 1);
    }
}
