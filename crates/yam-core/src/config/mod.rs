mod dirs;
mod settings;
mod validation;
mod watcher;

pub use dirs::Directories;
pub use settings::{
    AppAlias, AppsConfig, Config, ContactsConfig, RegistryConfig, SearchConfig, ShortcutConfig,
    TargetOverrides,
};
pub use validation::warn_unknown_fields;
pub use watcher::{ConfigWatcher, spawn_config_watcher};

use std::sync::Arc;
use tokio::sync::watch;

/// Live configuration shared between the registry, the filter pipeline and
/// the host.
///
/// Readers get a complete `Arc<Config>`; replacing the config swaps the
/// whole value, so no reader ever sees a half-applied update.
#[derive(Clone)]
pub struct SharedConfig {
    tx: Arc<watch::Sender<Arc<Config>>>,
}

impl SharedConfig {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(config));
        Self { tx: Arc::new(tx) }
    }

    /// Current config
    #[must_use]
    pub fn get(&self) -> Arc<Config> {
        self.tx.borrow().clone()
    }

    pub fn replace(&self, config: Config) {
        self.tx.send_replace(Arc::new(config));
    }

    /// Apply `f` to a copy of the current config and publish the result.
    /// Returns the published config.
    pub fn update(&self, f: impl FnOnce(&mut Config)) -> Arc<Config> {
        let mut published = None;
        self.tx.send_modify(|current| {
            let mut next = (**current).clone();
            f(&mut next);
            let next = Arc::new(next);
            *current = Arc::clone(&next);
            published = Some(next);
        });
        published.unwrap_or_else(|| self.get())
    }

    /// Notified on every replace or update
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.tx.subscribe()
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedConfig").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_swaps_whole_config() {
        let shared = SharedConfig::default();
        let before = shared.get();

        let mut next = Config::default();
        next.search.fuzzy = true;
        shared.replace(next);

        assert!(!before.search.fuzzy);
        assert!(shared.get().search.fuzzy);
    }

    #[test]
    fn test_update_returns_published_config() {
        let shared = SharedConfig::default();
        let published = shared.update(|c| c.search.auto_launch = true);
        assert!(published.search.auto_launch);
        assert!(shared.get().search.auto_launch);
    }

    #[test]
    fn test_subscribers_see_updates() {
        let shared = SharedConfig::default();
        let mut rx = shared.subscribe();
        assert!(!rx.has_changed().unwrap());
        shared.update(|c| c.contacts.enabled = true);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contacts.enabled);
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedConfig::default();
        let other = shared.clone();
        other.update(|c| c.shortcuts.count = 6);
        assert_eq!(shared.get().shortcuts.count, 6);
    }
}
