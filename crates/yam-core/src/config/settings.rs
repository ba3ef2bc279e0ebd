use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use yam_types::{ProfileId, TargetId};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub shortcuts: ShortcutConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub contacts: ContactsConfig,

    #[serde(default)]
    pub apps: AppsConfig,
}

impl Config {
    /// Load config from file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Also accept in-order subsequence matches
    #[serde(default)]
    pub fuzzy: bool,

    /// Launch immediately when exactly one app matches
    #[serde(default)]
    pub auto_launch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutConfig {
    /// Number of slots shown on the home screen
    #[serde(default = "default_shortcut_count")]
    pub count: usize,

    /// Number of slots the store keeps
    #[serde(default = "default_shortcut_capacity")]
    pub capacity: usize,

    /// Offer hidden apps when binding a slot
    #[serde(default)]
    pub show_hidden: bool,
}

impl ShortcutConfig {
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.count.min(self.capacity)
    }
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            count: default_shortcut_count(),
            capacity: default_shortcut_capacity(),
            show_hidden: false,
        }
    }
}

fn default_shortcut_count() -> usize {
    4
}

fn default_shortcut_capacity() -> usize {
    8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

/// Lower bound for the refresh period
const MIN_REFRESH_INTERVAL_MS: u64 = 100;

impl RegistryConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

fn default_refresh_interval_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Per-app user overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppsConfig {
    #[serde(default)]
    pub aliases: Vec<AppAlias>,

    #[serde(default)]
    pub hidden: Vec<TargetId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppAlias {
    pub component: String,
    #[serde(default)]
    pub profile: ProfileId,
    pub label: String,
}

impl AppsConfig {
    #[must_use]
    pub fn alias_for(&self, id: &TargetId) -> Option<&str> {
        self.aliases
            .iter()
            .find(|a| a.component == id.component && a.profile == id.profile)
            .map(|a| a.label.as_str())
    }

    #[must_use]
    pub fn is_hidden(&self, id: &TargetId) -> bool {
        self.hidden.contains(id)
    }

    /// Set or replace the alias for a target
    pub fn set_alias(&mut self, id: &TargetId, label: &str) {
        if let Some(existing) = self
            .aliases
            .iter_mut()
            .find(|a| a.component == id.component && a.profile == id.profile)
        {
            existing.label = label.to_string();
        } else {
            self.aliases.push(AppAlias {
                component: id.component.clone(),
                profile: id.profile,
                label: label.to_string(),
            });
        }
    }

    /// Returns whether an alias was removed
    pub fn clear_alias(&mut self, id: &TargetId) -> bool {
        let before = self.aliases.len();
        self.aliases
            .retain(|a| !(a.component == id.component && a.profile == id.profile));
        self.aliases.len() != before
    }

    /// Returns whether the hidden set changed
    pub fn set_hidden(&mut self, id: &TargetId, hidden: bool) -> bool {
        let present = self.hidden.contains(id);
        match (hidden, present) {
            (true, false) => {
                self.hidden.push(id.clone());
                true
            }
            (false, true) => {
                self.hidden.retain(|h| h != id);
                true
            }
            _ => false,
        }
    }

    /// Lookup tables for one enumeration pass
    #[must_use]
    pub fn overrides(&self) -> TargetOverrides<'_> {
        TargetOverrides {
            aliases: self
                .aliases
                .iter()
                .map(|a| {
                    (
                        TargetId::new(a.component.clone(), a.profile),
                        a.label.as_str(),
                    )
                })
                .collect(),
            hidden: self.hidden.iter().collect(),
        }
    }
}

/// Hashed view of [`AppsConfig`] used while enumerating
pub struct TargetOverrides<'a> {
    aliases: HashMap<TargetId, &'a str>,
    hidden: HashSet<&'a TargetId>,
}

impl TargetOverrides<'_> {
    #[must_use]
    pub fn alias(&self, id: &TargetId) -> Option<&str> {
        self.aliases.get(id).copied()
    }

    #[must_use]
    pub fn is_hidden(&self, id: &TargetId) -> bool {
        self.hidden.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.search.fuzzy);
        assert!(!config.search.auto_launch);
        assert_eq!(config.shortcuts.count, 4);
        assert_eq!(config.shortcuts.capacity, 8);
        assert_eq!(config.registry.refresh_interval(), Duration::from_secs(5));
        assert!(!config.contacts.enabled);
    }

    #[test]
    fn test_visible_count_clamped_to_capacity() {
        let shortcuts = ShortcutConfig {
            count: 12,
            capacity: 8,
            show_hidden: false,
        };
        assert_eq!(shortcuts.visible_count(), 8);
    }

    #[test]
    fn test_refresh_interval_has_floor() {
        let registry = RegistryConfig {
            refresh_interval_ms: 0,
        };
        assert_eq!(registry.refresh_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_alias_set_replace_clear() {
        let mut apps = AppsConfig::default();
        let id = TargetId::new("org.chat/.Main", 0);
        apps.set_alias(&id, "Chat");
        apps.set_alias(&id, "Messages");
        assert_eq!(apps.aliases.len(), 1);
        assert_eq!(apps.alias_for(&id), Some("Messages"));
        assert!(apps.clear_alias(&id));
        assert!(!apps.clear_alias(&id));
        assert!(apps.alias_for(&id).is_none());
    }

    #[test]
    fn test_alias_is_per_profile() {
        let mut apps = AppsConfig::default();
        apps.set_alias(&TargetId::new("org.mail", 10), "Work Mail");
        assert!(apps.alias_for(&TargetId::new("org.mail", 0)).is_none());
    }

    #[test]
    fn test_set_hidden_reports_changes() {
        let mut apps = AppsConfig::default();
        let id = TargetId::new("org.game", 0);
        assert!(apps.set_hidden(&id, true));
        assert!(!apps.set_hidden(&id, true));
        assert!(apps.is_hidden(&id));
        assert!(apps.set_hidden(&id, false));
        assert!(!apps.is_hidden(&id));
    }

    #[test]
    fn test_overrides_lookup() {
        let mut apps = AppsConfig::default();
        let id = TargetId::new("org.chat", 0);
        apps.set_alias(&id, "Chat");
        apps.set_hidden(&id, true);
        let overrides = apps.overrides();
        assert_eq!(overrides.alias(&id), Some("Chat"));
        assert!(overrides.is_hidden(&id));
        assert!(!overrides.is_hidden(&TargetId::new("org.other", 0)));
    }
}
