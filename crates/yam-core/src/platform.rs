//! Platform capabilities consumed by the core.
//!
//! The OS side (package enumeration, contacts provider, intent resolution)
//! sits behind [`LauncherPlatform`]. Calls may cross process boundaries and
//! block, so the core only invokes them from worker contexts.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;
use yam_types::{ContactEntry, DefaultAction, LaunchHandle, ProfileId, PRIMARY_PROFILE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Service not bound yet (normal during startup)
    #[error("{0} not available yet")]
    Unavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// A launchable activity as reported by the platform for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub component: String,
    pub label: String,
}

/// OS capabilities the launcher core depends on
pub trait LauncherPlatform: Send + Sync {
    /// Active user and work profiles, primary first
    fn profiles(&self) -> PlatformResult<Vec<ProfileId>>;

    /// Launchable activities installed under one profile, in platform order
    fn list_launch_targets(&self, profile: ProfileId) -> PlatformResult<Vec<PlatformTarget>>;

    /// Contacts whose display name contains `substring`, case-insensitively
    fn list_contacts(&self, substring: &str) -> PlatformResult<Vec<ContactEntry>>;

    /// Resolve a component to a launchable activity. A bare package resolves
    /// to that package's main activity. `Ok(None)` means not installed.
    fn resolve_activity(
        &self,
        component: &str,
        profile: ProfileId,
    ) -> PlatformResult<Option<LaunchHandle>>;

    /// Resolve the app handling an implicit action. `Ok(None)` means no handler.
    fn resolve_default(&self, action: &DefaultAction) -> PlatformResult<Option<LaunchHandle>>;
}

/// Default handlers of a [`StaticPlatform`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultHandlers {
    #[serde(default)]
    pub web_search: Option<String>,
    #[serde(default)]
    pub calendar: Option<String>,
    #[serde(default)]
    pub clock: Option<String>,
}

/// Serialized form of a [`StaticPlatform`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFixture {
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfileId>,

    #[serde(default)]
    pub apps: Vec<FixtureApp>,

    #[serde(default)]
    pub contacts: Vec<ContactEntry>,

    #[serde(default)]
    pub defaults: DefaultHandlers,
}

impl Default for PlatformFixture {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            apps: Vec::new(),
            contacts: Vec::new(),
            defaults: DefaultHandlers::default(),
        }
    }
}

fn default_profiles() -> Vec<ProfileId> {
    vec![PRIMARY_PROFILE]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureApp {
    pub component: String,
    #[serde(default)]
    pub profile: ProfileId,
    pub label: String,
}

impl FixtureApp {
    pub fn new(component: impl Into<String>, profile: ProfileId, label: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            profile,
            label: label.into(),
        }
    }
}

/// In-memory platform backed by a fixture.
///
/// Used by the CLI and tests. The fixture can be swapped at runtime to
/// simulate installs and uninstalls, and the whole platform can be marked
/// not ready to simulate the startup race.
pub struct StaticPlatform {
    state: RwLock<StaticState>,
}

struct StaticState {
    fixture: PlatformFixture,
    ready: bool,
}

impl StaticPlatform {
    #[must_use]
    pub fn new(fixture: PlatformFixture) -> Self {
        Self {
            state: RwLock::new(StaticState {
                fixture,
                ready: true,
            }),
        }
    }

    /// Load a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid fixture.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture: PlatformFixture = serde_json::from_str(&content)?;
        Ok(Self::new(fixture))
    }

    pub fn set_ready(&self, ready: bool) {
        if let Ok(mut state) = self.state.write() {
            state.ready = ready;
        }
    }

    pub fn set_apps(&self, apps: Vec<FixtureApp>) {
        if let Ok(mut state) = self.state.write() {
            state.fixture.apps = apps;
        }
    }

    pub fn set_contacts(&self, contacts: Vec<ContactEntry>) {
        if let Ok(mut state) = self.state.write() {
            state.fixture.contacts = contacts;
        }
    }

    fn with_ready<T>(
        &self,
        what: &str,
        f: impl FnOnce(&PlatformFixture) -> PlatformResult<T>,
    ) -> PlatformResult<T> {
        let state = self
            .state
            .read()
            .map_err(|_| PlatformError::Failed("platform state poisoned".to_string()))?;
        if !state.ready {
            return Err(PlatformError::Unavailable(what.to_string()));
        }
        f(&state.fixture)
    }
}

impl LauncherPlatform for StaticPlatform {
    fn profiles(&self) -> PlatformResult<Vec<ProfileId>> {
        self.with_ready("profiles", |fixture| Ok(fixture.profiles.clone()))
    }

    fn list_launch_targets(&self, profile: ProfileId) -> PlatformResult<Vec<PlatformTarget>> {
        self.with_ready("launcher apps", |fixture| {
            if !fixture.profiles.contains(&profile) {
                return Err(PlatformError::NotFound(format!("profile {profile}")));
            }
            Ok(fixture
                .apps
                .iter()
                .filter(|app| app.profile == profile)
                .map(|app| PlatformTarget {
                    component: app.component.clone(),
                    label: app.label.clone(),
                })
                .collect())
        })
    }

    fn list_contacts(&self, substring: &str) -> PlatformResult<Vec<ContactEntry>> {
        self.with_ready("contacts", |fixture| {
            let needle = substring.to_lowercase();
            let mut contacts: Vec<ContactEntry> = fixture
                .contacts
                .iter()
                .filter(|c| c.display_name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            contacts.sort_by(|a, b| a.display_name.cmp(&b.display_name));
            Ok(contacts)
        })
    }

    fn resolve_activity(
        &self,
        component: &str,
        profile: ProfileId,
    ) -> PlatformResult<Option<LaunchHandle>> {
        self.with_ready("launcher apps", |fixture| {
            if !fixture.profiles.contains(&profile) {
                return Ok(None);
            }
            let mut in_profile = fixture.apps.iter().filter(|app| app.profile == profile);
            let found = if component.contains('/') {
                in_profile.find(|app| app.component == component)
            } else {
                in_profile.find(|app| {
                    app.component
                        .split_once('/')
                        .map_or(app.component.as_str(), |(pkg, _)| pkg)
                        == component
                })
            };
            Ok(found.map(|app| LaunchHandle {
                component: app.component.clone(),
                profile,
            }))
        })
    }

    fn resolve_default(&self, action: &DefaultAction) -> PlatformResult<Option<LaunchHandle>> {
        self.with_ready("package manager", |fixture| {
            let handler = match action {
                DefaultAction::WebSearch { .. } => fixture.defaults.web_search.as_ref(),
                DefaultAction::Calendar => fixture.defaults.calendar.as_ref(),
                DefaultAction::Clock => fixture.defaults.clock.as_ref(),
            };
            Ok(handler.map(|component| LaunchHandle {
                component: component.clone(),
                profile: PRIMARY_PROFILE,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PlatformFixture {
        PlatformFixture {
            profiles: vec![0, 10],
            apps: vec![
                FixtureApp::new("org.calc/.Main", 0, "Calculator"),
                FixtureApp::new("org.calc/.History", 0, "Calc History"),
                FixtureApp::new("org.mail/.Inbox", 10, "Work Mail"),
            ],
            contacts: vec![
                ContactEntry::new("Zoe", 2),
                ContactEntry::new("Anna", 1),
                ContactEntry::new("Joanna", 3),
            ],
            defaults: DefaultHandlers {
                calendar: Some("org.cal/.Month".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_list_targets_per_profile() {
        let platform = StaticPlatform::new(fixture());
        let primary = platform.list_launch_targets(0).unwrap();
        assert_eq!(primary.len(), 2);
        assert_eq!(primary[0].label, "Calculator");
        let work = platform.list_launch_targets(10).unwrap();
        assert_eq!(work.len(), 1);
        assert!(platform.list_launch_targets(99).is_err());
    }

    #[test]
    fn test_not_ready_is_unavailable() {
        let platform = StaticPlatform::new(fixture());
        platform.set_ready(false);
        assert!(matches!(
            platform.profiles(),
            Err(PlatformError::Unavailable(_))
        ));
        assert!(matches!(
            platform.list_contacts("a"),
            Err(PlatformError::Unavailable(_))
        ));
    }

    #[test]
    fn test_contacts_substring_sorted() {
        let platform = StaticPlatform::new(fixture());
        let contacts = platform.list_contacts("ANN").unwrap();
        let names: Vec<_> = contacts.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Joanna"]);
    }

    #[test]
    fn test_resolve_bare_package_picks_first_activity() {
        let platform = StaticPlatform::new(fixture());
        let handle = platform.resolve_activity("org.calc", 0).unwrap().unwrap();
        assert_eq!(handle.component, "org.calc/.Main");
    }

    #[test]
    fn test_resolve_respects_profile() {
        let platform = StaticPlatform::new(fixture());
        assert!(platform.resolve_activity("org.mail/.Inbox", 0).unwrap().is_none());
        let handle = platform
            .resolve_activity("org.mail/.Inbox", 10)
            .unwrap()
            .unwrap();
        assert_eq!(handle.profile, 10);
    }

    #[test]
    fn test_resolve_default_handlers() {
        let platform = StaticPlatform::new(fixture());
        assert!(
            platform
                .resolve_default(&DefaultAction::Calendar)
                .unwrap()
                .is_some()
        );
        assert!(
            platform
                .resolve_default(&DefaultAction::Clock)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_fixture_defaults_to_primary_profile() {
        let fixture: PlatformFixture = serde_json::from_str(r#"{"apps": []}"#).unwrap();
        assert_eq!(fixture.profiles, vec![PRIMARY_PROFILE]);
    }
}
