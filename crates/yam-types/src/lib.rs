//! Shared types for the yam launcher.
//!
//! This crate provides the data model used by yam-core and its consumers
//! (the CLI, and any UI layer embedding the core). All types are
//! serializable so that fixtures and persisted state share one shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a user or work profile. `0` is the primary profile.
pub type ProfileId = u32;

/// The primary (personal) profile
pub const PRIMARY_PROFILE: ProfileId = 0;

/// Stable identity of a launch target: component plus owning profile.
///
/// The component is either fully qualified (`package/class`) or a bare
/// package name that is resolved to the package's main activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId {
    pub component: String,
    #[serde(default)]
    pub profile: ProfileId,
}

impl TargetId {
    pub fn new(component: impl Into<String>, profile: ProfileId) -> Self {
        Self {
            component: component.into(),
            profile,
        }
    }

    /// Package part of the component (everything before `/`)
    #[must_use]
    pub fn package(&self) -> &str {
        self.component
            .split_once('/')
            .map_or(self.component.as_str(), |(pkg, _)| pkg)
    }

    /// Activity class, if the component is fully qualified
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.component.split_once('/').map(|(_, class)| class)
    }

    #[must_use]
    pub fn is_work_profile(&self) -> bool {
        self.profile != PRIMARY_PROFILE
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.component, self.profile)
    }
}

/// One launchable unit in the registry.
///
/// Equality and hashing use only the identity; label, alias and the hidden
/// flag are metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTarget {
    #[serde(flatten)]
    pub id: TargetId,

    /// Label reported by the platform
    pub label: String,

    /// User-assigned alias that overrides the platform label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Suppressed from normal listing
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

// Serde skip_serializing_if requires &bool signature
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl LaunchTarget {
    pub fn new(component: impl Into<String>, profile: ProfileId, label: impl Into<String>) -> Self {
        Self {
            id: TargetId::new(component, profile),
            label: label.into(),
            alias: None,
            hidden: false,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Label shown to the user: the alias when set, else the platform label
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.label)
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.id.component
    }

    #[must_use]
    pub fn profile(&self) -> ProfileId {
        self.id.profile
    }
}

impl PartialEq for LaunchTarget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LaunchTarget {}

impl Hash for LaunchTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A contact returned by the contacts capability for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub display_name: String,
    pub contact_id: i64,
}

impl ContactEntry {
    pub fn new(display_name: impl Into<String>, contact_id: i64) -> Self {
        Self {
            display_name: display_name.into(),
            contact_id,
        }
    }
}

/// What a shortcut slot points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    /// An application activity, possibly in a work profile
    App {
        component: String,
        #[serde(default)]
        profile: ProfileId,
    },

    /// A contact by provider id
    Contact { contact_id: i64 },
}

impl TargetRef {
    pub fn app(component: impl Into<String>, profile: ProfileId) -> Self {
        Self::App {
            component: component.into(),
            profile,
        }
    }

    #[must_use]
    pub fn contact(contact_id: i64) -> Self {
        Self::Contact { contact_id }
    }

    /// True for apps bound from a non-primary profile
    #[must_use]
    pub fn is_work_profile(&self) -> bool {
        matches!(self, Self::App { profile, .. } if *profile != PRIMARY_PROFILE)
    }

    /// Target identity for app references
    #[must_use]
    pub fn target_id(&self) -> Option<TargetId> {
        match self {
            Self::App { component, profile } => Some(TargetId::new(component.clone(), *profile)),
            Self::Contact { .. } => None,
        }
    }
}

impl From<&TargetId> for TargetRef {
    fn from(id: &TargetId) -> Self {
        Self::app(id.component.clone(), id.profile)
    }
}

impl From<&LaunchTarget> for TargetRef {
    fn from(target: &LaunchTarget) -> Self {
        Self::from(&target.id)
    }
}

impl From<&ContactEntry> for TargetRef {
    fn from(contact: &ContactEntry) -> Self {
        Self::contact(contact.contact_id)
    }
}

/// A fixed shortcut position on the home screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ShortcutSlot {
    #[default]
    Empty,

    /// Bound to a target. `label` is never empty.
    Bound { label: String, target: TargetRef },
}

impl ShortcutSlot {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound { .. })
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Bound { label, .. } => Some(label),
            Self::Empty => None,
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<&TargetRef> {
        match self {
            Self::Bound { target, .. } => Some(target),
            Self::Empty => None,
        }
    }
}

/// Which list the search field is currently filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Apps,
    Contacts,
}

/// Items of a list result, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum ListItems {
    Apps(Vec<LaunchTarget>),
    Contacts(Vec<ContactEntry>),
}

impl ListItems {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Apps(items) => items.len(),
            Self::Contacts(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// App items, or `None` for a contacts list
    #[must_use]
    pub fn apps(&self) -> Option<&[LaunchTarget]> {
        match self {
            Self::Apps(items) => Some(items),
            Self::Contacts(_) => None,
        }
    }

    #[must_use]
    pub fn contacts(&self) -> Option<&[ContactEntry]> {
        match self {
            Self::Contacts(items) => Some(items),
            Self::Apps(_) => None,
        }
    }
}

/// Outcome of one filter pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterResult {
    /// Render this list
    ShowList { items: ListItems },

    /// Launch the single remaining target immediately
    AutoLaunch { target: LaunchTarget },

    /// Nothing to do (capability not ready or contacts disabled)
    NoOp,
}

impl FilterResult {
    #[must_use]
    pub fn show_apps(items: Vec<LaunchTarget>) -> Self {
        Self::ShowList {
            items: ListItems::Apps(items),
        }
    }

    #[must_use]
    pub fn show_contacts(items: Vec<ContactEntry>) -> Self {
        Self::ShowList {
            items: ListItems::Contacts(items),
        }
    }

    #[must_use]
    pub fn items(&self) -> Option<&ListItems> {
        match self {
            Self::ShowList { items } => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// A resolved, launchable activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchHandle {
    /// Fully qualified `package/class`
    pub component: String,
    pub profile: ProfileId,
}

/// Implicit system actions resolved to whatever app handles them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DefaultAction {
    WebSearch { query: String },
    Calendar,
    Clock,
}

impl fmt::Display for DefaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSearch { .. } => f.write_str("web search"),
            Self::Calendar => f.write_str("calendar"),
            Self::Clock => f.write_str("clock"),
        }
    }
}

/// One-shot, user-visible notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// Rename or bind was attempted with a blank label
    EmptyLabel,

    /// Tapped a slot that has nothing bound
    EmptySlot { index: usize },

    /// Shortcut editing is locked
    ShortcutsLocked,

    /// A bound target could not be resolved (usually uninstalled)
    LaunchFailed { target: String },

    /// No installed app handles a default action
    NoDefaultApp { action: DefaultAction },
}

impl Notice {
    /// Short text suitable for a toast
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyLabel => "Name can't be empty".to_string(),
            Self::EmptySlot { .. } => "Long press to set a shortcut".to_string(),
            Self::ShortcutsLocked => "Shortcuts are locked".to_string(),
            Self::LaunchFailed { target } => format!("Couldn't launch {target}"),
            Self::NoDefaultApp { action } => format!("No app found for {action}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_equality_ignores_metadata() {
        let a = LaunchTarget::new("org.calc/.Main", 0, "Calculator");
        let b = LaunchTarget::new("org.calc/.Main", 0, "Calc")
            .with_alias("Sums")
            .with_hidden(true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_target_equality_respects_profile() {
        let personal = LaunchTarget::new("org.mail/.Inbox", 0, "Mail");
        let work = LaunchTarget::new("org.mail/.Inbox", 10, "Mail");
        assert_ne!(personal, work);
    }

    #[test]
    fn test_display_label_prefers_alias() {
        let target = LaunchTarget::new("org.chat/.Main", 0, "WhatsApp");
        assert_eq!(target.display_label(), "WhatsApp");
        let target = target.with_alias("Chat");
        assert_eq!(target.display_label(), "Chat");
    }

    #[test]
    fn test_target_id_package_and_class() {
        let qualified = TargetId::new("org.calc/org.calc.Main", 0);
        assert_eq!(qualified.package(), "org.calc");
        assert_eq!(qualified.class(), Some("org.calc.Main"));

        let bare = TargetId::new("org.calc", 0);
        assert_eq!(bare.package(), "org.calc");
        assert_eq!(bare.class(), None);
    }

    #[test]
    fn test_target_id_display() {
        let id = TargetId::new("org.calc/.Main", 10);
        assert_eq!(id.to_string(), "org.calc/.Main@10");
        assert!(id.is_work_profile());
    }

    #[test]
    fn test_target_ref_serializes_tagged() {
        let app = TargetRef::app("org.calc/.Main", 10);
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["kind"], "app");
        assert_eq!(json["profile"], 10);
        assert!(app.is_work_profile());

        let contact = TargetRef::contact(42);
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["kind"], "contact");
        assert_eq!(json["contact_id"], 42);
        assert!(!contact.is_work_profile());
        assert!(contact.target_id().is_none());
    }

    #[test]
    fn test_slot_defaults_to_empty() {
        let slot: ShortcutSlot = serde_json::from_str(r#"{"state":"empty"}"#).unwrap();
        assert_eq!(slot, ShortcutSlot::Empty);
        assert!(!slot.is_bound());
        assert!(slot.label().is_none());
    }

    #[test]
    fn test_bound_slot_accessors() {
        let slot = ShortcutSlot::Bound {
            label: "Phone".to_string(),
            target: TargetRef::app("org.dialer", 0),
        };
        assert!(slot.is_bound());
        assert_eq!(slot.label(), Some("Phone"));
        assert_eq!(slot.target(), Some(&TargetRef::app("org.dialer", 0)));
    }

    #[test]
    fn test_launch_target_deserializes_flat() {
        let target: LaunchTarget = serde_json::from_str(
            r#"{"component":"org.calc/.Main","profile":0,"label":"Calculator"}"#,
        )
        .unwrap();
        assert_eq!(target.component(), "org.calc/.Main");
        assert!(!target.hidden);
        assert!(target.alias.is_none());
    }

    #[test]
    fn test_filter_result_helpers() {
        let result = FilterResult::show_apps(vec![LaunchTarget::new("a", 0, "A")]);
        assert_eq!(result.items().map(ListItems::len), Some(1));
        assert!(!result.is_noop());
        assert!(FilterResult::NoOp.is_noop());
        assert!(FilterResult::NoOp.items().is_none());
    }

    #[test]
    fn test_notice_messages() {
        let notice = Notice::NoDefaultApp {
            action: DefaultAction::Calendar,
        };
        assert_eq!(notice.message(), "No app found for calendar");
        let notice = Notice::LaunchFailed {
            target: "Maps".to_string(),
        };
        assert!(notice.message().contains("Maps"));
    }
}
