//! Shortcut slots: persisted bindings from fixed home-screen positions to
//! apps or contacts.
//!
//! Slots reference targets by stable identity, not by registry entries, so
//! a binding outlives the app it points at. Resolution happens at launch
//! time and a failure leaves the binding in place.

mod legacy;
mod store;

pub use legacy::{LegacySlotError, parse_legacy_entry};
pub use store::ShortcutStore;

use crate::platform::{LauncherPlatform, PlatformError};
use crate::{Error, Result};
use serde::Serialize;
use tracing::debug;
use yam_types::{LaunchHandle, TargetId, TargetRef};

/// What a tapped slot resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotLaunch {
    App(LaunchHandle),
    Contact { contact_id: i64 },
}

/// Resolve a slot's target through the platform.
///
/// # Errors
///
/// `ResolutionFailure` if the app is no longer installed under its profile,
/// `Unavailable` while the platform is not ready.
pub fn resolve_target(platform: &dyn LauncherPlatform, target: &TargetRef) -> Result<SlotLaunch> {
    match target {
        TargetRef::App { component, profile } => {
            let unresolved = || Error::ResolutionFailure(TargetId::new(component.clone(), *profile));
            match platform.resolve_activity(component, *profile) {
                Ok(Some(handle)) => Ok(SlotLaunch::App(handle)),
                Ok(None) | Err(PlatformError::NotFound(_)) => {
                    debug!("{}@{} no longer resolves", component, profile);
                    Err(unresolved())
                }
                Err(e) => Err(e.into()),
            }
        }
        TargetRef::Contact { contact_id } => Ok(SlotLaunch::Contact {
            contact_id: *contact_id,
        }),
    }
}
