//! Positional slot format written by older versions.
//!
//! Each bound slot was a list of strings:
//! `[componentOrUnused, profileOrContactId, label, isContact?]`.
//! Contacts carry their id in the second field.

use thiserror::Error;
use yam_types::{ProfileId, ShortcutSlot, TargetRef};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegacySlotError {
    #[error("expected at least 3 fields, found {0}")]
    TooShort(usize),

    #[error("invalid profile id {0:?}")]
    InvalidProfile(String),

    #[error("invalid contact id {0:?}")]
    InvalidContact(String),

    #[error("empty component")]
    EmptyComponent,

    #[error("empty label")]
    EmptyLabel,
}

/// Convert one legacy entry into a tagged slot.
///
/// # Errors
///
/// Returns an error for entries with missing fields, a blank label or
/// component, or a non-numeric profile or contact id.
pub fn parse_legacy_entry(fields: &[String]) -> Result<ShortcutSlot, LegacySlotError> {
    let [first, second, label, rest @ ..] = fields else {
        return Err(LegacySlotError::TooShort(fields.len()));
    };

    let label = label.trim();
    if label.is_empty() {
        return Err(LegacySlotError::EmptyLabel);
    }

    let is_contact = rest
        .first()
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"));

    let target = if is_contact {
        let contact_id = second
            .trim()
            .parse::<i64>()
            .map_err(|_| LegacySlotError::InvalidContact(second.clone()))?;
        TargetRef::contact(contact_id)
    } else {
        let component = first.trim();
        if component.is_empty() {
            return Err(LegacySlotError::EmptyComponent);
        }
        let profile = second
            .trim()
            .parse::<ProfileId>()
            .map_err(|_| LegacySlotError::InvalidProfile(second.clone()))?;
        TargetRef::app(component, profile)
    };

    Ok(ShortcutSlot::Bound {
        label: label.to_string(),
        target,
    })
}
