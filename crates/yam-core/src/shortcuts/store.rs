use super::legacy::parse_legacy_entry;
use crate::utils::now_millis;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use yam_types::{ShortcutSlot, TargetRef};

const SLOT_FILE_VERSION: u32 = 2;

/// On-disk form (version 2)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotFile {
    version: u32,
    #[serde(default)]
    saved_at: u64,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    slots: Vec<ShortcutSlot>,
}

/// Fixed-capacity array of shortcut slots plus the global lock flag.
///
/// The store is the only writer of its file. Every mutation is persisted
/// before it becomes visible; a failed write leaves memory unchanged.
#[derive(Debug)]
pub struct ShortcutStore {
    path: Option<PathBuf>,
    slots: Vec<ShortcutSlot>,
    locked: bool,
}

impl ShortcutStore {
    /// In-memory store, never persisted
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            path: None,
            slots: vec![ShortcutSlot::Empty; capacity],
            locked: false,
        }
    }

    /// Load slots from `path`. A missing or unreadable file yields an empty
    /// store bound to `path`.
    ///
    /// Slots stored beyond `capacity` are kept so that shrinking the
    /// configured capacity never drops bindings.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read.
    pub fn load(path: &Path, capacity: usize) -> Result<Self> {
        let mut store = Self::new(capacity);
        store.path = Some(path.to_path_buf());

        if !path.exists() {
            debug!("Shortcut file not found at {}", path.display());
            return Ok(store);
        }

        let content = std::fs::read_to_string(path)?;
        let (slots, locked) = match parse_slot_file(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse shortcut file {}: {}", path.display(), e);
                set_aside(path);
                return Ok(store);
            }
        };

        if slots.len() > capacity {
            store.slots.resize(slots.len(), ShortcutSlot::Empty);
        }
        for (index, slot) in slots.into_iter().enumerate() {
            store.slots[index] = slot;
        }
        store.locked = locked;

        info!(
            "Loaded {} shortcut slots ({} bound, locked={})",
            store.slots.len(),
            store.slots.iter().filter(|s| s.is_bound()).count(),
            store.locked
        );
        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Extend the store with empty slots up to `capacity`. Never shrinks.
    /// Returns whether slots were added; they are written with the next
    /// mutation.
    pub fn grow_to(&mut self, capacity: usize) -> bool {
        if capacity <= self.slots.len() {
            return false;
        }
        debug!(
            "Growing shortcut slots from {} to {}",
            self.slots.len(),
            capacity
        );
        self.slots.resize(capacity, ShortcutSlot::Empty);
        true
    }

    #[must_use]
    pub fn slots(&self) -> &[ShortcutSlot] {
        &self.slots
    }

    /// The first `count` slots, the ones rendered on the home screen
    #[must_use]
    pub fn visible(&self, count: usize) -> &[ShortcutSlot] {
        &self.slots[..count.min(self.slots.len())]
    }

    /// # Errors
    ///
    /// Returns `SlotOutOfRange` for an index past capacity.
    pub fn get(&self, index: usize) -> Result<&ShortcutSlot> {
        self.slots.get(index).ok_or(Error::SlotOutOfRange {
            index,
            capacity: self.slots.len(),
        })
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bind (or rebind) a slot, replacing whatever it held.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange`, `ShortcutsLocked`, `InvalidLabel` for a blank
    /// label, or an I/O error if persisting fails. The slot is unchanged on
    /// any error.
    pub fn set(&mut self, index: usize, label: &str, target: TargetRef) -> Result<()> {
        self.get(index)?;
        self.ensure_unlocked()?;
        let label = checked_label(label)?;

        self.commit(
            index,
            ShortcutSlot::Bound {
                label: label.to_string(),
                target,
            },
        )?;
        info!("Bound shortcut {} to {:?}", index, label);
        Ok(())
    }

    /// Change the label of a bound slot, keeping its target.
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set), plus `SlotNotBound` for an empty slot.
    pub fn rename(&mut self, index: usize, label: &str) -> Result<()> {
        let current = self.get(index)?;
        self.ensure_unlocked()?;
        let label = checked_label(label)?;

        let Some(target) = current.target().cloned() else {
            return Err(Error::SlotNotBound(index));
        };

        self.commit(
            index,
            ShortcutSlot::Bound {
                label: label.to_string(),
                target,
            },
        )?;
        info!("Renamed shortcut {} to {:?}", index, label);
        Ok(())
    }

    /// Reset a slot to empty. Allowed while locked.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange` or an I/O error if persisting fails.
    pub fn clear(&mut self, index: usize) -> Result<()> {
        if !self.get(index)?.is_bound() {
            return Ok(());
        }
        self.commit(index, ShortcutSlot::Empty)?;
        info!("Cleared shortcut {}", index);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an I/O error if persisting fails; the flag is unchanged then.
    pub fn set_locked(&mut self, locked: bool) -> Result<()> {
        if self.locked == locked {
            return Ok(());
        }
        self.locked = locked;
        if let Err(e) = self.persist() {
            self.locked = !locked;
            return Err(e);
        }
        info!("Shortcuts {}", if locked { "locked" } else { "unlocked" });
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(Error::ShortcutsLocked);
        }
        Ok(())
    }

    fn commit(&mut self, index: usize, slot: ShortcutSlot) -> Result<()> {
        let Some(entry) = self.slots.get_mut(index) else {
            return Err(Error::SlotOutOfRange {
                index,
                capacity: self.slots.len(),
            });
        };
        let previous = std::mem::replace(entry, slot);

        if let Err(e) = self.persist() {
            self.slots[index] = previous;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = SlotFile {
            version: SLOT_FILE_VERSION,
            saved_at: now_millis(),
            locked: self.locked,
            slots: self.slots.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;

        debug!("Saved {} shortcut slots to {}", self.slots.len(), path.display());
        Ok(())
    }
}

/// Move an unreadable slot file to `<name>.bak` so the next save does not
/// overwrite it.
fn set_aside(path: &Path) {
    let backup = path.with_extension("json.bak");
    match std::fs::rename(path, &backup) {
        Ok(()) => warn!("Moved unreadable shortcut file to {}", backup.display()),
        Err(e) => warn!("Failed to move {} aside: {}", path.display(), e),
    }
}

fn checked_label(label: &str) -> Result<&str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidLabel);
    }
    Ok(trimmed)
}

/// Parse either the current tagged format or the legacy positional one.
fn parse_slot_file(content: &str) -> Result<(Vec<ShortcutSlot>, bool)> {
    let value: Value = serde_json::from_str(content)?;

    let is_current = value
        .get("version")
        .and_then(Value::as_u64)
        .is_some_and(|v| v >= u64::from(SLOT_FILE_VERSION));
    if is_current {
        let file: SlotFile = serde_json::from_value(value)?;
        let slots = file
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| validate_slot(index, slot))
            .collect();
        return Ok((slots, file.locked));
    }

    let locked = value
        .get("locked")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let entries = match &value {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(obj) => obj
            .get("slots")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    info!("Migrating {} legacy shortcut entries", entries.len());
    let slots = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| migrate_entry(index, entry))
        .collect();
    Ok((slots, locked))
}

/// Loaded slots hold to the same rules as edited ones
fn validate_slot(index: usize, slot: ShortcutSlot) -> ShortcutSlot {
    match slot {
        ShortcutSlot::Bound { label, target } => match checked_label(&label) {
            Ok(trimmed) => ShortcutSlot::Bound {
                label: trimmed.to_string(),
                target,
            },
            Err(_) => {
                warn!("Shortcut {}: dropping binding with an empty label", index);
                ShortcutSlot::Empty
            }
        },
        ShortcutSlot::Empty => ShortcutSlot::Empty,
    }
}

fn migrate_entry(index: usize, entry: &Value) -> ShortcutSlot {
    let fields: Vec<String> = match entry {
        Value::Null => return ShortcutSlot::Empty,
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => {
            warn!("Shortcut {}: unexpected legacy entry {}", index, other);
            return ShortcutSlot::Empty;
        }
    };

    parse_legacy_entry(&fields).unwrap_or_else(|e| {
        warn!("Shortcut {}: dropping malformed legacy entry: {}", index, e);
        ShortcutSlot::Empty
    })
}
