use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;
use yam_types::{LaunchTarget, TargetId};

/// Immutable, ordered list of launch targets.
///
/// Order is platform enumeration order and is used as display order. No two
/// entries share an identity. Cloning is cheap; consumers never mutate a
/// snapshot, they ask the registry for a fresh one.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    targets: Arc<[LaunchTarget]>,
}

impl RegistrySnapshot {
    /// Build a snapshot, collapsing duplicate identities to their first
    /// occurrence.
    #[must_use]
    pub fn new(targets: Vec<LaunchTarget>) -> Self {
        let mut seen: HashSet<TargetId> = HashSet::with_capacity(targets.len());
        let targets: Vec<LaunchTarget> = targets
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        Self {
            targets: targets.into(),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LaunchTarget] {
        &self.targets
    }

    #[must_use]
    pub fn find(&self, id: &TargetId) -> Option<&LaunchTarget> {
        self.targets.iter().find(|t| &t.id == id)
    }

    /// Identity sequence, in order
    pub fn ids(&self) -> impl Iterator<Item = &TargetId> {
        self.targets.iter().map(|t| &t.id)
    }

    /// True when both handles point at the same published list
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.targets, &other.targets)
    }
}

impl Deref for RegistrySnapshot {
    type Target = [LaunchTarget];

    fn deref(&self) -> &Self::Target {
        &self.targets
    }
}

impl From<Vec<LaunchTarget>> for RegistrySnapshot {
    fn from(targets: Vec<LaunchTarget>) -> Self {
        Self::new(targets)
    }
}
