mod host;

pub use host::HostHandle;

use crate::Result;
use crate::config::{Config, Directories, SharedConfig};
use crate::platform::LauncherPlatform;
use crate::registry::{Registry, RegistrySnapshot};
use crate::search::{FilterDispatcher, FilterOutcome, FilterPipeline, FilterRequest};
use crate::shortcuts::{ShortcutStore, SlotLaunch, resolve_target};
use crate::Error;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use yam_types::{
    ActiveView, DefaultAction, FilterResult, LaunchHandle, ShortcutSlot, TargetId, TargetRef,
};

/// Stands in for slots the config allows but the store has not grown to yet
static EMPTY_SLOT: ShortcutSlot = ShortcutSlot::Empty;

/// Core launcher engine.
///
/// Owns the registry, the filter pipeline and the shortcut store, and is
/// the only surface a UI talks to. Methods that reach the platform block;
/// async callers run them on the blocking pool or go through
/// [`submit_filter`](Self::submit_filter).
pub struct YamCore {
    dirs: Option<Directories>,
    config: SharedConfig,
    platform: Arc<dyn LauncherPlatform>,
    registry: Arc<Registry>,
    dispatcher: FilterDispatcher,
    pipeline: Arc<FilterPipeline>,
    shortcuts: ShortcutStore,
    host: Mutex<Option<CancellationToken>>,
}

impl YamCore {
    /// Create a core backed by files under `dirs`.
    ///
    /// A config that fails to load is reported and replaced by defaults, so
    /// a typo never keeps the launcher from starting.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or the slot
    /// file exists but cannot be read.
    pub fn new(platform: Arc<dyn LauncherPlatform>, dirs: Directories) -> Result<Self> {
        dirs.ensure_exists()?;

        let config = match Config::load(&dirs.config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config, using defaults: {}", e);
                Config::default()
            }
        };

        let shortcuts = ShortcutStore::load(&dirs.shortcuts_file, config.shortcuts.capacity)?;

        let mut core = Self::in_memory(platform, config);
        core.shortcuts = shortcuts;
        core.dirs = Some(dirs);
        Ok(core)
    }

    /// Create a core with no backing files
    #[must_use]
    pub fn in_memory(platform: Arc<dyn LauncherPlatform>, config: Config) -> Self {
        let shortcuts = ShortcutStore::new(config.shortcuts.capacity);
        let config = SharedConfig::new(config);
        let registry = Arc::new(Registry::new(Arc::clone(&platform), config.clone()));
        let pipeline = Arc::new(FilterPipeline::new(
            Arc::clone(&registry),
            Arc::clone(&platform),
            config.clone(),
        ));
        let dispatcher = FilterDispatcher::new(Arc::clone(&pipeline));

        Self {
            dirs: None,
            config,
            platform,
            registry,
            dispatcher,
            pipeline,
            shortcuts,
            host: Mutex::new(None),
        }
    }

    /// Start the refresh loop and config hot reload on the current runtime.
    #[must_use]
    pub fn start(&self) -> HostHandle {
        info!("Starting yam core...");
        let config_path = self.dirs.as_ref().map(|d| d.config_file.clone());
        let handle =
            HostHandle::spawn(Arc::clone(&self.registry), self.config.clone(), config_path);
        *self.host.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle.token());
        handle
    }

    /// Whether a started host is still running. The host republishes after
    /// app override changes on its own.
    fn host_running(&self) -> bool {
        self.host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    // Registry

    /// Run one refresh cycle and return the current snapshot. Safe to poll.
    pub fn refresh(&self) -> RegistrySnapshot {
        self.registry.refresh()
    }

    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.current()
    }

    /// Notified whenever a changed snapshot is published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.registry.subscribe()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    // Search

    /// Run one filter pass on the calling thread.
    pub fn filter(&self, request: &FilterRequest) -> FilterResult {
        self.pipeline.filter(request)
    }

    /// Run a filter pass in the background; the outcome arrives on
    /// [`filter_results`](Self::filter_results) unless a newer request
    /// supersedes it.
    pub fn submit_filter(&self, request: FilterRequest) -> u64 {
        self.dispatcher.submit(request)
    }

    #[must_use]
    pub fn filter_results(&self) -> watch::Receiver<Option<FilterOutcome>> {
        self.dispatcher.subscribe()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &FilterDispatcher {
        &self.dispatcher
    }

    /// Candidates offered while binding a slot: hidden targets follow the
    /// `shortcuts.showHidden` setting and auto-launch is suppressed.
    pub fn binding_candidates(&self, query: &str, view: ActiveView) -> FilterResult {
        let request = FilterRequest {
            query: query.to_string(),
            view,
            include_hidden: self.config.get().shortcuts.show_hidden,
            binding_session: true,
        };
        self.pipeline.filter(&request)
    }

    // Shortcuts

    /// # Errors
    ///
    /// Returns `SlotOutOfRange` for an index past `shortcuts.capacity`.
    pub fn shortcut(&self, index: usize) -> Result<&ShortcutSlot> {
        match self.shortcuts.get(index) {
            Err(Error::SlotOutOfRange { .. }) if index < self.slot_capacity() => Ok(&EMPTY_SLOT),
            other => other,
        }
    }

    /// All slots up to the configured capacity
    #[must_use]
    pub fn shortcuts(&self) -> Vec<ShortcutSlot> {
        self.padded_slots(self.slot_capacity())
    }

    /// Slots rendered on the home screen
    #[must_use]
    pub fn visible_shortcuts(&self) -> Vec<ShortcutSlot> {
        let count = self.config.get().shortcuts.visible_count();
        self.padded_slots(count)
    }

    /// # Errors
    ///
    /// See [`ShortcutStore::set`].
    pub fn bind_shortcut(&mut self, index: usize, label: &str, target: TargetRef) -> Result<()> {
        self.sync_slot_capacity();
        self.shortcuts.set(index, label, target)
    }

    /// # Errors
    ///
    /// See [`ShortcutStore::rename`].
    pub fn rename_shortcut(&mut self, index: usize, label: &str) -> Result<()> {
        self.sync_slot_capacity();
        self.shortcuts.rename(index, label)
    }

    /// # Errors
    ///
    /// See [`ShortcutStore::clear`].
    pub fn clear_shortcut(&mut self, index: usize) -> Result<()> {
        self.sync_slot_capacity();
        self.shortcuts.clear(index)
    }

    #[must_use]
    pub fn shortcuts_locked(&self) -> bool {
        self.shortcuts.is_locked()
    }

    /// # Errors
    ///
    /// Returns an error if the lock flag cannot be persisted.
    pub fn set_shortcuts_locked(&mut self, locked: bool) -> Result<()> {
        self.sync_slot_capacity();
        self.shortcuts.set_locked(locked)
    }

    /// Larger of the configured capacity and what the store holds. A lower
    /// configured capacity never hides stored bindings.
    fn slot_capacity(&self) -> usize {
        self.config
            .get()
            .shortcuts
            .capacity
            .max(self.shortcuts.capacity())
    }

    /// Apply a capacity raised by a config edit or reload
    fn sync_slot_capacity(&mut self) {
        let capacity = self.config.get().shortcuts.capacity;
        self.shortcuts.grow_to(capacity);
    }

    fn padded_slots(&self, len: usize) -> Vec<ShortcutSlot> {
        let mut slots = self.shortcuts.visible(len).to_vec();
        slots.resize(len, ShortcutSlot::Empty);
        slots
    }

    /// Resolve a tapped slot. The binding is kept whatever the outcome.
    ///
    /// # Errors
    ///
    /// `SlotNotBound` for an empty slot, `ResolutionFailure` when the app
    /// is gone. Use [`Error::notice`] to turn either into a toast.
    pub fn launch_slot(&self, index: usize) -> Result<SlotLaunch> {
        let slot = self.shortcut(index)?;
        let Some(target) = slot.target() else {
            return Err(Error::SlotNotBound(index));
        };

        let launch = resolve_target(self.platform.as_ref(), target);
        match &launch {
            Ok(resolved) => debug!("Slot {} resolved to {:?}", index, resolved),
            Err(e) => warn!("Slot {} failed to launch: {}", index, e),
        }
        launch
    }

    /// Resolve the handler of an implicit action (web search, calendar,
    /// clock).
    ///
    /// # Errors
    ///
    /// `NoMatchingDefaultApp` if nothing handles it.
    pub fn launch_default(&self, action: &DefaultAction) -> Result<LaunchHandle> {
        match self.platform.resolve_default(action)? {
            Some(handle) => Ok(handle),
            None => {
                warn!("No default app for {}", action);
                Err(Error::NoMatchingDefaultApp(action.clone()))
            }
        }
    }

    // App overrides

    /// Give a target a user alias. Without a running host the snapshot is
    /// republished before this returns; a running host republishes it on
    /// the blocking pool.
    ///
    /// # Errors
    ///
    /// `InvalidLabel` for a blank alias, or an error if the config cannot be
    /// saved.
    pub fn set_alias(&self, id: &TargetId, label: &str) -> Result<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::InvalidLabel);
        }
        self.edit_config(|config| {
            config.apps.set_alias(id, label);
            true
        })?;
        info!("Alias for {} set to {:?}", id, label);
        Ok(())
    }

    /// Returns whether an alias was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved.
    pub fn clear_alias(&self, id: &TargetId) -> Result<bool> {
        self.edit_config(|config| config.apps.clear_alias(id))
    }

    /// Returns whether the hidden set changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved.
    pub fn set_hidden(&self, id: &TargetId, hidden: bool) -> Result<bool> {
        self.edit_config(|config| config.apps.set_hidden(id, hidden))
    }

    fn edit_config(&self, edit: impl FnOnce(&mut Config) -> bool) -> Result<bool> {
        let current = self.config.get();
        let mut next = (*current).clone();
        if !edit(&mut next) || next == *current {
            return Ok(false);
        }

        if let Some(dirs) = &self.dirs {
            next.save(&dirs.config_file)?;
        }
        let apps_changed = next.apps != current.apps;
        self.config.replace(next);

        // A running host republishes off the caller's thread
        if apps_changed && !self.host_running() && let Err(e) = self.registry.republish() {
            debug!("Republish skipped: {}", e);
        }
        Ok(true)
    }

    // Config

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        self.config.get()
    }

    /// Apply a settings change, save it, and hand it to the running loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved; nothing changes then.
    pub fn update_config(&self, edit: impl FnOnce(&mut Config)) -> Result<()> {
        self.edit_config(|config| {
            edit(config);
            true
        })?;
        Ok(())
    }

    #[must_use]
    pub fn dirs(&self) -> Option<&Directories> {
        self.dirs.as_ref()
    }

    /// Reload config from file (for hot-reload support). A core without
    /// backing files has nothing to reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or contains
    /// invalid JSON. The previous config stays in effect.
    pub fn reload_config(&self) -> Result<()> {
        match &self.dirs {
            Some(dirs) => host::reload_config_file(&self.config, &dirs.config_file),
            None => Ok(()),
        }
    }
}
