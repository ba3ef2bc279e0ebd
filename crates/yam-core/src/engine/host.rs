use crate::config::{Config, ConfigWatcher, SharedConfig, spawn_config_watcher};
use crate::registry::{Registry, spawn_refresh_loop};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Background work owned by a running host screen.
///
/// Holds the registry refresh loop and, when the core has a config file,
/// the config hot-reload watcher. Dropping the handle cancels everything;
/// [`shutdown`](Self::shutdown) also waits for the loops to exit.
pub struct HostHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    watcher: Option<ConfigWatcher>,
}

impl HostHandle {
    pub(super) fn spawn(
        registry: Arc<Registry>,
        config: SharedConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        let token = CancellationToken::new();
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();

        let watcher = config_path.clone().and_then(|path| {
            spawn_config_watcher(path, reload_tx)
                .inspect_err(|e| error!("Config hot reload disabled: {}", e))
                .ok()
        });

        let task = tokio::spawn(run_host(
            registry,
            config,
            config_path,
            reload_rx,
            token.clone(),
        ));

        Self {
            token,
            task: Some(task),
            watcher,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token cancelled on shutdown; lets callers tie their own work to the
    /// host's lifetime.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the config file is being watched
    #[must_use]
    pub fn is_watching_config(&self) -> bool {
        self.watcher.as_ref().is_some_and(ConfigWatcher::is_running)
    }

    /// Stop issuing new work and wait for the loops and the config watcher
    /// to exit. An enumeration still in flight completes but its result is
    /// discarded.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            error!("Host task failed: {}", e);
        }
        if let Some(watcher) = self.watcher.take()
            && let Err(e) = tokio::task::spawn_blocking(move || watcher.shutdown()).await
        {
            error!("Config watcher shutdown failed: {}", e);
        }
        info!("Host stopped");
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Load `path` and swap it into `shared`. The old config stays on error.
pub(super) fn reload_config_file(shared: &SharedConfig, path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    if *shared.get() == config {
        debug!("Config unchanged after reload");
        return Ok(());
    }
    shared.replace(config);
    info!("Config reloaded");
    Ok(())
}

async fn run_host(
    registry: Arc<Registry>,
    config: SharedConfig,
    config_path: Option<PathBuf>,
    mut reload_rx: mpsc::UnboundedReceiver<()>,
    token: CancellationToken,
) {
    let mut config_rx = config.subscribe();
    let mut current = config.get();
    let mut period = current.registry.refresh_interval();
    let mut refresh = spawn_refresh_loop(Arc::clone(&registry), period, token.child_token());
    let mut reload_open = config_path.is_some();

    loop {
        tokio::select! {
            () = token.cancelled() => break,

            msg = reload_rx.recv(), if reload_open => match (msg, &config_path) {
                (Some(()), Some(path)) => {
                    if let Err(e) = reload_config_file(&config, path) {
                        error!("Failed to reload config: {}", e);
                    }
                }
                _ => {
                    debug!("Config watcher closed");
                    reload_open = false;
                }
            },

            changed = config_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = config_rx.borrow_and_update().clone();

                let next_period = next.registry.refresh_interval();
                if next_period != period {
                    info!("Refresh interval changed to {:?}", next_period);
                    refresh.shutdown().await;
                    period = next_period;
                    refresh = spawn_refresh_loop(Arc::clone(&registry), period, token.child_token());
                }

                if next.apps != current.apps {
                    republish(&registry).await;
                }
                current = next;
            }
        }
    }

    refresh.shutdown().await;
    debug!("Host loop stopped");
}

/// Aliases only change labels, which the refresh diff ignores
async fn republish(registry: &Arc<Registry>) {
    let registry = Arc::clone(registry);
    match tokio::task::spawn_blocking(move || registry.republish()).await {
        Ok(Ok(())) => debug!("Registry republished after app override change"),
        Ok(Err(e)) => debug!("Republish skipped: {}", e),
        Err(e) => error!("Republish task panicked: {}", e),
    }
}
