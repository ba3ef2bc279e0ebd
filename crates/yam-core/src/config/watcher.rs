//! Config file watcher for hot-reload support.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, Watcher};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, error, info};

use crate::{Error, Result};

const RELOAD_SETTLE_DELAY: Duration = Duration::from_millis(100);
const CONFIG_DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

/// Owns the notify watch and the thread that forwards its events.
///
/// Dropping the watch disconnects the event channel, which ends the bridge
/// thread. [`shutdown`](Self::shutdown) also waits for it.
pub struct ConfigWatcher {
    watcher: Option<RecommendedWatcher>,
    bridge: Option<JoinHandle<()>>,
}

impl ConfigWatcher {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.bridge.as_ref().is_some_and(|b| !b.is_finished())
    }

    /// Stop watching and join the bridge thread. Blocks until any pending
    /// settle delay has passed.
    pub fn shutdown(mut self) {
        self.watcher.take();
        if let Some(bridge) = self.bridge.take()
            && bridge.join().is_err()
        {
            error!("Config watcher bridge panicked");
        }
        debug!("Config watcher stopped");
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.watcher.take();
    }
}

/// Watch `config_path` and send `()` on `tx` after each debounced change.
///
/// # Errors
///
/// Returns an error if the config directory cannot be created or watched.
pub fn spawn_config_watcher(
    config_path: PathBuf,
    tx: tokio_mpsc::UnboundedSender<()>,
) -> Result<ConfigWatcher> {
    let Some(parent) = config_path.parent() else {
        return Err(Error::Config(format!(
            "Invalid config path: {}",
            config_path.display()
        )));
    };
    std::fs::create_dir_all(parent)?;

    let (sync_tx, sync_rx) = mpsc::channel::<()>();
    let debounce = Arc::new(StdMutex::new(
        Instant::now()
            .checked_sub(CONFIG_DEBOUNCE_DURATION)
            .unwrap_or_else(Instant::now),
    ));
    let file_name = config_path.file_name().map(std::ffi::OsStr::to_owned);

    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) => match event.kind {
                notify::EventKind::Modify(_) | notify::EventKind::Create(_) => {
                    if event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(std::ffi::OsStr::to_owned) == file_name)
                    {
                        let Ok(mut last_event) = debounce.lock() else {
                            error!("[config_watcher] Debounce mutex poisoned, skipping event");
                            return;
                        };
                        let now = Instant::now();
                        if now.duration_since(*last_event) > CONFIG_DEBOUNCE_DURATION {
                            *last_event = now;
                            let _ = sync_tx.send(());
                        }
                    }
                }
                _ => {}
            },
            Err(e) => {
                error!("Watcher error: {}", e);
            }
        })?;
    watcher.watch(parent, notify::RecursiveMode::NonRecursive)?;
    info!("Watching config directory: {:?}", parent);

    let bridge = std::thread::spawn(move || {
        while sync_rx.recv().is_ok() {
            debug!("Config file changed, sending reload notification");
            std::thread::sleep(RELOAD_SETTLE_DELAY);
            if tx.send(()).is_err() {
                debug!("Config reload receiver dropped, stopping watcher");
                break;
            }
        }
        debug!("Config watcher bridge stopped");
    });

    Ok(ConfigWatcher {
        watcher: Some(watcher),
        bridge: Some(bridge),
    })
}
