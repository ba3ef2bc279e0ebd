use super::Registry;
use crate::schedule::PeriodicTask;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

/// Start the background refresh loop.
///
/// Each tick enumerates on the blocking pool and publishes only when the
/// identity sequence changed. A tick that finishes after cancellation
/// discards its result.
pub fn spawn_refresh_loop(
    registry: Arc<Registry>,
    period: Duration,
    token: CancellationToken,
) -> PeriodicTask {
    debug!("Starting registry refresh every {:?}", period);
    PeriodicTask::spawn("registry refresh", period, token, move |token| {
        let registry = Arc::clone(&registry);
        async move {
            refresh_once(registry, &token).await;
        }
    })
}

/// One refresh tick. Returns true if a new snapshot was published.
pub async fn refresh_once(registry: Arc<Registry>, token: &CancellationToken) -> bool {
    let worker = Arc::clone(&registry);
    let enumerated = tokio::task::spawn_blocking(move || worker.enumerate_stamped()).await;

    if token.is_cancelled() {
        trace!("Refresh finished after cancellation, discarding");
        return false;
    }

    match enumerated {
        Ok(Ok((snapshot, basis))) => registry.publish_if_changed(snapshot, &basis),
        Ok(Err(e)) if e.is_transient() => {
            debug!("Registry refresh skipped: {}", e);
            false
        }
        Ok(Err(e)) => {
            warn!("Registry refresh failed: {}", e);
            false
        }
        Err(e) => {
            error!("Registry refresh task panicked: {}", e);
            false
        }
    }
}
