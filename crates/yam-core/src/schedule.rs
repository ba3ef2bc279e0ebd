//! Periodic background work bound to a cancellation token.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A task that runs `tick` on a fixed period until cancelled.
///
/// Ticks never overlap: a slow tick delays the next one instead of queueing
/// a burst. Dropping the task cancels it.
pub struct PeriodicTask {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn on the current runtime. The first tick fires immediately.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        token: CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tick(task_token.clone()).await;
            }

            debug!("{} stopped", name);
        });

        Self {
            name,
            token,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop scheduling further ticks. An in-flight tick sees the cancelled
    /// token and is expected to discard its result.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::error!("{} task failed: {}", self.name, e);
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(period: Duration) -> (PeriodicTask, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let task = PeriodicTask::spawn("counter", period, CancellationToken::new(), move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_period() {
        let (task, count) = counting_task(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (task, count) = counting_task(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        task.cancel();
        assert!(task.is_cancelled());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let token = CancellationToken::new();
        let task = PeriodicTask::spawn("noop", Duration::from_secs(1), token.clone(), |_| async {});
        assert_eq!(task.name(), "noop");
        drop(task);
        assert!(token.is_cancelled());
    }
}
