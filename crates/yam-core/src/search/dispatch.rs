use super::{FilterPipeline, FilterRequest};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, error};
use yam_types::FilterResult;

/// A published filter result and the request it answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub seq: u64,
    pub result: FilterResult,
}

/// Runs filter passes off the interactive context and publishes only the
/// result of the most recently started request.
///
/// Every request gets a sequence number when it is issued. A pass that
/// finishes after a newer request was issued is dropped, even if the newer
/// pass has not completed yet.
#[derive(Clone)]
pub struct FilterDispatcher {
    pipeline: Arc<FilterPipeline>,
    latest: Arc<AtomicU64>,
    superseded: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<FilterOutcome>>>,
}

impl FilterDispatcher {
    #[must_use]
    pub fn new(pipeline: Arc<FilterPipeline>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            pipeline,
            latest: Arc::new(AtomicU64::new(0)),
            superseded: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    /// Issue a new sequence number. Every pass started earlier is now stale.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Publish `result` for `seq` unless a newer request has been issued.
    /// Returns whether it was published.
    pub fn finish(&self, seq: u64, result: FilterResult) -> bool {
        let latest = &self.latest;
        let published = self.tx.send_if_modified(|slot| {
            if latest.load(Ordering::Acquire) != seq {
                return false;
            }
            *slot = Some(FilterOutcome { seq, result });
            true
        });

        if !published {
            self.superseded.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Dropped filter pass {} (latest is {})",
                seq,
                self.latest.load(Ordering::Acquire)
            );
        }
        published
    }

    /// Start a pass for `request` on the blocking pool and return its
    /// sequence number. Must be called from within a tokio runtime.
    pub fn submit(&self, request: FilterRequest) -> u64 {
        let seq = self.begin();
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let pipeline = Arc::clone(&dispatcher.pipeline);
            match tokio::task::spawn_blocking(move || pipeline.filter(&request)).await {
                Ok(result) => {
                    dispatcher.finish(seq, result);
                }
                Err(e) => error!("Filter pass {} panicked: {}", seq, e),
            }
        });

        seq
    }

    /// Receives every published outcome; `None` until the first one
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<FilterOutcome>> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Most recently published outcome
    #[must_use]
    pub fn current(&self) -> Option<FilterOutcome> {
        self.tx.borrow().clone()
    }

    /// Passes dropped because a newer request was issued
    #[must_use]
    pub fn superseded_count(&self) -> u64 {
        self.superseded.load(Ordering::Relaxed)
    }
}
