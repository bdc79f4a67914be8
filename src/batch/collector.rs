use std::time::{Duration, Instant};

use crate::batch::{
    job::InputDocument,
    request::{BatchRequest, SubmitterId},
};

/// Quiet period after which a submitter's documents form a batch.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_secs(3);

/// Groups documents arriving one by one into per-submitter batches.
///
/// A submitter's batch is ready once no document from them arrived for the quiet window. Time is
/// passed in by the caller, so the collector never reads a clock.
#[derive(Debug)]
pub struct BatchCollector {
    quiet_window: Duration,
    // Ordered by first arrival.
    pending: Vec<PendingBatch>,
}

#[derive(Debug)]
struct PendingBatch {
    submitter: SubmitterId,
    last_arrival: Instant,
    docs: Vec<InputDocument>,
}

impl Default for BatchCollector {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

impl BatchCollector {
    /// Collector with the given quiet window.
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            pending: Vec::new(),
        }
    }

    /// The configured quiet window.
    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }

    /// Add a document that arrived at `now`, restarting the submitter's quiet window.
    pub fn push(&mut self, submitter: SubmitterId, doc: InputDocument, now: Instant) {
        match self.pending.iter_mut().find(|p| p.submitter == submitter) {
            Some(p) => {
                p.docs.push(doc);
                p.last_arrival = p.last_arrival.max(now);
            }
            None => self.pending.push(PendingBatch {
                submitter,
                last_arrival: now,
                docs: vec![doc],
            }),
        }
        tracing::debug!(%submitter, pending = self.pending.len(), "document collected");
    }

    /// Remove and return every batch whose quiet window has elapsed at `now`.
    pub fn take_ready(&mut self, now: Instant) -> Vec<BatchRequest> {
        let quiet = self.quiet_window;
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| now.saturating_duration_since(p.last_arrival) >= quiet);
        self.pending = waiting;
        ready.into_iter().map(PendingBatch::into_request).collect()
    }

    /// Remove and return every pending batch regardless of its window.
    pub fn flush(&mut self) -> Vec<BatchRequest> {
        self.pending
            .drain(..)
            .map(PendingBatch::into_request)
            .collect()
    }

    /// Earliest instant at which [`BatchCollector::take_ready`] returns something.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .map(|p| p.last_arrival + self.quiet_window)
            .min()
    }

    /// Number of documents waiting.
    pub fn pending_documents(&self) -> usize {
        self.pending.iter().map(|p| p.docs.len()).sum()
    }

    /// Return `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl PendingBatch {
    fn into_request(self) -> BatchRequest {
        BatchRequest::new(self.submitter, self.docs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/collector.rs"]
mod tests;
