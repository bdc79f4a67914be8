use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};

use crate::foundation::error::{ConvertError, ConvertResult};

/// Progress of a batch after one more job reached a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgressSnapshot {
    /// Jobs finished so far (1-based once published).
    pub completed: usize,
    /// Jobs in the batch.
    pub total: usize,
}

impl ProgressSnapshot {
    /// Return `true` once every job of the batch is finished.
    pub fn is_final(&self) -> bool {
        self.completed == self.total
    }
}

/// Consumer of progress snapshots.
///
/// Ordering contract: `publish` is called once per finished job, with `completed` strictly
/// increasing from `1` to the number of jobs run.
pub trait StatusSink: Send {
    /// Receive one snapshot.
    fn publish(&mut self, snapshot: ProgressSnapshot) -> ConvertResult<()>;
}

/// Sink that keeps every snapshot, for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryStatusSink {
    snapshots: Vec<ProgressSnapshot>,
}

impl InMemoryStatusSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots in publication order.
    pub fn snapshots(&self) -> &[ProgressSnapshot] {
        &self.snapshots
    }
}

impl StatusSink for InMemoryStatusSink {
    fn publish(&mut self, snapshot: ProgressSnapshot) -> ConvertResult<()> {
        self.snapshots.push(snapshot);
        Ok(())
    }
}

/// Sink that drops every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn publish(&mut self, _snapshot: ProgressSnapshot) -> ConvertResult<()> {
        Ok(())
    }
}

/// Sink adapter for a closure.
pub struct FnStatusSink<F>(pub F);

impl<F> StatusSink for FnStatusSink<F>
where
    F: FnMut(ProgressSnapshot) + Send,
{
    fn publish(&mut self, snapshot: ProgressSnapshot) -> ConvertResult<()> {
        (self.0)(snapshot);
        Ok(())
    }
}

/// Forwards snapshots over a channel to a task that owns the user-facing status message.
impl StatusSink for mpsc::Sender<ProgressSnapshot> {
    fn publish(&mut self, snapshot: ProgressSnapshot) -> ConvertResult<()> {
        self.send(snapshot)
            .map_err(|_| ConvertError::Other(anyhow::anyhow!("status receiver hung up")))
    }
}

/// Cooperative cancellation flag, checked by the coordinator between jobs.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Jobs already running finish normally.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/progress.rs"]
mod tests;
