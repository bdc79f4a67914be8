use chrono::{DateTime, Utc};

use crate::batch::job::{ConversionJob, InputDocument, JobState};

/// Identity of whoever submitted a batch (a chat user id for the sticker bot).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SubmitterId(pub i64);

impl std::fmt::Display for SubmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Aggregate status of a batch, derived from its jobs (or outcomes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStatus {
    /// The batch has no jobs.
    Empty,
    /// No job has started.
    Pending,
    /// Some job has started and some job is not terminal yet.
    Running,
    /// Every job succeeded.
    Completed,
    /// Every job is terminal; some succeeded and some failed.
    PartiallyCompleted,
    /// Every job failed.
    AllFailed,
    /// The run was stopped before every job was started.
    Cancelled,
}

/// Documents submitted together by one submitter, in arrival order.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    submitter: SubmitterId,
    created_at: DateTime<Utc>,
    jobs: Vec<ConversionJob>,
}

impl BatchRequest {
    /// Create a batch; job `i` is the `i`-th document of `docs`.
    pub fn new(submitter: SubmitterId, docs: impl IntoIterator<Item = InputDocument>) -> Self {
        Self::with_created_at(submitter, Utc::now(), docs)
    }

    /// Like [`BatchRequest::new`] with an explicit creation time.
    pub fn with_created_at(
        submitter: SubmitterId,
        created_at: DateTime<Utc>,
        docs: impl IntoIterator<Item = InputDocument>,
    ) -> Self {
        let jobs = docs
            .into_iter()
            .enumerate()
            .map(|(i, doc)| ConversionJob::new(i, doc))
            .collect();
        Self {
            submitter,
            created_at,
            jobs,
        }
    }

    /// Who submitted the batch.
    pub fn submitter(&self) -> SubmitterId {
        self.submitter
    }

    /// When the batch was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Jobs in index order.
    pub fn jobs(&self) -> &[ConversionJob] {
        &self.jobs
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut [ConversionJob] {
        &mut self.jobs
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Return `true` when the batch has no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Status derived from the current job states.
    pub fn status(&self) -> BatchStatus {
        if self.jobs.is_empty() {
            return BatchStatus::Empty;
        }
        if self.jobs.iter().all(|j| *j.state() == JobState::Queued) {
            return BatchStatus::Pending;
        }
        if !self.jobs.iter().all(|j| j.state().is_terminal()) {
            return BatchStatus::Running;
        }
        let done = self
            .jobs
            .iter()
            .filter(|j| *j.state() == JobState::Done)
            .count();
        terminal_status(done, self.jobs.len())
    }
}

/// Status of a batch whose `total` jobs are all terminal, `succeeded` of them successfully.
pub(crate) fn terminal_status(succeeded: usize, total: usize) -> BatchStatus {
    match (succeeded, total) {
        (_, 0) => BatchStatus::Empty,
        (0, _) => BatchStatus::AllFailed,
        (s, t) if s == t => BatchStatus::Completed,
        _ => BatchStatus::PartiallyCompleted,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/request.rs"]
mod tests;
