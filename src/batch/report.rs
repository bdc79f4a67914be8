use chrono::{DateTime, Utc};

use crate::batch::{
    job::{FailureReason, JobOutcome, output_filename},
    request::{BatchStatus, SubmitterId, terminal_status},
};

/// Result of running one batch: outcomes in job index order.
///
/// `outcomes[i]` belongs to `filenames[i]`. When the run was cancelled, `outcomes` covers only the
/// jobs that finished before cancellation was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// Who submitted the batch.
    pub submitter: SubmitterId,
    /// When the batch was created.
    pub created_at: DateTime<Utc>,
    /// Every submitted filename, in index order.
    pub filenames: Vec<String>,
    /// Outcomes of the jobs that ran, in index order.
    pub outcomes: Vec<JobOutcome>,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl BatchReport {
    /// Number of submitted documents.
    pub fn total(&self) -> usize {
        self.filenames.len()
    }

    /// Number of jobs that produced a container.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of jobs that ended in a failure state.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Aggregate status. An all-failed batch is still a normal report, not an error.
    pub fn status(&self) -> BatchStatus {
        if self.cancelled {
            return BatchStatus::Cancelled;
        }
        terminal_status(self.succeeded(), self.total())
    }

    /// `(index, filename, outcome)` for every job that ran.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str, &JobOutcome)> {
        self.filenames
            .iter()
            .zip(&self.outcomes)
            .enumerate()
            .map(|(i, (name, outcome))| (i, name.as_str(), outcome))
    }

    /// `(output filename, container)` for every successful job, in index order.
    pub fn containers(&self) -> impl Iterator<Item = (String, &[u8])> {
        self.entries().filter_map(|(_, name, outcome)| {
            outcome
                .container()
                .map(|bytes| (output_filename(name), bytes))
        })
    }

    /// `(filename, reason)` for every failed job, in index order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FailureReason)> {
        self.entries()
            .filter_map(|(_, name, outcome)| outcome.failure().map(|reason| (name, reason)))
    }

    /// First status line, sent before any job runs.
    pub fn acknowledgement_message(total: usize) -> String {
        format!("🔄 Processing {total} {}...", files(total))
    }

    /// Status line while jobs are running.
    pub fn processing_message(completed: usize, total: usize) -> String {
        format!("🔄 Processing {completed}/{total} {}...", files(total))
    }

    /// Status line once the run is over.
    pub fn completion_message(&self) -> String {
        let (ok, total) = (self.succeeded(), self.total());
        match self.status() {
            BatchStatus::Completed => {
                format!("✅ Done! Successfully converted {ok}/{total} {}.", files(total))
            }
            _ if ok > 0 => format!(
                "⚠️ Partially completed: {ok}/{total} {} converted.",
                files(total)
            ),
            _ => "❌ No files were successfully converted.".to_string(),
        }
    }

    /// One line per failed job, naming the file and a coarse reason.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures()
            .map(|(name, reason)| format!("❌ **{name}**: {}", reason.user_message()))
            .collect()
    }
}

fn files(n: usize) -> &'static str {
    if n > 1 { "files" } else { "file" }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/report.rs"]
mod tests;
