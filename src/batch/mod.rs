//! Batch conversion: jobs, their lifecycle, and the coordinator that runs them in order.
//!
//! A [`BatchRequest`](request::BatchRequest) owns its jobs. The
//! [`BatchCoordinator`](coordinator::BatchCoordinator) drives them one at a time and returns a
//! [`BatchReport`](report::BatchReport) whose outcomes follow job index order.

/// Groups incoming documents into per-submitter batches.
pub mod collector;
/// Sequential batch execution.
pub mod coordinator;
/// Jobs, their states and outcomes.
pub mod job;
/// Bounded concurrent execution of independent batches.
pub mod pool;
/// Progress snapshots, status sinks and cancellation.
pub mod progress;
/// Batch results and user-facing summaries.
pub mod report;
/// Batch construction and aggregate status.
pub mod request;
