use std::sync::Arc;

use crate::{
    batch::{
        job::{ConversionJob, FailureReason, JobOutcome, JobState},
        progress::{CancelToken, ProgressSnapshot, StatusSink},
        report::BatchReport,
        request::BatchRequest,
    },
    config::ConversionConfig,
    container::tgs::ContainerEncoder,
    foundation::error::ConvertResult,
    lottie::builder,
    raster::svg::Rasterizer,
    validate::document::{ValidationResult, validate},
};

/// Runs the jobs of a batch through validation, rasterization, building and encoding.
///
/// Jobs run one after another in index order. A failed job never stops the batch; only
/// [`ConvertError::ResourceExhausted`](crate::ConvertError::ResourceExhausted) does. The
/// coordinator holds no per-batch state, so one instance can serve several batches at once.
#[derive(Clone)]
pub struct BatchCoordinator {
    config: ConversionConfig,
    encoder: ContainerEncoder,
    rasterizer: Arc<dyn Rasterizer>,
}

impl BatchCoordinator {
    /// Create a coordinator with a fixed configuration.
    pub fn new(config: ConversionConfig, rasterizer: Arc<dyn Rasterizer>) -> ConvertResult<Self> {
        config.validate()?;
        let encoder = ContainerEncoder::new(config.compression_level)?;
        Ok(Self {
            config,
            encoder,
            rasterizer,
        })
    }

    /// The configuration every job is checked and built against.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Run every job of `batch`, publishing one snapshot per finished job to `sink`.
    pub fn run(&self, batch: BatchRequest, sink: &mut dyn StatusSink) -> ConvertResult<BatchReport> {
        self.run_with_cancel(batch, sink, &CancelToken::new())
    }

    /// Like [`BatchCoordinator::run`], checking `cancel` before each job.
    ///
    /// On cancellation the report holds the outcomes of the jobs that already finished.
    #[tracing::instrument(
        skip_all,
        fields(submitter = %batch.submitter(), jobs = batch.len())
    )]
    pub fn run_with_cancel(
        &self,
        mut batch: BatchRequest,
        sink: &mut dyn StatusSink,
        cancel: &CancelToken,
    ) -> ConvertResult<BatchReport> {
        let total = batch.len();
        let filenames = batch
            .jobs()
            .iter()
            .map(|j| j.input().filename.clone())
            .collect::<Vec<_>>();
        tracing::info!(total, "batch started");

        let mut outcomes = Vec::with_capacity(total);
        let mut cancelled = false;
        for job in batch.jobs_mut() {
            if cancel.is_cancelled() {
                cancelled = true;
                tracing::info!(
                    completed = outcomes.len(),
                    total,
                    "batch cancelled before job {}",
                    job.index()
                );
                break;
            }

            let outcome = match self.process(job) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(job = job.index(), error = %err, "batch aborted");
                    return Err(err);
                }
            };
            if let Some(reason) = outcome.failure() {
                tracing::warn!(
                    job = job.index(),
                    file = %job.input().filename,
                    kind = reason.kind(),
                    "job failed: {reason}"
                );
            }
            outcomes.push(outcome);

            let snapshot = ProgressSnapshot {
                completed: outcomes.len(),
                total,
            };
            if let Err(err) = sink.publish(snapshot) {
                tracing::warn!(error = %err, "status sink rejected progress snapshot");
            }
        }

        tracing::debug!(jobs = ?batch.status(), "job states after run");
        let report = BatchReport {
            submitter: batch.submitter(),
            created_at: batch.created_at(),
            filenames,
            outcomes,
            cancelled,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            status = ?report.status(),
            "batch finished"
        );
        Ok(report)
    }

    /// Drive one job to a terminal state. `Err` only for the fatal error class.
    fn process(&self, job: &mut ConversionJob) -> ConvertResult<JobOutcome> {
        let cfg = &self.config;

        job.advance(JobState::Validating);
        let verdict = validate(
            &job.input().bytes,
            cfg.max_bytes,
            cfg.required_width,
            cfg.required_height,
        );
        if let ValidationResult::Rejected { reason } = verdict {
            job.advance(JobState::Rejected(reason.clone()));
            return Ok(JobOutcome::Failure {
                reason: FailureReason::Rejected(reason),
            });
        }

        job.advance(JobState::Rasterizing);
        let frame = match self.rasterizer.rasterize(
            &job.input().bytes,
            cfg.required_width,
            cfg.required_height,
        ) {
            Ok(frame) => frame,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                let detail = err.to_string();
                job.advance(JobState::RenderFailed(detail.clone()));
                return Ok(JobOutcome::Failure {
                    reason: FailureReason::Render(detail),
                });
            }
        };

        job.advance(JobState::Building);
        let built = builder::build_over(
            &frame,
            cfg.required_width,
            cfg.required_height,
            cfg.frame_rate,
            cfg.duration_frames,
            cfg.background_rgba,
        );
        drop(frame);

        job.advance(JobState::Encoding);
        match built.and_then(|doc| self.encoder.encode(&doc)) {
            Ok(container) => {
                if container.len() > cfg.sticker_size_limit {
                    tracing::warn!(
                        job = job.index(),
                        size = container.len(),
                        limit = cfg.sticker_size_limit,
                        "container exceeds the sticker size limit"
                    );
                }
                job.advance(JobState::Done);
                Ok(JobOutcome::Success { container })
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                let detail = err.to_string();
                job.advance(JobState::EncodeFailed(detail.clone()));
                Ok(JobOutcome::Failure {
                    reason: FailureReason::Encode(detail),
                })
            }
        }
    }
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("config", &self.config)
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/coordinator.rs"]
mod tests;
