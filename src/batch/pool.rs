use rayon::prelude::*;

use crate::{
    batch::{
        coordinator::BatchCoordinator, progress::StatusSink, report::BatchReport,
        request::BatchRequest,
    },
    foundation::error::{ConvertError, ConvertResult},
};

/// Default number of batches rasterizing at the same time.
pub const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 2;

/// Runs independent batches concurrently on a bounded thread pool.
///
/// Each batch still runs its jobs sequentially through one shared [`BatchCoordinator`]. The bound
/// caps how many raster frames are alive at once.
pub struct BatchPool {
    coordinator: BatchCoordinator,
    pool: rayon::ThreadPool,
    max_concurrent_batches: usize,
}

impl BatchPool {
    /// Create a pool running at most `max_concurrent_batches` batches at a time.
    pub fn new(coordinator: BatchCoordinator, max_concurrent_batches: usize) -> ConvertResult<Self> {
        let pool = build_thread_pool(max_concurrent_batches)?;
        Ok(Self {
            coordinator,
            pool,
            max_concurrent_batches,
        })
    }

    /// Upper bound on concurrently running batches.
    pub fn max_concurrent_batches(&self) -> usize {
        self.max_concurrent_batches
    }

    /// The coordinator shared by every batch.
    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }

    /// Run every batch with its own status sink.
    ///
    /// Results come back in submission order. A fatal error in one batch does not affect the
    /// others.
    #[tracing::instrument(skip_all, fields(batches = batches.len(), max = self.max_concurrent_batches))]
    pub fn run_all(
        &self,
        batches: Vec<(BatchRequest, Box<dyn StatusSink>)>,
    ) -> Vec<ConvertResult<BatchReport>> {
        let coordinator = &self.coordinator;
        self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|(batch, mut sink)| coordinator.run(batch, sink.as_mut()))
                .collect()
        })
    }
}

impl std::fmt::Debug for BatchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPool")
            .field("coordinator", &self.coordinator)
            .field("max_concurrent_batches", &self.max_concurrent_batches)
            .finish()
    }
}

fn build_thread_pool(threads: usize) -> ConvertResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(ConvertError::config("max_concurrent_batches must be >= 1"));
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("svg2tgs-batch-{i}"))
        .build()
        .map_err(|e| {
            ConvertError::resource_exhausted(format!("failed to build batch thread pool: {e}"))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pool.rs"]
mod tests;
