//! svg2tgs converts static vector documents into compressed sticker animations.
//!
//! Each document goes through four stages:
//!
//! - [`validate`] checks size, markup and declared canvas
//! - a [`Rasterizer`] renders it into a [`RasterFrame`]
//! - [`build`] wraps the frame into a single-layer [`AnimationDocument`]
//! - [`ContainerEncoder`] serializes and gzips the document
//!
//! [`BatchCoordinator`] runs a [`BatchRequest`] through these stages in order, records per-job
//! failures without stopping, and reports progress to a [`StatusSink`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Batch requests, the coordinator and its helpers.
pub mod batch;
/// Conversion settings.
pub mod config;
/// The compressed container format.
pub mod container;
/// The Lottie animation document.
pub mod lottie;
/// Rasterization of vector documents.
pub mod raster;
/// Input validation.
pub mod validate;

pub use crate::foundation::core::{Canvas, GZIP_MAGIC};
pub use crate::foundation::error::{ConvertError, ConvertResult};

pub use crate::batch::collector::{BatchCollector, DEFAULT_QUIET_WINDOW};
pub use crate::batch::coordinator::BatchCoordinator;
pub use crate::batch::job::{
    ConversionJob, FailureReason, InputDocument, JobOutcome, JobState, Stage, output_filename,
};
pub use crate::batch::pool::{BatchPool, DEFAULT_MAX_CONCURRENT_BATCHES};
pub use crate::batch::progress::{
    CancelToken, FnStatusSink, InMemoryStatusSink, NullStatusSink, ProgressSnapshot, StatusSink,
};
pub use crate::batch::report::BatchReport;
pub use crate::batch::request::{BatchRequest, BatchStatus, SubmitterId};
pub use crate::config::ConversionConfig;
pub use crate::container::tgs::{ContainerEncoder, decode};
pub use crate::lottie::builder::{build, build_over};
pub use crate::lottie::model::AnimationDocument;
pub use crate::raster::frame::RasterFrame;
pub use crate::raster::svg::{Rasterizer, SvgRasterizer, SvgRasterizerOpts};
pub use crate::validate::document::{RejectReason, ValidationResult, validate};
