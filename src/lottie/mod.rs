//! Minimal Lottie animation documents wrapping a single raster frame.

/// Frame-to-document construction.
pub mod builder;
/// Serializable document model.
pub mod model;
