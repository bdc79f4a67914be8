//! Rasterization of validated vector documents.

/// Pixel buffers passed between stages.
pub mod frame;
/// The [`Rasterizer`](svg::Rasterizer) seam and its resvg implementation.
pub mod svg;
