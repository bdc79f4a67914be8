use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    core::{Canvas, MAX_CANVAS_DIM},
    error::{ConvertError, ConvertResult},
};

/// Immutable conversion settings shared by every job of a batch.
///
/// Pass one value into [`BatchCoordinator::new`](crate::BatchCoordinator::new); nothing in the
/// crate reads process-wide state. Missing JSON fields fall back to [`Default`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// Maximum accepted input size in bytes (inclusive).
    pub max_bytes: usize,
    /// Required declared width of the vector document, in pixels.
    pub required_width: u32,
    /// Required declared height of the vector document, in pixels.
    pub required_height: u32,
    /// Frame rate written into the animation document.
    pub frame_rate: u32,
    /// Animation length in frames.
    pub duration_frames: u32,
    /// gzip compression level, `0..=9`.
    pub compression_level: u32,
    /// Optional opaque backdrop (straight RGBA8) the raster is flattened over before embedding.
    pub background_rgba: Option<[u8; 4]>,
    /// Platform limit for sticker containers. Larger containers are still produced.
    pub sticker_size_limit: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            required_width: 512,
            required_height: 512,
            frame_rate: 60,
            duration_frames: 60,
            compression_level: 9,
            background_rgba: None,
            sticker_size_limit: 64 * 1024,
        }
    }
}

impl ConversionConfig {
    /// Check value ranges.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.required_width == 0 || self.required_height == 0 {
            return Err(ConvertError::config("required width/height must be non-zero"));
        }
        if self.required_width > MAX_CANVAS_DIM || self.required_height > MAX_CANVAS_DIM {
            return Err(ConvertError::config(format!(
                "required size {}x{} exceeds {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM}",
                self.required_width, self.required_height
            )));
        }
        if self.frame_rate == 0 {
            return Err(ConvertError::config("frame rate must be non-zero"));
        }
        if self.duration_frames == 0 {
            return Err(ConvertError::config("duration must be at least one frame"));
        }
        if self.compression_level > 9 {
            return Err(ConvertError::config(format!(
                "compression level must be in 0..=9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// The canvas every accepted document must declare.
    pub fn canvas(&self) -> ConvertResult<Canvas> {
        Canvas::new(self.required_width, self.required_height)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> ConvertResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| ConvertError::serde(format!("parse conversion config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read conversion config '{}'", path.display()))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
