use crate::foundation::error::{ConvertError, ConvertResult};

/// First two bytes of every gzip member (RFC 1952), and therefore of every container.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Largest canvas side, in pixels, that configuration and rasterization accept.
pub const MAX_CANVAS_DIM: u32 = 16_384;

/// Pixel dimensions of a canvas or raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas with non-zero width and height.
    pub fn new(width: u32, height: u32) -> ConvertResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::config("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered by the canvas.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.area() as usize).saturating_mul(4)
    }

    /// Canvas centre in pixel coordinates.
    pub fn center(self) -> [f64; 2] {
        [f64::from(self.width) / 2.0, f64::from(self.height) / 2.0]
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
