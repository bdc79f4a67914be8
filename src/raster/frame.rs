use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::{
    core::Canvas,
    error::{ConvertError, ConvertResult},
};

/// A rasterized frame as RGBA8 pixels.
///
/// Rasterizers produce **premultiplied** alpha; the flag makes this explicit at the boundary
/// between stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RasterFrame {
    /// Wrap a pixel buffer, checking that it holds exactly `width * height` RGBA8 pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> ConvertResult<Self> {
        let canvas = Canvas::new(width, height)
            .map_err(|_| ConvertError::render("frame width/height must be non-zero"))?;
        if data.len() != canvas.rgba8_len() {
            return Err(ConvertError::render(format!(
                "frame buffer holds {} bytes, expected {} for {canvas}",
                data.len(),
                canvas.rgba8_len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Encode the frame as a PNG (straight alpha), optionally flattened over `background`.
    pub fn to_png(&self, background: Option<[u8; 4]>) -> ConvertResult<Vec<u8>> {
        let mut straight = self.data.clone();
        match background {
            Some(bg) => flatten_to_opaque_rgba8(&mut straight, &self.data, self.premultiplied, bg)?,
            None if self.premultiplied => unpremultiply_rgba8_in_place(&mut straight),
            None => {}
        }

        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| ConvertError::encode("frame buffer does not match its dimensions"))?;

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode frame as png")
            .map_err(|e| ConvertError::encode(format!("{e:#}")))?;
        Ok(png)
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ConvertResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ConvertError::encode(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;

        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255(bg_r, inv),
                s[1] as u16 + mul_div255(bg_g, inv),
                s[2] as u16 + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv),
                mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv),
                mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
