use base64::Engine as _;

use crate::{
    foundation::{core::Canvas, error::ConvertResult},
    lottie::model::{
        AnimationDocument, ImageAsset, ImageLayer, LOTTIE_VERSION, LayerTransform,
        PNG_DATA_URI_PREFIX, StaticValue,
    },
    raster::frame::RasterFrame,
};

const ASSET_ID: &str = "image_0";

/// Wrap one frame into a single-asset, single-layer animation document.
///
/// The layer shows the frame for the whole timeline `[0, duration_frames)`. Zero values for
/// `frame_rate` or `duration_frames` are raised to `1`.
pub fn build(
    frame: &RasterFrame,
    width: u32,
    height: u32,
    frame_rate: u32,
    duration_frames: u32,
) -> ConvertResult<AnimationDocument> {
    build_over(frame, width, height, frame_rate, duration_frames, None)
}

/// Like [`build`], flattening the frame over an opaque `background` before embedding it.
///
/// The only failure is the PNG codec rejecting a frame, which cannot happen for frames built by
/// [`RasterFrame::new`].
#[tracing::instrument(level = "debug", skip(frame, background), fields(frame = %frame.canvas()))]
pub fn build_over(
    frame: &RasterFrame,
    width: u32,
    height: u32,
    frame_rate: u32,
    duration_frames: u32,
    background: Option<[u8; 4]>,
) -> ConvertResult<AnimationDocument> {
    let png = frame.to_png(background)?;
    let payload = base64::engine::general_purpose::STANDARD.encode(&png);

    let duration = duration_frames.max(1);
    let canvas = Canvas { width, height };
    let image = frame.canvas();

    let [cx, cy] = canvas.center();
    let [ax, ay] = image.center();
    let sx = 100.0 * f64::from(width) / f64::from(image.width);
    let sy = 100.0 * f64::from(height) / f64::from(image.height);

    Ok(AnimationDocument {
        version: LOTTIE_VERSION.to_string(),
        frame_rate: frame_rate.max(1),
        in_point: 0,
        out_point: duration,
        width,
        height,
        name: "SVG Sticker".to_string(),
        three_d: 0,
        assets: vec![ImageAsset {
            id: ASSET_ID.to_string(),
            width: image.width,
            height: image.height,
            dir: String::new(),
            path: format!("{PNG_DATA_URI_PREFIX}{payload}"),
            embedded: 1,
        }],
        layers: vec![ImageLayer {
            ddd: 0,
            index: 1,
            layer_type: 2,
            name: "SVG Image".to_string(),
            ref_id: ASSET_ID.to_string(),
            stretch: 1.0,
            transform: LayerTransform {
                opacity: StaticValue::new(100.0, 11),
                rotation: StaticValue::new(0.0, 10),
                position: StaticValue::new([cx, cy, 0.0], 2),
                anchor: StaticValue::new([ax, ay, 0.0], 1),
                scale: StaticValue::new([sx, sy, 100.0], 6),
            },
            auto_orient: 0,
            in_point: 0,
            out_point: duration,
            start_time: 0,
            blend_mode: 0,
        }],
        markers: Vec::new(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/lottie/builder.rs"]
mod tests;
