use base64::Engine as _;

use crate::foundation::{
    core::Canvas,
    error::{ConvertError, ConvertResult},
};

/// Lottie schema version written into every document.
pub const LOTTIE_VERSION: &str = "5.7.4";

/// Prefix of the `p` field of an embedded PNG asset.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Minimal Lottie animation: one embedded image asset shown by one image layer.
///
/// Field names follow the Lottie JSON keys through `serde` renames, so the serialized form is
/// what sticker players expect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationDocument {
    /// Lottie schema version.
    #[serde(rename = "v")]
    pub version: String,
    /// Frames per second.
    #[serde(rename = "fr")]
    pub frame_rate: u32,
    /// First frame (inclusive).
    #[serde(rename = "ip")]
    pub in_point: u32,
    /// Last frame (exclusive).
    #[serde(rename = "op")]
    pub out_point: u32,
    /// Canvas width in pixels.
    #[serde(rename = "w")]
    pub width: u32,
    /// Canvas height in pixels.
    #[serde(rename = "h")]
    pub height: u32,
    /// Display name.
    #[serde(rename = "nm")]
    pub name: String,
    /// 3D flag, always `0`.
    #[serde(rename = "ddd")]
    pub three_d: u8,
    /// Embedded assets. Exactly one for documents built by this crate.
    pub assets: Vec<ImageAsset>,
    /// Layers. Exactly one for documents built by this crate.
    pub layers: Vec<ImageLayer>,
    /// Timeline markers.
    #[serde(default)]
    pub markers: Vec<Marker>,
}

/// An image asset with its payload embedded as a data URI.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageAsset {
    /// Asset id referenced by layers.
    pub id: String,
    /// Image width in pixels.
    #[serde(rename = "w")]
    pub width: u32,
    /// Image height in pixels.
    #[serde(rename = "h")]
    pub height: u32,
    /// Base path; empty for embedded assets.
    #[serde(rename = "u")]
    pub dir: String,
    /// `data:image/png;base64,...` payload.
    #[serde(rename = "p")]
    pub path: String,
    /// Embedded flag, `1` when `path` is a data URI.
    #[serde(rename = "e")]
    pub embedded: u8,
}

/// Image layer (`ty = 2`) showing one asset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageLayer {
    /// 3D flag, always `0`.
    pub ddd: u8,
    /// Layer index.
    #[serde(rename = "ind")]
    pub index: u32,
    /// Layer type, `2` for image layers.
    #[serde(rename = "ty")]
    pub layer_type: u8,
    /// Display name.
    #[serde(rename = "nm")]
    pub name: String,
    /// Id of the shown [`ImageAsset`].
    #[serde(rename = "refId")]
    pub ref_id: String,
    /// Time stretch.
    #[serde(rename = "sr")]
    pub stretch: f64,
    /// Static transform.
    #[serde(rename = "ks")]
    pub transform: LayerTransform,
    /// Auto-orient flag.
    #[serde(rename = "ao")]
    pub auto_orient: u8,
    /// First visible frame.
    #[serde(rename = "ip")]
    pub in_point: u32,
    /// Last visible frame (exclusive).
    #[serde(rename = "op")]
    pub out_point: u32,
    /// Start time offset.
    #[serde(rename = "st")]
    pub start_time: u32,
    /// Blend mode, `0` for normal.
    #[serde(rename = "bm")]
    pub blend_mode: u8,
}

/// Layer transform made of non-animated properties.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerTransform {
    /// Opacity in percent.
    #[serde(rename = "o")]
    pub opacity: StaticValue<f64>,
    /// Rotation in degrees.
    #[serde(rename = "r")]
    pub rotation: StaticValue<f64>,
    /// Position of the anchor on the canvas.
    #[serde(rename = "p")]
    pub position: StaticValue<[f64; 3]>,
    /// Anchor point in asset pixels.
    #[serde(rename = "a")]
    pub anchor: StaticValue<[f64; 3]>,
    /// Scale in percent.
    #[serde(rename = "s")]
    pub scale: StaticValue<[f64; 3]>,
}

/// A non-animated Lottie property (`"a": 0`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StaticValue<T> {
    /// Animated flag, always `0`.
    #[serde(rename = "a")]
    pub animated: u8,
    /// The value.
    #[serde(rename = "k")]
    pub value: T,
    /// Property index used by expressions.
    #[serde(rename = "ix")]
    pub index: u32,
}

impl<T> StaticValue<T> {
    /// A static property with expression index `index`.
    pub fn new(value: T, index: u32) -> Self {
        Self {
            animated: 0,
            value,
            index,
        }
    }
}

/// A named timeline marker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// Marker time in frames.
    #[serde(rename = "tm")]
    pub time: f64,
    /// Comment / name.
    #[serde(rename = "cm")]
    pub comment: String,
    /// Duration in frames.
    #[serde(rename = "dr")]
    pub duration: f64,
}

impl AnimationDocument {
    /// Canvas declared by the document.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Number of frames between `ip` and `op`.
    pub fn duration_frames(&self) -> u32 {
        self.out_point.saturating_sub(self.in_point)
    }

    /// Check the single-asset, single-layer shape.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.frame_rate == 0 {
            return Err(ConvertError::encode("animation frame rate must be non-zero"));
        }
        if self.duration_frames() == 0 {
            return Err(ConvertError::encode("animation must last at least one frame"));
        }
        let [asset] = self.assets.as_slice() else {
            return Err(ConvertError::encode(format!(
                "animation must embed exactly one asset, found {}",
                self.assets.len()
            )));
        };
        let [layer] = self.layers.as_slice() else {
            return Err(ConvertError::encode(format!(
                "animation must have exactly one layer, found {}",
                self.layers.len()
            )));
        };
        if layer.ref_id != asset.id {
            return Err(ConvertError::encode(format!(
                "layer references asset '{}', but the document embeds '{}'",
                layer.ref_id, asset.id
            )));
        }
        Ok(())
    }

    /// Decode the embedded PNG payload of the single asset.
    pub fn embedded_png(&self) -> ConvertResult<Vec<u8>> {
        let asset = self
            .assets
            .first()
            .ok_or_else(|| ConvertError::encode("animation embeds no asset"))?;
        let payload = asset
            .path
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or_else(|| ConvertError::encode("asset is not an embedded png data uri"))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ConvertError::encode(format!("decode embedded png: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lottie/model.rs"]
mod tests;
