use std::io::{Read as _, Write as _};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};

use crate::{
    foundation::{
        core::GZIP_MAGIC,
        error::{ConvertError, ConvertResult},
    },
    lottie::model::AnimationDocument,
};

/// Serializes animation documents into gzip-compressed JSON containers.
#[derive(Clone, Copy, Debug)]
pub struct ContainerEncoder {
    level: u32,
}

impl Default for ContainerEncoder {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl ContainerEncoder {
    /// Encoder with a fixed gzip level in `0..=9`.
    pub fn new(level: u32) -> ConvertResult<Self> {
        if level > 9 {
            return Err(ConvertError::config(format!(
                "compression level must be in 0..=9, got {level}"
            )));
        }
        Ok(Self { level })
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Serialize `doc` to compact UTF-8 JSON and gzip it.
    ///
    /// The produced bytes always start with [`GZIP_MAGIC`]; anything else is reported as an
    /// internal-consistency [`ConvertError::Encode`].
    #[tracing::instrument(level = "debug", skip(doc), fields(level = self.level))]
    pub fn encode(&self, doc: &AnimationDocument) -> ConvertResult<Vec<u8>> {
        doc.validate()?;

        let json = serde_json::to_vec(doc)
            .map_err(|e| ConvertError::encode(format!("serialize animation document: {e}")))?;

        let mut gz = GzEncoder::new(
            Vec::with_capacity(json.len() / 2),
            Compression::new(self.level),
        );
        gz.write_all(&json)
            .map_err(|e| ConvertError::encode(format!("compress animation document: {e}")))?;
        let out = gz
            .finish()
            .map_err(|e| ConvertError::encode(format!("finish gzip stream: {e}")))?;

        if !out.starts_with(&GZIP_MAGIC) {
            return Err(ConvertError::encode(
                "compressed container is missing the gzip magic header",
            ));
        }

        tracing::debug!(json_bytes = json.len(), container_bytes = out.len(), "encoded container");
        Ok(out)
    }
}

/// Inflate a container and parse the animation document inside it.
pub fn decode(bytes: &[u8]) -> ConvertResult<AnimationDocument> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Err(ConvertError::serde("not a gzip container (bad magic bytes)"));
    }

    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| ConvertError::serde(format!("inflate container: {e}")))?;

    serde_json::from_slice(&json)
        .map_err(|e| ConvertError::serde(format!("parse animation document: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/container/tgs.rs"]
mod tests;
