/// Convenience result type used across svg2tgs.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Top-level error taxonomy used by the conversion APIs.
///
/// Validation rejections are not errors: they are reported as
/// [`ValidationResult::Rejected`](crate::ValidationResult::Rejected) values.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// Invalid [`ConversionConfig`](crate::ConversionConfig) values.
    #[error("config error: {0}")]
    Config(String),

    /// The vector document could not be rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// The animation document could not be embedded, serialized or compressed.
    #[error("encode error: {0}")]
    Encode(String),

    /// A resource (memory for a raster surface) could not be obtained.
    ///
    /// This is the only error class that aborts a whole batch.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    /// Build a [`ConvertError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ConvertError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ConvertError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ConvertError::ResourceExhausted`] value.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Build a [`ConvertError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error must terminate the batch it occurred in.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
