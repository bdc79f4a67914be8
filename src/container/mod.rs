//! The compressed sticker container (gzip-wrapped Lottie JSON).

/// Container encoding and decoding.
pub mod tgs;
