//! Structural and dimensional checks run before any rendering work.

/// Document validation.
pub mod document;
