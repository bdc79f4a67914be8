/// Shared value types and constants.
pub mod core;
/// Error taxonomy.
pub mod error;
