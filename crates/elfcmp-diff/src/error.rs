//! Error types for the diff crate.

use elfcmp_types::Side;

/// Errors that abort a comparison before any report is built.
///
/// Structural differences are results, never errors.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// An input could not be decoded at all.
    #[error("{side} input could not be parsed: {source}")]
    Unparsable {
        side: Side,
        #[source]
        source: elfcmp_elf::ParseError,
    },

    /// An input holds no bytes.
    #[error("{side} input is empty")]
    EmptyInput { side: Side },

    /// Diff configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
