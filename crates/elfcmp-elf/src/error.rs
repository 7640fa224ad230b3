//! Error types for ELF decoding.

use thiserror::Error;

/// Error type for ELF decoding.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input holds no bytes at all.
    #[error("input is empty")]
    Empty,

    /// Invalid magic number at start of file.
    #[error("invalid magic number: expected {expected}, got {actual:02x?}")]
    InvalidMagic {
        expected: &'static str,
        actual: Vec<u8>,
    },

    /// File is too short to contain required data.
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: u64, actual: u64 },

    /// Invalid header or table entry.
    #[error("invalid {kind} at offset {offset:#x}: {reason}")]
    InvalidStructure {
        kind: &'static str,
        offset: u64,
        reason: String,
    },

    /// Integer overflow while computing a table range.
    #[error("integer overflow while parsing {context}")]
    Overflow { context: &'static str },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn invalid_magic(expected: &'static str, actual: &[u8]) -> Self {
        Self::InvalidMagic {
            expected,
            actual: actual.to_vec(),
        }
    }

    pub fn too_short(expected: u64, actual: usize) -> Self {
        Self::TooShort {
            expected,
            actual: actual as u64,
        }
    }

    pub fn invalid_structure(kind: &'static str, offset: u64, reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            kind,
            offset,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for decoding results.
pub type ParseResult<T> = Result<T, ParseError>;
