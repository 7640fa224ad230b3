//! Scalar header field values and field records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single decoded header field.
///
/// Equality is structural: integers compare by value, enumerations by
/// symbolic name, byte strings byte-exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Plain integer (addresses, offsets, sizes, counts, flags).
    Int(u64),
    /// Enumerated value carried by its symbolic name, e.g. `ET_EXEC`.
    Enum(String),
    /// Free-form text.
    Str(String),
    /// Raw byte string.
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Enumerated value, falling back to `PREFIX_0x…` for unknown codes.
    pub fn named(name: Option<&str>, prefix: &str, raw: u64) -> Self {
        match name {
            Some(name) => Self::Enum(name.to_string()),
            None => Self::Enum(format!("{prefix}_{raw:#x}")),
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        Self::Int(value.into())
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Int(value.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v:#x}"),
            Self::Enum(name) => write!(f, "{name}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "{}", hex::encode(b)),
        }
    }
}

/// Mapping from field name to value for one header.
pub type Record = BTreeMap<String, FieldValue>;
