//! Raw byte comparison.

use serde::Serialize;

use crate::delta::Delta;

/// Outcome of comparing two byte regions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataComparison {
    Equal,
    /// Lengths differ; content is not inspected.
    SizeMismatch { left: u64, right: u64 },
    /// Same length, content differs starting at `first_difference`.
    ContentMismatch { first_difference: u64 },
}

impl Delta for DataComparison {
    fn is_empty(&self) -> bool {
        matches!(self, DataComparison::Equal)
    }

    fn reversed(self) -> Self {
        match self {
            DataComparison::SizeMismatch { left, right } => DataComparison::SizeMismatch {
                left: right,
                right: left,
            },
            other => other,
        }
    }
}

/// Index of the first position where the two sequences differ.
///
/// Only the common prefix is compared. Stops at the first mismatch, so at
/// most `index + 1` items are pulled from either side.
pub fn first_difference<L, R>(left: L, right: R) -> Option<usize>
where
    L: IntoIterator<Item = u8>,
    R: IntoIterator<Item = u8>,
{
    left.into_iter().zip(right).position(|(a, b)| a != b)
}

/// Compare two byte regions.
pub fn compare_data(left: &[u8], right: &[u8]) -> DataComparison {
    if left.len() != right.len() {
        return DataComparison::SizeMismatch {
            left: left.len() as u64,
            right: right.len() as u64,
        };
    }
    match first_difference(left.iter().copied(), right.iter().copied()) {
        Some(index) => DataComparison::ContentMismatch {
            first_difference: index as u64,
        },
        None => DataComparison::Equal,
    }
}
