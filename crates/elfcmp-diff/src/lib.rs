//! Structural diff engine for elfcmp.
//!
//! Compares two decoded binaries and produces a [`DiffReport`] made of four
//! independent sub-reports: file header fields, sections, segments and the
//! byte-block layout. Finding differences is never an error; an empty
//! report means the files are structurally identical.
//!
//! # Key Types
//!
//! - [`RecordDiff`] -- Key-wise diff of two field records
//! - [`SetDiff`] -- Reconciliation of entities matched by a key function
//! - [`GroupedDiff`] / [`GroupDiff`] -- Reconciliation of identity-less entities by group and position
//! - [`BlockLayout`] / [`BlocksDiff`] -- Used/unused partition of a file and its cross-file comparison
//! - [`Comparator`] -- Drives all of the above for one pair of files

pub mod blocks;
pub mod compare;
pub mod config;
pub mod data;
pub mod delta;
pub mod error;
pub mod grouped_diff;
pub mod record_diff;
pub mod report;
pub mod set_diff;

pub use blocks::{compute_blocks, diff_blocks, BlockLayout, BlocksDiff, Overlap, UnusedBlockDiff};
pub use compare::{compare, compare_bytes, compare_paths, compare_with, Comparator};
pub use config::DiffConfig;
pub use data::{compare_data, first_difference, DataComparison};
pub use delta::Delta;
pub use error::{DiffError, DiffResult};
pub use grouped_diff::{diff_grouped, GroupDiff, GroupedDiff};
pub use record_diff::{diff_records, diff_records_by, RecordDiff};
pub use report::{DiffReport, DiffWarning, EntityKind, HeaderDiff, SectionDiff, SectionsDiff, SegmentsDiff};
pub use set_diff::{diff_named_set, SetDiff};
