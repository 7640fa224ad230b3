//! Foundation types for elfcmp.
//!
//! This crate provides the data model shared by the parsing layer and the
//! diff engine. Nothing here parses or compares; every type is a plain,
//! immutable description of one decoded binary file.
//!
//! # Key Types
//!
//! - [`Block`] -- Contiguous byte range `[offset, offset + size)` in a file
//! - [`FieldValue`] / [`Record`] -- Header fields keyed by name
//! - [`Section`] -- Named region with a header record and a file block
//! - [`Segment`] -- Identity-less loader mapping with a header record
//! - [`ParsedFile`] -- Immutable decoded view of one input
//! - [`Side`] / [`Sided`] -- Left/right tagging for two-input comparisons

pub mod block;
pub mod file;
pub mod side;
pub mod value;

pub use block::{Block, BlockKind};
pub use file::{ParsedFile, Section, Segment};
pub use side::{Side, Sided};
pub use value::{FieldValue, Record};
