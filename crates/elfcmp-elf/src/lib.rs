//! ELF decoding layer for elfcmp.
//!
//! Turns raw ELF bytes (32/64-bit, either byte order) into an immutable
//! [`ParsedFile`]: the file header flattened into a field record, every
//! section with its name, header record and file block, every segment with
//! its symbolic type, and the blocks owned by the header tables.
//!
//! Files using extended numbering (more than 0xfeff sections) keep their
//! real counts and name-table index in section header 0; those are
//! resolved before either table is read.
//!
//! Only what decoding needs is validated. Section ranges pointing past the
//! end of the file are kept as-is; the diff engine reads them clamped.
//!
//! [`ElfBuilder`] goes the other way and emits small ELF64 images, which is
//! how the workspace builds its test fixtures.

pub mod builder;
pub mod error;
mod file;
mod header;
mod reader;
mod section;
mod segment;

pub use builder::{ElfBuilder, SectionSpec, SegmentSpec};
pub use elfcmp_types::ParsedFile;
pub use error::{ParseError, ParseResult};
pub use file::{load, parse};
pub use header::{ElfClass, ElfHeader, TableCounts, PN_XNUM, SHN_XINDEX};
pub use reader::Endianness;
pub use section::SectionHeader;
pub use segment::ProgramHeader;
