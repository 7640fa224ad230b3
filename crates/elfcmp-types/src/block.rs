use std::fmt;

use serde::{Deserialize, Serialize};

/// What a [`Block`] is attributed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// The file header at offset zero.
    FileHeader,
    /// The program (segment) header table.
    ProgramHeaderTable,
    /// The section header table.
    SectionHeaderTable,
    /// File content of one section.
    Section { index: usize, name: String },
    /// File range mapped by one segment.
    Segment { index: usize },
    /// A gap not attributed to any structural element.
    Unused,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileHeader => write!(f, "file header"),
            Self::ProgramHeaderTable => write!(f, "program header table"),
            Self::SectionHeaderTable => write!(f, "section header table"),
            Self::Section { name, .. } => write!(f, "section({name})"),
            Self::Segment { index } => write!(f, "segment#{index}"),
            Self::Unused => write!(f, "unused"),
        }
    }
}

/// A contiguous byte range `[offset, offset + size)` in a binary file.
///
/// Blocks are derived from decoded headers and never mutated afterwards.
/// The end offset saturates at `u64::MAX`, so a malformed header cannot
/// wrap the range around.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub offset: u64,
    pub size: u64,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(offset: u64, size: u64, kind: BlockKind) -> Self {
        Self { offset, size, kind }
    }

    /// An unused (gap) block covering `[start, end)`.
    pub fn unused(start: u64, end: u64) -> Self {
        Self::new(start, end.saturating_sub(start), BlockKind::Unused)
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if `offset` lies within the block.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// The shared range `[start, end)` of two blocks, if it is non-empty.
    pub fn intersection(&self, other: &Block) -> Option<(u64, u64)> {
        let start = self.offset.max(other.offset);
        let end = self.end().min(other.end());
        (start < end).then_some((start, end))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[{:#x}-{:#x})", self.kind, self.offset, self.end())
    }
}
