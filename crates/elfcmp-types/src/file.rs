//! Decoded, immutable views of one binary file.
//!
//! A [`ParsedFile`] is produced once per input by the parsing layer and is
//! read-only from then on. The diff engine only ever borrows it.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind};
use crate::value::Record;

/// A named region of file content.
///
/// Names are not guaranteed unique by the container format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Position in the section header table.
    pub index: usize,
    pub name: String,
    pub header: Record,
    /// The file range described by the header (`sh_offset`, `sh_size`).
    pub block: Block,
    /// `false` for sections that occupy no file bytes (`NULL`, `NOBITS`,
    /// zero-sized).
    pub has_file_data: bool,
}

/// A loader mapping. Carries no identity beyond its type tag and position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the program header table.
    pub index: usize,
    /// Symbolic segment type, e.g. `PT_LOAD`.
    pub kind: String,
    pub header: Record,
    /// The file range mapped by the segment (`p_offset`, `p_filesz`).
    pub block: Block,
}

/// Immutable decoded view of one input file.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    data: Vec<u8>,
    header: Record,
    sections: Vec<Section>,
    segments: Vec<Segment>,
    structure: Vec<Block>,
}

impl ParsedFile {
    /// Assemble a parsed view.
    ///
    /// `structure` holds the blocks owned by format metadata (file header,
    /// header tables). Empty blocks are dropped since they own no bytes.
    pub fn new(
        data: Vec<u8>,
        header: Record,
        sections: Vec<Section>,
        segments: Vec<Segment>,
        structure: Vec<Block>,
    ) -> Self {
        let structure = structure.into_iter().filter(|b| !b.is_empty()).collect();
        Self {
            data,
            header,
            sections,
            segments,
            structure,
        }
    }

    /// Total file size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Blocks owned by format metadata (header and tables).
    pub fn structure(&self) -> &[Block] {
        &self.structure
    }

    /// The bytes covered by `block`, clamped to the file.
    ///
    /// A block reaching past the end of the file yields only its in-file
    /// part; a block starting beyond the end yields an empty slice.
    pub fn bytes(&self, block: &Block) -> &[u8] {
        let len = self.data.len();
        let start = usize::try_from(block.offset).map_or(len, |s| s.min(len));
        let end = usize::try_from(block.end()).map_or(len, |e| e.min(len));
        &self.data[start..end.max(start)]
    }

    /// File content of a section; empty for sections without file data.
    pub fn section_data(&self, section: &Section) -> &[u8] {
        if section.has_file_data {
            self.bytes(&section.block)
        } else {
            &[]
        }
    }

    /// Blocks attributable to byte-owning structural elements.
    ///
    /// This is the structure blocks plus every section with file data.
    /// Segments are excluded: their ranges coincide with or enclose section
    /// ranges, so including them would double-count bytes.
    pub fn used_blocks(&self) -> Vec<Block> {
        self.structure
            .iter()
            .cloned()
            .chain(
                self.sections
                    .iter()
                    .filter(|s| s.has_file_data && !s.block.is_empty())
                    .map(|s| s.block.clone()),
            )
            .collect()
    }
}

impl Section {
    pub fn new(index: usize, name: impl Into<String>, header: Record, offset: u64, size: u64) -> Self {
        let name = name.into();
        let block = Block::new(
            offset,
            size,
            BlockKind::Section {
                index,
                name: name.clone(),
            },
        );
        Self {
            index,
            name,
            header,
            has_file_data: size > 0,
            block,
        }
    }

    /// Mark the section as occupying no file bytes.
    pub fn without_file_data(mut self) -> Self {
        self.has_file_data = false;
        self
    }
}

impl Segment {
    pub fn new(index: usize, kind: impl Into<String>, header: Record, offset: u64, size: u64) -> Self {
        Self {
            index,
            kind: kind.into(),
            header,
            block: Block::new(offset, size, BlockKind::Segment { index }),
        }
    }
}
