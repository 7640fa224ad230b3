//! Block layout of a single file and its comparison across two files.
//!
//! A file's byte range is split into *used* blocks (file header, both
//! header tables, section contents) and *unused* blocks (the gaps between
//! them). Segments never contribute used blocks: they legitimately span
//! section contents and would hide real gaps.

use elfcmp_types::{Block, ParsedFile, Sided};
use serde::Serialize;
use tracing::debug;

use crate::data::{compare_data, DataComparison};
use crate::delta::Delta;

/// Two used blocks of one file that claim the same bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overlap {
    /// The block that starts first in sweep order.
    pub first: Block,
    pub second: Block,
    /// Start of the shared range.
    pub start: u64,
    /// End (exclusive) of the shared range.
    pub end: u64,
}

impl Overlap {
    /// Number of shared bytes.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

/// The used/unused partition of one file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockLayout {
    /// Used blocks in sweep order (offset, then size).
    pub used: Vec<Block>,
    /// Gaps between used blocks, ascending.
    pub unused: Vec<Block>,
    pub overlaps: Vec<Overlap>,
    pub file_size: u64,
}

impl BlockLayout {
    /// Compute the layout of a decoded file.
    pub fn of(file: &ParsedFile) -> Self {
        compute_blocks(&file.used_blocks(), file.size())
    }

    /// Returns `true` if no used blocks overlap.
    pub fn is_well_formed(&self) -> bool {
        self.overlaps.is_empty()
    }
}

/// Partition `[0, file_size)` given the byte-owning blocks of one file.
///
/// Blocks are swept in `(offset, size)` order. A block starting past the
/// frontier opens an unused gap; a block starting before it is recorded as
/// overlapping every still-active block it intersects. Gaps are clamped to
/// the file, so a header pointing past EOF never yields phantom unused
/// bytes. Zero-sized blocks own no bytes and are ignored.
pub fn compute_blocks(used: &[Block], file_size: u64) -> BlockLayout {
    let mut sorted: Vec<Block> = used.iter().filter(|b| !b.is_empty()).cloned().collect();
    sorted.sort_by_key(|b| (b.offset, b.size));

    let mut unused = Vec::new();
    let mut overlaps = Vec::new();
    let mut active: Vec<&Block> = Vec::new();
    let mut frontier = 0u64;

    for block in &sorted {
        active.retain(|a| a.end() > block.offset);

        if block.offset > frontier {
            let gap_end = block.offset.min(file_size);
            if gap_end > frontier {
                unused.push(Block::unused(frontier, gap_end));
            }
        } else {
            for earlier in &active {
                if let Some((start, end)) = earlier.intersection(block) {
                    overlaps.push(Overlap {
                        first: (*earlier).clone(),
                        second: block.clone(),
                        start,
                        end,
                    });
                }
            }
        }

        frontier = frontier.max(block.end());
        active.push(block);
    }

    if file_size > frontier {
        unused.push(Block::unused(frontier, file_size));
    }

    debug!(
        used = sorted.len(),
        unused = unused.len(),
        overlaps = overlaps.len(),
        file_size,
        "computed block layout"
    );

    BlockLayout {
        used: sorted,
        unused,
        overlaps,
        file_size,
    }
}

/// One positional pair of unused blocks whose bytes differ.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnusedBlockDiff {
    pub left: Block,
    pub right: Block,
    pub data: DataComparison,
}

/// Cross-file comparison of block layouts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlocksDiff {
    pub unused_counts: Sided<usize>,
    /// Unequal unused-block pairs. Only filled when both counts agree.
    pub unused_diffs: Vec<UnusedBlockDiff>,
    /// Self-overlaps of each file, reported as found.
    pub overlaps: Sided<Vec<Overlap>>,
}

impl BlocksDiff {
    /// Returns `true` if unused counts or unused content differ.
    pub fn has_differences(&self) -> bool {
        !self.unused_counts.agree() || !self.unused_diffs.is_empty()
    }

    /// Returns `true` if either file has self-overlapping blocks.
    pub fn has_anomalies(&self) -> bool {
        !self.overlaps.left.is_empty() || !self.overlaps.right.is_empty()
    }
}

impl Delta for BlocksDiff {
    fn is_empty(&self) -> bool {
        !self.has_differences() && !self.has_anomalies()
    }

    fn reversed(self) -> Self {
        Self {
            unused_counts: self.unused_counts.swapped(),
            unused_diffs: self
                .unused_diffs
                .into_iter()
                .map(|d| UnusedBlockDiff {
                    left: d.right,
                    right: d.left,
                    data: d.data.reversed(),
                })
                .collect(),
            overlaps: self.overlaps.swapped(),
        }
    }
}

/// Compare the block layouts of two files.
///
/// Unused blocks are paired by ascending offset only when both files have
/// the same number of them; otherwise only the counts are reported. With
/// `compare_content` off the pairing is skipped entirely.
pub fn diff_blocks(
    left: (&BlockLayout, &ParsedFile),
    right: (&BlockLayout, &ParsedFile),
    compare_content: bool,
) -> BlocksDiff {
    let (left_layout, left_file) = left;
    let (right_layout, right_file) = right;

    let unused_counts = Sided::new(left_layout.unused.len(), right_layout.unused.len());
    let mut unused_diffs = Vec::new();

    if compare_content && unused_counts.agree() {
        for (l, r) in left_layout.unused.iter().zip(&right_layout.unused) {
            let data = compare_data(left_file.bytes(l), right_file.bytes(r));
            if !data.is_empty() {
                unused_diffs.push(UnusedBlockDiff {
                    left: l.clone(),
                    right: r.clone(),
                    data,
                });
            }
        }
    } else if !unused_counts.agree() {
        debug!(
            left = unused_counts.left,
            right = unused_counts.right,
            "unused block counts differ, skipping content pairing"
        );
    }

    BlocksDiff {
        unused_counts,
        unused_diffs,
        overlaps: Sided::new(left_layout.overlaps.clone(), right_layout.overlaps.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elfcmp_types::{BlockKind, Record};

    fn section(index: usize, offset: u64, size: u64) -> Block {
        Block::new(
            offset,
            size,
            BlockKind::Section {
                index,
                name: format!(".s{index}"),
            },
        )
    }

    fn file_with_gap(gap: &[u8]) -> ParsedFile {
        let mut data = vec![0xaa; 8];
        data.extend_from_slice(gap);
        data.extend_from_slice(&[0xbb; 8]);
        let structure = vec![
            Block::new(0, 8, BlockKind::FileHeader),
            Block::new(8 + gap.len() as u64, 8, BlockKind::SectionHeaderTable),
        ];
        ParsedFile::new(data, Record::new(), Vec::new(), Vec::new(), structure)
    }

    #[test]
    fn overlap_and_gap_detection() {
        let used = vec![section(0, 0, 10), section(1, 5, 8), section(2, 20, 5)];
        let layout = compute_blocks(&used, 25);

        assert_eq!(layout.overlaps.len(), 1);
        let overlap = &layout.overlaps[0];
        assert_eq!(overlap.first, used[0]);
        assert_eq!(overlap.second, used[1]);
        assert_eq!((overlap.start, overlap.end), (5, 10));

        assert_eq!(layout.unused, vec![Block::unused(13, 20)]);
        assert_eq!(layout.unused.iter().map(|b| b.size).sum::<u64>(), 7);
    }

    #[test]
    fn overlap_with_several_active_blocks() {
        let used = vec![section(0, 0, 100), section(1, 10, 20), section(2, 15, 5)];
        let layout = compute_blocks(&used, 100);

        let pairs: Vec<_> = layout
            .overlaps
            .iter()
            .map(|o| (o.first.offset, o.second.offset))
            .collect();
        assert_eq!(pairs, vec![(0, 10), (0, 15), (10, 15)]);
        assert!(layout.unused.is_empty());
        assert!(!layout.is_well_formed());
    }

    #[test]
    fn retired_blocks_do_not_overlap() {
        let used = vec![section(0, 0, 100), section(1, 10, 5), section(2, 20, 5)];
        let layout = compute_blocks(&used, 100);

        let pairs: Vec<_> = layout
            .overlaps
            .iter()
            .map(|o| (o.first.offset, o.second.offset))
            .collect();
        assert_eq!(pairs, vec![(0, 10), (0, 20)]);
    }

    #[test]
    fn adjacent_blocks_tile_without_gaps() {
        let used = vec![section(1, 4, 4), section(0, 0, 4)];
        let layout = compute_blocks(&used, 12);

        assert!(layout.overlaps.is_empty());
        assert_eq!(layout.used[0].offset, 0);
        assert_eq!(layout.unused, vec![Block::unused(8, 12)]);
    }

    #[test]
    fn ties_sorted_by_size() {
        let used = vec![section(0, 0, 8), section(1, 0, 4)];
        let layout = compute_blocks(&used, 8);
        assert_eq!(layout.used[0].size, 4);
        assert_eq!(layout.overlaps.len(), 1);
        assert_eq!(layout.overlaps[0].size(), 4);
    }

    #[test]
    fn empty_blocks_ignored() {
        let used = vec![section(0, 0, 4), section(1, 8, 0)];
        let layout = compute_blocks(&used, 12);
        assert_eq!(layout.used.len(), 1);
        assert_eq!(layout.unused, vec![Block::unused(4, 12)]);
    }

    #[test]
    fn blocks_past_eof_clamp_gaps() {
        let used = vec![section(0, 0, 4), section(1, 50, 10)];
        let layout = compute_blocks(&used, 20);
        assert_eq!(layout.unused, vec![Block::unused(4, 20)]);
    }

    #[test]
    fn no_used_blocks_is_one_gap() {
        let layout = compute_blocks(&[], 16);
        assert_eq!(layout.unused, vec![Block::unused(0, 16)]);
        assert!(compute_blocks(&[], 0).unused.is_empty());
    }

    #[test]
    fn equal_gaps_produce_no_diff() {
        let left = file_with_gap(&[0, 0, 0]);
        let right = file_with_gap(&[0, 0, 0]);
        let diff = diff_blocks(
            (&BlockLayout::of(&left), &left),
            (&BlockLayout::of(&right), &right),
            true,
        );
        assert!(diff.is_empty());
        assert_eq!(diff.unused_counts, Sided::new(1, 1));
    }

    #[test]
    fn differing_gap_content_reported() {
        let left = file_with_gap(&[0, 0, 0]);
        let right = file_with_gap(&[0, 7, 0]);
        let diff = diff_blocks(
            (&BlockLayout::of(&left), &left),
            (&BlockLayout::of(&right), &right),
            true,
        );

        assert_eq!(diff.unused_diffs.len(), 1);
        assert_eq!(
            diff.unused_diffs[0].data,
            DataComparison::ContentMismatch { first_difference: 1 }
        );
        assert!(diff.has_differences());
        assert!(!diff.has_anomalies());
    }

    #[test]
    fn differing_gap_sizes_reported() {
        let left = file_with_gap(&[0, 0]);
        let right = file_with_gap(&[0, 0, 0]);
        let diff = diff_blocks(
            (&BlockLayout::of(&left), &left),
            (&BlockLayout::of(&right), &right),
            true,
        );
        assert_eq!(
            diff.unused_diffs[0].data,
            DataComparison::SizeMismatch { left: 2, right: 3 }
        );
    }

    #[test]
    fn unequal_counts_skip_pairing() {
        let left = file_with_gap(&[1]);
        let right = file_with_gap(&[]);
        let diff = diff_blocks(
            (&BlockLayout::of(&left), &left),
            (&BlockLayout::of(&right), &right),
            true,
        );
        assert_eq!(diff.unused_counts, Sided::new(1, 0));
        assert!(diff.unused_diffs.is_empty());
        assert!(diff.has_differences());
    }

    #[test]
    fn content_pairing_can_be_disabled() {
        let left = file_with_gap(&[1]);
        let right = file_with_gap(&[2]);
        let diff = diff_blocks(
            (&BlockLayout::of(&left), &left),
            (&BlockLayout::of(&right), &right),
            false,
        );
        assert!(diff.is_empty());
    }
}
