//! Drives every differ for one pair of files.

use std::path::Path;

use elfcmp_types::{ParsedFile, Section, Segment, Side, Sided};
use tracing::{debug, info, warn};

use crate::blocks::{diff_blocks, BlockLayout, BlocksDiff};
use crate::config::DiffConfig;
use crate::data::compare_data;
use crate::delta::Delta;
use crate::error::{DiffError, DiffResult};
use crate::grouped_diff::diff_grouped;
use crate::record_diff::diff_records;
use crate::report::{
    DiffReport, DiffWarning, EntityKind, HeaderDiff, SectionDiff, SectionsDiff, SegmentsDiff,
};
use crate::set_diff::diff_named_set;

/// A comparison bound to one pair of decoded files.
///
/// Holds only borrows; build one per comparison and drop it afterwards.
#[derive(Debug, Clone)]
pub struct Comparator<'a> {
    files: Sided<&'a ParsedFile>,
    config: &'a DiffConfig,
}

impl<'a> Comparator<'a> {
    /// Bind two files. Fails if either holds no bytes.
    pub fn new(
        left: &'a ParsedFile,
        right: &'a ParsedFile,
        config: &'a DiffConfig,
    ) -> DiffResult<Self> {
        for (side, file) in [(Side::Left, left), (Side::Right, right)] {
            if file.is_empty() {
                return Err(DiffError::EmptyInput { side });
            }
        }
        Ok(Self {
            files: Sided::new(left, right),
            config,
        })
    }

    /// Run every differ and assemble the report.
    pub fn run(&self) -> DiffReport {
        let header_diff = self.diff_header();
        debug!(changes = header_diff.len(), "compared file headers");

        let sections_diff = self.diff_sections();
        debug!(
            left_only = sections_diff.left_only.len(),
            right_only = sections_diff.right_only.len(),
            common = sections_diff.common.len(),
            "compared sections"
        );

        let segments_diff = self.diff_segments();
        debug!(
            left_only = segments_diff.left_only.len(),
            right_only = segments_diff.right_only.len(),
            common = segments_diff.common.len(),
            "compared segments"
        );

        let blocks_diff = self.diff_blocks();

        let warnings = identity_warnings(&sections_diff, &segments_diff);
        for warning in &warnings {
            warn!(%warning, "ambiguous identity");
        }

        let report = DiffReport {
            header_diff,
            sections_diff,
            segments_diff,
            blocks_diff,
            warnings,
        };
        info!(
            identical = report.is_empty(),
            warnings = report.warnings.len(),
            "comparison finished"
        );
        report
    }

    pub fn diff_header(&self) -> HeaderDiff {
        diff_records(self.files.left.header(), self.files.right.header())
            .without_fields(&self.config.ignored_header_fields)
    }

    pub fn diff_sections(&self) -> SectionsDiff {
        let (left, right) = (self.files.left, self.files.right);
        diff_named_set(
            left.sections(),
            right.sections(),
            |s: &Section| s.name.clone(),
            |l, r| SectionDiff {
                header: diff_records(&l.header, &r.header)
                    .without_fields(&self.config.ignored_section_fields),
                data: compare_data(left.section_data(l), right.section_data(r)),
            },
        )
    }

    pub fn diff_segments(&self) -> SegmentsDiff {
        diff_grouped(
            self.files.left.segments(),
            self.files.right.segments(),
            |s: &Segment| s.kind.clone(),
            |s| s.block.offset,
            |l, r| {
                diff_records(&l.header, &r.header)
                    .without_fields(&self.config.ignored_segment_fields)
            },
        )
    }

    pub fn diff_blocks(&self) -> BlocksDiff {
        let (left, right) = (self.files.left, self.files.right);
        let layouts = Sided::new(BlockLayout::of(left), BlockLayout::of(right));
        diff_blocks(
            (&layouts.left, left),
            (&layouts.right, right),
            self.config.compare_unused_blocks,
        )
    }
}

fn identity_warnings(sections: &SectionsDiff, segments: &SegmentsDiff) -> Vec<DiffWarning> {
    let mut warnings = Vec::new();
    for side in [Side::Left, Side::Right] {
        for name in sections.duplicates.get(side) {
            warnings.push(DiffWarning::AmbiguousIdentity {
                side,
                entity: EntityKind::Section,
                identity: name.clone(),
            });
        }
        for (kind, offset) in segments.ties.get(side) {
            warnings.push(DiffWarning::AmbiguousIdentity {
                side,
                entity: EntityKind::Segment,
                identity: format!("{kind}@{offset:#x}"),
            });
        }
    }
    warnings.sort();
    warnings
}

/// Compare two decoded files with the default configuration.
pub fn compare(left: &ParsedFile, right: &ParsedFile) -> DiffResult<DiffReport> {
    compare_with(left, right, &DiffConfig::default())
}

pub fn compare_with(
    left: &ParsedFile,
    right: &ParsedFile,
    config: &DiffConfig,
) -> DiffResult<DiffReport> {
    Ok(Comparator::new(left, right, config)?.run())
}

/// Decode and compare two raw images.
pub fn compare_bytes(left: Vec<u8>, right: Vec<u8>, config: &DiffConfig) -> DiffResult<DiffReport> {
    let left = decode(Side::Left, left)?;
    let right = decode(Side::Right, right)?;
    compare_with(&left, &right, config)
}

/// Load, decode and compare two files on disk.
pub fn compare_paths(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    config: &DiffConfig,
) -> DiffResult<DiffReport> {
    let left = load(Side::Left, left.as_ref())?;
    let right = load(Side::Right, right.as_ref())?;
    compare_with(&left, &right, config)
}

fn decode(side: Side, data: Vec<u8>) -> DiffResult<ParsedFile> {
    if data.is_empty() {
        return Err(DiffError::EmptyInput { side });
    }
    elfcmp_elf::parse(data).map_err(|source| DiffError::Unparsable { side, source })
}

fn load(side: Side, path: &Path) -> DiffResult<ParsedFile> {
    match elfcmp_elf::load(path) {
        Err(elfcmp_elf::ParseError::Empty) => Err(DiffError::EmptyInput { side }),
        other => other.map_err(|source| DiffError::Unparsable { side, source }),
    }
}
