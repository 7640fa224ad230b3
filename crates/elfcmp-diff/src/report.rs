//! The aggregate comparison report.

use std::fmt;

use elfcmp_types::{FieldValue, Segment, Side};
use serde::Serialize;

use crate::blocks::BlocksDiff;
use crate::data::DataComparison;
use crate::delta::Delta;
use crate::grouped_diff::GroupedDiff;
use crate::record_diff::RecordDiff;
use crate::set_diff::SetDiff;

/// Diff of two header records (file, section or segment headers).
pub type HeaderDiff = RecordDiff<String, FieldValue>;

/// Sections reconciled by name.
pub type SectionsDiff = SetDiff<String, SectionDiff>;

/// Segments reconciled by type, then by offset rank.
pub type SegmentsDiff = GroupedDiff<String, Segment, HeaderDiff>;

/// Comparison of one section present in both files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionDiff {
    pub header: HeaderDiff,
    pub data: DataComparison,
}

impl Delta for SectionDiff {
    fn is_empty(&self) -> bool {
        self.header.is_empty() && self.data.is_empty()
    }

    fn reversed(self) -> Self {
        Self {
            header: self.header.reversed(),
            data: self.data.reversed(),
        }
    }
}

/// Kind of entity an identity warning refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Section,
    Segment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section => write!(f, "section"),
            Self::Segment => write!(f, "segment"),
        }
    }
}

/// Non-fatal findings about the inputs themselves.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffWarning {
    /// Several entities on one side share an identity. Sections resolve
    /// to the last one declared; tied segments keep their table order.
    AmbiguousIdentity {
        side: Side,
        entity: EntityKind,
        identity: String,
    },
}

impl DiffWarning {
    fn reversed(self) -> Self {
        match self {
            Self::AmbiguousIdentity {
                side,
                entity,
                identity,
            } => Self::AmbiguousIdentity {
                side: side.other(),
                entity,
                identity,
            },
        }
    }
}

impl fmt::Display for DiffWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousIdentity {
                side,
                entity,
                identity,
            } => write!(f, "{side}: ambiguous {entity} identity {identity:?}"),
        }
    }
}

/// Everything found when comparing two files.
///
/// The four sub-reports are independent. An empty report is the success
/// path for identical inputs; warnings do not make a report non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub header_diff: HeaderDiff,
    pub sections_diff: SectionsDiff,
    pub segments_diff: SegmentsDiff,
    pub blocks_diff: BlocksDiff,
    /// Sorted by side, then entity, then identity.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DiffWarning>,
}

impl DiffReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Delta for DiffReport {
    fn is_empty(&self) -> bool {
        self.header_diff.is_empty()
            && self.sections_diff.is_empty()
            && self.segments_diff.is_empty()
            && self.blocks_diff.is_empty()
    }

    fn reversed(self) -> Self {
        let mut warnings: Vec<_> = self.warnings.into_iter().map(DiffWarning::reversed).collect();
        warnings.sort();
        Self {
            header_diff: self.header_diff.reversed(),
            sections_diff: self.sections_diff.reversed(),
            segments_diff: self.segments_diff.reversed(),
            blocks_diff: self.blocks_diff.reversed(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_empty() {
        let report = DiffReport::default();
        assert!(report.is_empty());
        assert!(!report.has_warnings());
    }

    #[test]
    fn warnings_do_not_count_as_differences() {
        let report = DiffReport {
            warnings: vec![DiffWarning::AmbiguousIdentity {
                side: Side::Left,
                entity: EntityKind::Section,
                identity: ".text".into(),
            }],
            ..DiffReport::default()
        };
        assert!(report.is_empty());
        assert!(report.has_warnings());
    }

    #[test]
    fn section_diff_empty_needs_both_parts() {
        let mut diff = SectionDiff {
            header: HeaderDiff::new(),
            data: DataComparison::Equal,
        };
        assert!(diff.is_empty());

        diff.data = DataComparison::SizeMismatch { left: 1, right: 2 };
        assert!(!diff.is_empty());
    }

    #[test]
    fn warning_display() {
        let warning = DiffWarning::AmbiguousIdentity {
            side: Side::Right,
            entity: EntityKind::Segment,
            identity: "PT_LOAD@0x0".into(),
        };
        assert_eq!(
            warning.to_string(),
            "right: ambiguous segment identity \"PT_LOAD@0x0\""
        );
    }

    #[test]
    fn reversed_flips_warning_sides() {
        let report = DiffReport {
            warnings: vec![
                DiffWarning::AmbiguousIdentity {
                    side: Side::Left,
                    entity: EntityKind::Section,
                    identity: ".a".into(),
                },
                DiffWarning::AmbiguousIdentity {
                    side: Side::Right,
                    entity: EntityKind::Section,
                    identity: ".b".into(),
                },
            ],
            ..DiffReport::default()
        };

        let sides: Vec<_> = report
            .reversed()
            .warnings
            .iter()
            .map(|DiffWarning::AmbiguousIdentity { side, identity, .. }| (*side, identity.clone()))
            .collect();
        assert_eq!(
            sides,
            vec![(Side::Left, ".b".to_string()), (Side::Right, ".a".to_string())]
        );
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let json = serde_json::to_value(DiffReport::default()).unwrap();
        let object = json.as_object().unwrap();
        for key in ["header_diff", "sections_diff", "segments_diff", "blocks_diff"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("warnings"));
    }
}
