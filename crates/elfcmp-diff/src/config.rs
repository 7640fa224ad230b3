use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Tunables for a comparison.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// File header fields left out of `header_diff`.
    pub ignored_header_fields: BTreeSet<String>,
    /// Section header fields left out of each section's header diff.
    pub ignored_section_fields: BTreeSet<String>,
    /// Segment header fields left out of each segment pair's diff.
    pub ignored_segment_fields: BTreeSet<String>,
    /// Pair unused blocks and compare their bytes.
    pub compare_unused_blocks: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            ignored_header_fields: BTreeSet::new(),
            // Offset into the name table; meaningless once matched by name.
            ignored_section_fields: BTreeSet::from(["sh_name".to_string()]),
            ignored_segment_fields: BTreeSet::new(),
            compare_unused_blocks: true,
        }
    }
}

impl DiffConfig {
    /// A configuration that ignores nothing.
    pub fn strict() -> Self {
        Self {
            ignored_section_fields: BTreeSet::new(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> DiffResult<Self> {
        toml::from_str(s).map_err(|e| DiffError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiffError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert!(c.ignored_header_fields.is_empty());
        assert!(c.ignored_section_fields.contains("sh_name"));
        assert!(c.ignored_segment_fields.is_empty());
        assert!(c.compare_unused_blocks);
    }

    #[test]
    fn strict_ignores_nothing() {
        let c = DiffConfig::strict();
        assert!(c.ignored_section_fields.is_empty());
        assert!(c.compare_unused_blocks);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = DiffConfig::from_toml_str(
            r#"
            ignored_header_fields = ["e_entry", "e_flags"]
            compare_unused_blocks = false
            "#,
        )
        .unwrap();
        assert_eq!(c.ignored_header_fields.len(), 2);
        assert!(!c.compare_unused_blocks);
        assert!(c.ignored_section_fields.contains("sh_name"));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DiffConfig::from_toml_str("").unwrap(), DiffConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        match DiffConfig::from_toml_str("compare_everything = true") {
            Err(DiffError::Config(msg)) => assert!(msg.contains("compare_everything")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elfcmp.toml");
        std::fs::write(&path, "ignored_segment_fields = [\"p_align\"]\n").unwrap();

        let c = DiffConfig::from_file(&path).unwrap();
        assert!(c.ignored_segment_fields.contains("p_align"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DiffConfig::from_file(dir.path().join("nope.toml")),
            Err(DiffError::Config(_))
        ));
    }
}
