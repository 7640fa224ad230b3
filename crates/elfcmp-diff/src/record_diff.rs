//! Record-level diff: compare two field mappings key by key.
//!
//! One generic capability serves the file header, section headers and
//! segment headers alike. Only the value-equality rule is pluggable.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::delta::Delta;

/// The result of comparing two records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordDiff<K, V> {
    /// Keys present only in the left record.
    pub left_only: BTreeSet<K>,
    /// Keys present only in the right record.
    pub right_only: BTreeSet<K>,
    /// Keys present in both with unequal values, as `(left, right)`.
    pub changed: BTreeMap<K, (V, V)>,
}

impl<K, V> Default for RecordDiff<K, V> {
    fn default() -> Self {
        Self {
            left_only: BTreeSet::new(),
            right_only: BTreeSet::new(),
            changed: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> RecordDiff<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of differing keys.
    pub fn len(&self) -> usize {
        self.left_only.len() + self.right_only.len() + self.changed.len()
    }

    /// Drop every trace of the given keys from the diff.
    pub fn without_fields(mut self, ignored: &BTreeSet<K>) -> Self {
        if ignored.is_empty() {
            return self;
        }
        self.left_only.retain(|k| !ignored.contains(k));
        self.right_only.retain(|k| !ignored.contains(k));
        self.changed.retain(|k, _| !ignored.contains(k));
        self
    }
}

impl<K: Ord, V> Delta for RecordDiff<K, V> {
    fn is_empty(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty() && self.changed.is_empty()
    }

    fn reversed(self) -> Self {
        Self {
            left_only: self.right_only,
            right_only: self.left_only,
            changed: self
                .changed
                .into_iter()
                .map(|(k, (l, r))| (k, (r, l)))
                .collect(),
        }
    }
}

/// Compute the diff between two records using `PartialEq` on values.
pub fn diff_records<K, V>(left: &BTreeMap<K, V>, right: &BTreeMap<K, V>) -> RecordDiff<K, V>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    diff_records_by(left, right, |a, b| a == b)
}

/// Compute the diff between two records with a custom value equality.
///
/// Keys only in `left` land in `left_only`, keys only in `right` in
/// `right_only`, and shared keys whose values are not `equal` in `changed`.
pub fn diff_records_by<K, V>(
    left: &BTreeMap<K, V>,
    right: &BTreeMap<K, V>,
    mut equal: impl FnMut(&V, &V) -> bool,
) -> RecordDiff<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    let mut diff = RecordDiff::default();

    for (key, left_val) in left {
        match right.get(key) {
            Some(right_val) => {
                if !equal(left_val, right_val) {
                    diff.changed
                        .insert(key.clone(), (left_val.clone(), right_val.clone()));
                }
            }
            None => {
                diff.left_only.insert(key.clone());
            }
        }
    }

    for key in right.keys() {
        if !left.contains_key(key) {
            diff.right_only.insert(key.clone());
        }
    }

    diff
}
