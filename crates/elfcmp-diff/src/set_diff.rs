//! Reconciliation of two entity collections matched by a key.
//!
//! The identity policy lives entirely in the caller's key function; the
//! algorithm itself knows nothing about sections or names.

use std::collections::{BTreeMap, BTreeSet};

use elfcmp_types::Sided;
use serde::Serialize;

use crate::delta::Delta;

/// Result of a keyed set comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetDiff<K, D> {
    pub left_only: BTreeSet<K>,
    pub right_only: BTreeSet<K>,
    /// Per-entity diff for every key present on both sides, including
    /// entities that turned out identical.
    pub common: BTreeMap<K, D>,
    /// Keys that occurred more than once on a side. The last entity with
    /// such a key is the one compared.
    pub duplicates: Sided<BTreeSet<K>>,
}

impl<K, D> Default for SetDiff<K, D> {
    fn default() -> Self {
        Self {
            left_only: BTreeSet::new(),
            right_only: BTreeSet::new(),
            common: BTreeMap::new(),
            duplicates: Sided::new(BTreeSet::new(), BTreeSet::new()),
        }
    }
}

impl<K: Ord, D: Delta> SetDiff<K, D> {
    /// Common entries whose diff is not empty.
    pub fn changed(&self) -> impl Iterator<Item = (&K, &D)> {
        self.common.iter().filter(|(_, d)| !d.is_empty())
    }

    /// Returns `true` if either side had duplicate keys.
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.left.is_empty() || !self.duplicates.right.is_empty()
    }
}

impl<K: Ord, D: Delta> Delta for SetDiff<K, D> {
    /// Duplicates are warnings about the inputs and do not count as a
    /// difference.
    fn is_empty(&self) -> bool {
        self.left_only.is_empty()
            && self.right_only.is_empty()
            && self.common.values().all(Delta::is_empty)
    }

    fn reversed(self) -> Self {
        Self {
            left_only: self.right_only,
            right_only: self.left_only,
            common: self
                .common
                .into_iter()
                .map(|(k, d)| (k, d.reversed()))
                .collect(),
            duplicates: self.duplicates.swapped(),
        }
    }
}

/// Compare two collections whose entities are identified by `key_fn`.
///
/// `diff_fn` is called once for every key present on both sides, with the
/// left entity first.
pub fn diff_named_set<T, K, D>(
    left: &[T],
    right: &[T],
    key_fn: impl Fn(&T) -> K,
    mut diff_fn: impl FnMut(&T, &T) -> D,
) -> SetDiff<K, D>
where
    K: Ord + Clone,
{
    let (left_map, left_dups) = index_by_key(left, &key_fn);
    let (right_map, right_dups) = index_by_key(right, &key_fn);

    let mut diff = SetDiff {
        duplicates: Sided::new(left_dups, right_dups),
        ..SetDiff::default()
    };

    for (key, l) in &left_map {
        match right_map.get(key) {
            Some(r) => {
                diff.common.insert(key.clone(), diff_fn(*l, *r));
            }
            None => {
                diff.left_only.insert(key.clone());
            }
        }
    }
    for key in right_map.keys() {
        if !left_map.contains_key(key) {
            diff.right_only.insert(key.clone());
        }
    }

    diff
}

/// Index entities by key; later entities replace earlier ones.
fn index_by_key<'a, T, K>(
    items: &'a [T],
    key_fn: &impl Fn(&T) -> K,
) -> (BTreeMap<K, &'a T>, BTreeSet<K>)
where
    K: Ord + Clone,
{
    let mut map = BTreeMap::new();
    let mut duplicates = BTreeSet::new();
    for item in items {
        let key = key_fn(item);
        if map.insert(key.clone(), item).is_some() {
            duplicates.insert(key);
        }
    }
    (map, duplicates)
}
