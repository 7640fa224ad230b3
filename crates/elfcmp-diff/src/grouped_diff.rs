//! Reconciliation of entities that have no identity of their own.
//!
//! Entities are grouped by a category, ordered by a position key within
//! each group, and paired by rank. Inserting or removing an entity in the
//! middle of a group shifts every later pairing; no sequence alignment is
//! attempted.

use std::collections::{BTreeMap, BTreeSet};

use elfcmp_types::Sided;
use serde::Serialize;

use crate::delta::Delta;

/// Rank-wise comparison of one group present on both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupDiff<T, D> {
    /// Diffs of the entities at rank 0, 1, ... up to the shorter side.
    pub pairs: Vec<D>,
    /// Entities past the shorter side's length, when the left is longer.
    pub left_unmatched: Vec<T>,
    /// Entities past the shorter side's length, when the right is longer.
    pub right_unmatched: Vec<T>,
}

impl<T, D: Delta> Delta for GroupDiff<T, D> {
    fn is_empty(&self) -> bool {
        self.left_unmatched.is_empty()
            && self.right_unmatched.is_empty()
            && self.pairs.iter().all(Delta::is_empty)
    }

    fn reversed(self) -> Self {
        Self {
            pairs: self.pairs.into_iter().map(Delta::reversed).collect(),
            left_unmatched: self.right_unmatched,
            right_unmatched: self.left_unmatched,
        }
    }
}

/// Result of a grouped comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupedDiff<G, T, D> {
    /// Groups found only on the left, with all their entities.
    pub left_only: BTreeMap<G, Vec<T>>,
    pub right_only: BTreeMap<G, Vec<T>>,
    pub common: BTreeMap<G, GroupDiff<T, D>>,
    /// `(group, position)` pairs shared by more than one entity on a side.
    /// Their relative order falls back to input order.
    pub ties: Sided<BTreeSet<(G, u64)>>,
}

impl<G, T, D> Default for GroupedDiff<G, T, D> {
    fn default() -> Self {
        Self {
            left_only: BTreeMap::new(),
            right_only: BTreeMap::new(),
            common: BTreeMap::new(),
            ties: Sided::new(BTreeSet::new(), BTreeSet::new()),
        }
    }
}

impl<G: Ord, T, D: Delta> Delta for GroupedDiff<G, T, D> {
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
                .map(|(g, d)| (g, d.reversed()))
                .collect(),
            ties: self.ties.swapped(),
        }
    }
}

/// Compare two identity-less collections.
///
/// Entities are grouped by `group_fn` and stably sorted by `order_fn`
/// within each group. Groups on both sides are paired rank by rank through
/// `diff_fn`; one-sided groups are reported whole.
pub fn diff_grouped<T, G, D>(
    left: &[T],
    right: &[T],
    group_fn: impl Fn(&T) -> G,
    order_fn: impl Fn(&T) -> u64,
    mut diff_fn: impl FnMut(&T, &T) -> D,
) -> GroupedDiff<G, T, D>
where
    T: Clone,
    G: Ord + Clone,
{
    let (mut left_groups, left_ties) = group_and_sort(left, &group_fn, &order_fn);
    let (mut right_groups, right_ties) = group_and_sort(right, &group_fn, &order_fn);

    let mut diff = GroupedDiff {
        ties: Sided::new(left_ties, right_ties),
        ..GroupedDiff::default()
    };

    while let Some((group, l)) = left_groups.pop_first() {
        let Some(r) = right_groups.remove(&group) else {
            diff.left_only
                .insert(group, l.into_iter().cloned().collect());
            continue;
        };

        let paired = l.len().min(r.len());
        let pairs = l.iter().zip(&r).map(|(a, b)| diff_fn(*a, *b)).collect();
        diff.common.insert(
            group,
            GroupDiff {
                pairs,
                left_unmatched: l[paired..].iter().copied().cloned().collect(),
                right_unmatched: r[paired..].iter().copied().cloned().collect(),
            },
        );
    }
    for (group, r) in right_groups {
        diff.right_only
            .insert(group, r.into_iter().cloned().collect());
    }

    diff
}

type Groups<'a, G, T> = BTreeMap<G, Vec<&'a T>>;

fn group_and_sort<'a, T, G>(
    items: &'a [T],
    group_fn: &impl Fn(&T) -> G,
    order_fn: &impl Fn(&T) -> u64,
) -> (Groups<'a, G, T>, BTreeSet<(G, u64)>)
where
    G: Ord + Clone,
{
    let mut groups: Groups<'a, G, T> = BTreeMap::new();
    for item in items {
        groups.entry(group_fn(item)).or_default().push(item);
    }

    let mut ties = BTreeSet::new();
    for (group, members) in groups.iter_mut() {
        members.sort_by_key(|m| order_fn(*m));
        for pair in members.windows(2) {
            let position = order_fn(pair[0]);
            if position == order_fn(pair[1]) {
                ties.insert((group.clone(), position));
            }
        }
    }
    (groups, ties)
}
