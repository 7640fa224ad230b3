use std::collections::BTreeMap;

use elfcmp_diff::{
    compare_data, compute_blocks, diff_grouped, diff_named_set, diff_records, first_difference,
    BlockLayout, DataComparison, Delta, GroupedDiff, RecordDiff,
};
use elfcmp_types::{Block, BlockKind};
use proptest::prelude::*;

fn record() -> impl Strategy<Value = BTreeMap<String, u64>> {
    prop::collection::btree_map("[a-e]{1,2}", 0u64..4, 0..8)
}

/// `(name, content)` pairs drawn from a small name pool so that shared
/// names and duplicates are common.
fn named_items() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    prop::collection::vec(
        ("[abc]", prop::collection::vec(0u8..3, 0..4)),
        0..6,
    )
}

/// `(group, offset, size)` triples with frequent group and offset clashes.
fn grouped_items() -> impl Strategy<Value = Vec<GroupedItem>> {
    prop::collection::vec((0u8..3, 0u64..6, 0u64..4), 0..8)
}

fn used_blocks() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec((0u64..200, 0u64..40), 0..12).prop_map(|ranges| {
        ranges
            .into_iter()
            .enumerate()
            .map(|(index, (offset, size))| {
                Block::new(
                    offset,
                    size,
                    BlockKind::Section {
                        index,
                        name: format!(".s{index}"),
                    },
                )
            })
            .collect()
    })
}

/// Non-overlapping blocks: alternating gap and block lengths from zero.
fn tiled_blocks() -> impl Strategy<Value = (Vec<Block>, u64)> {
    (prop::collection::vec((0u64..10, 1u64..10), 0..10), 0u64..10).prop_map(|(runs, tail)| {
        let mut offset = 0;
        let mut blocks = Vec::new();
        for (gap, size) in runs {
            offset += gap;
            blocks.push(Block::new(offset, size, BlockKind::FileHeader));
            offset += size;
        }
        (blocks, offset + tail)
    })
}

/// Number of distinct file bytes covered by used or unused blocks.
fn covered_bytes(layout: &BlockLayout) -> u64 {
    let mut ranges: Vec<(u64, u64)> = layout
        .used
        .iter()
        .chain(&layout.unused)
        .map(|b| (b.offset.min(layout.file_size), b.end().min(layout.file_size)))
        .filter(|(start, end)| start < end)
        .collect();
    ranges.sort_unstable();

    let mut covered = 0;
    let mut reach = 0;
    for (start, end) in ranges {
        let start = start.max(reach);
        if end > start {
            covered += end - start;
            reach = end;
        }
    }
    covered
}

type GroupedItem = (u8, u64, u64);

fn group_fields(item: &GroupedItem) -> BTreeMap<&'static str, u64> {
    BTreeMap::from([("offset", item.1), ("size", item.2)])
}

fn grouped(
    left: &[GroupedItem],
    right: &[GroupedItem],
) -> GroupedDiff<u8, GroupedItem, RecordDiff<&'static str, u64>> {
    diff_grouped(
        left,
        right,
        |item| item.0,
        |item| item.1,
        |x, y| diff_records(&group_fields(x), &group_fields(y)),
    )
}

proptest! {
    #[test]
    fn record_diff_of_self_is_empty(x in record()) {
        let diff = diff_records(&x, &x);
        prop_assert!(diff.left_only.is_empty());
        prop_assert!(diff.right_only.is_empty());
        prop_assert!(diff.changed.is_empty());
    }

    #[test]
    fn record_diff_is_symmetric(a in record(), b in record()) {
        prop_assert_eq!(diff_records(&a, &b).reversed(), diff_records(&b, &a));
    }

    #[test]
    fn record_diff_partitions_keys(a in record(), b in record()) {
        let diff = diff_records(&a, &b);
        for key in a.keys().chain(b.keys()) {
            let in_a = a.contains_key(key);
            let in_b = b.contains_key(key);
            prop_assert_eq!(diff.left_only.contains(key), in_a && !in_b);
            prop_assert_eq!(diff.right_only.contains(key), in_b && !in_a);
            prop_assert_eq!(
                diff.changed.contains_key(key),
                in_a && in_b && a[key] != b[key]
            );
        }
    }

    #[test]
    fn named_set_diff_is_symmetric(a in named_items(), b in named_items()) {
        let key = |item: &(String, Vec<u8>)| item.0.clone();
        let data = |l: &(String, Vec<u8>), r: &(String, Vec<u8>)| compare_data(&l.1, &r.1);

        prop_assert_eq!(
            diff_named_set(&a, &b, key, data).reversed(),
            diff_named_set(&b, &a, key, data)
        );
    }

    #[test]
    fn named_set_of_self_is_empty(a in named_items()) {
        let diff = diff_named_set(
            &a,
            &a,
            |item| item.0.clone(),
            |l, r| compare_data(&l.1, &r.1),
        );
        prop_assert!(diff.is_empty());
        prop_assert!(diff.common.values().all(|d| *d == DataComparison::Equal));
    }

    #[test]
    fn grouped_diff_is_symmetric(a in grouped_items(), b in grouped_items()) {
        prop_assert_eq!(grouped(&a, &b).reversed(), grouped(&b, &a));
    }

    #[test]
    fn grouped_diff_accounts_for_every_entity(a in grouped_items(), b in grouped_items()) {
        let diff = grouped(&a, &b);

        let left_total: usize = diff.left_only.values().map(Vec::len).sum::<usize>()
            + diff
                .common
                .values()
                .map(|g| g.pairs.len() + g.left_unmatched.len())
                .sum::<usize>();
        let right_total: usize = diff.right_only.values().map(Vec::len).sum::<usize>()
            + diff
                .common
                .values()
                .map(|g| g.pairs.len() + g.right_unmatched.len())
                .sum::<usize>();
        prop_assert_eq!(left_total, a.len());
        prop_assert_eq!(right_total, b.len());
    }

    #[test]
    fn blocks_cover_whole_file(used in used_blocks(), file_size in 0u64..260) {
        let layout = compute_blocks(&used, file_size);
        prop_assert_eq!(covered_bytes(&layout), file_size);

        for gap in &layout.unused {
            prop_assert!(!gap.is_empty());
            prop_assert!(gap.end() <= file_size);
            for block in &layout.used {
                prop_assert!(gap.intersection(block).is_none());
            }
        }
        for pair in layout.unused.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].offset);
        }
    }

    #[test]
    fn reported_overlaps_are_real(used in used_blocks()) {
        let layout = compute_blocks(&used, 256);
        for overlap in &layout.overlaps {
            prop_assert_eq!(
                overlap.first.intersection(&overlap.second),
                Some((overlap.start, overlap.end))
            );
        }
        let overlapping_pairs = used
            .iter()
            .enumerate()
            .flat_map(|(i, a)| used[i + 1..].iter().map(move |b| (a, b)))
            .filter(|(a, b)| a.intersection(b).is_some())
            .count();
        prop_assert_eq!(layout.overlaps.len(), overlapping_pairs);
    }

    #[test]
    fn tiled_blocks_partition_exactly((used, file_size) in tiled_blocks()) {
        let layout = compute_blocks(&used, file_size);
        prop_assert!(layout.overlaps.is_empty());

        let total: u64 = layout.used.iter().chain(&layout.unused).map(|b| b.size).sum();
        prop_assert_eq!(total, file_size);

        let mut all: Vec<_> = layout.used.iter().chain(&layout.unused).collect();
        all.sort_by_key(|b| b.offset);
        let mut expected = 0;
        for block in all {
            prop_assert_eq!(block.offset, expected);
            expected = block.end();
        }
    }

    #[test]
    fn first_difference_matches_linear_scan(
        a in prop::collection::vec(0u8..4, 0..32),
        b in prop::collection::vec(0u8..4, 0..32),
    ) {
        let expected = (0..a.len().min(b.len())).find(|&i| a[i] != b[i]);
        prop_assert_eq!(first_difference(a.iter().copied(), b.iter().copied()), expected);
    }
}
