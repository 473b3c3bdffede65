//! Reciprocal rank fusion.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use koi_core::models::{Branch, Fused, FusedRow, Triple};

/// Fuse ranked lists. The item at 0-indexed rank `i` contributes
/// `1 / (k + i + 1)`; each branch counts once per key with its best
/// contribution. Output is sorted by score descending, then key, so it does
/// not depend on list order.
pub fn fuse<T, K, F>(lists: &[(Branch, Vec<T>)], k: u32, key_of: F) -> Vec<Fused<T>>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    struct Acc<T> {
        item: T,
        item_branch: Branch,
        best: BTreeMap<Branch, f64>,
    }

    let mut acc: BTreeMap<K, Acc<T>> = BTreeMap::new();
    for (branch, items) in lists {
        for (rank, item) in items.iter().enumerate() {
            let contribution = 1.0 / (f64::from(k) + rank as f64 + 1.0);
            match acc.entry(key_of(item)) {
                Entry::Vacant(slot) => {
                    slot.insert(Acc {
                        item: item.clone(),
                        item_branch: *branch,
                        best: BTreeMap::from([(*branch, contribution)]),
                    });
                }
                Entry::Occupied(mut slot) => {
                    let a = slot.get_mut();
                    let best = a.best.entry(*branch).or_insert(contribution);
                    if contribution > *best {
                        *best = contribution;
                    }
                    if *branch < a.item_branch {
                        a.item = item.clone();
                        a.item_branch = *branch;
                    }
                }
            }
        }
    }

    let mut fused: Vec<(K, Fused<T>)> = acc
        .into_iter()
        .map(|(key, a)| {
            let score = a.best.values().sum();
            let sources = a.best.into_keys().collect();
            (
                key,
                Fused {
                    item: a.item,
                    score,
                    sources,
                },
            )
        })
        .collect();
    fused.sort_by(|(ka, a), (kb, b)| b.score.total_cmp(&a.score).then_with(|| ka.cmp(kb)));
    fused.into_iter().map(|(_, f)| f).collect()
}

/// Fuse statement lists keyed by `(subject, predicate, object)`.
pub fn fuse_triples(lists: &[(Branch, Vec<Triple>)], k: u32) -> Vec<FusedRow> {
    fuse(lists, k, Triple::key)
}
