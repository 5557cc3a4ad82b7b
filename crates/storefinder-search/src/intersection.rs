//! Set intersection and union of per-keyword store maps.

use std::collections::BTreeMap;

use storefinder_core::{StoreAggregate, StoreMap};

use crate::aggregate::{merge_into, merge_stores};

/// Stores present in every map, each merged across all maps, ranked by
/// product count (descending).
///
/// An empty slice yields no stores. A single map yields all of its stores,
/// ranked the same way. Ties keep ascending store-identity order.
#[must_use]
pub fn intersect(maps: &[StoreMap]) -> Vec<StoreAggregate> {
    let Some((first, rest)) = maps.split_first() else {
        return Vec::new();
    };

    let mut stores: Vec<StoreAggregate> = first
        .iter()
        .filter_map(|(store_id, store)| {
            rest.iter().try_fold(store.clone(), |acc, map| {
                map.get(store_id).map(|other| merge_stores(&acc, other))
            })
        })
        .collect();

    stores.sort_by(|a, b| b.product_count().cmp(&a.product_count()));
    stores
}

/// Union of all maps with the same merge semantics as [`intersect`].
#[must_use]
pub fn all_stores(maps: &[StoreMap]) -> StoreMap {
    let mut union = StoreMap::new();
    for map in maps {
        merge_into(&mut union, map.clone());
    }
    union
}

/// Number of maps each store identity appears in.
#[must_use]
pub fn count_appearances(maps: &[StoreMap]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for map in maps {
        for store_id in map.keys() {
            *counts.entry(store_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}
