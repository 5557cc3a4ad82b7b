//! Grouping of classified hits into per-store aggregates, and merging of
//! aggregates collected by different fetches.

use storefinder_core::{StoreAggregate, StoreMap};

use crate::classify::{
    is_reserved_mall_name, is_storefront_item, normalize_store_identity, to_store_product,
};
use crate::types::RawResultItem;

/// Groups the storefront items of one page by store identity.
///
/// Items that are not storefront listings, or whose seller name is empty or
/// the platform's own, are dropped. Within a store, a second item with an
/// already-seen link is ignored.
#[must_use]
pub fn group_by_store(items: &[RawResultItem], keyword: &str) -> StoreMap {
    let mut stores = StoreMap::new();

    for item in items {
        if !is_storefront_item(item) || is_reserved_mall_name(&item.mall_name) {
            continue;
        }

        let store_id = normalize_store_identity(&item.mall_name);
        let store = stores
            .entry(store_id.clone())
            .or_insert_with(|| StoreAggregate::new(store_id, item.mall_name.trim()));
        store.push_unique(to_store_product(item, keyword));
    }

    stores
}

/// Unions two aggregates of the same store.
///
/// Products are keyed by link. A product present on both sides keeps the
/// left copy with the right copy's keywords added; products only on the
/// right are appended in their original order. The store name is taken
/// from `a`.
#[must_use]
pub fn merge_stores(a: &StoreAggregate, b: &StoreAggregate) -> StoreAggregate {
    let mut merged = a.clone();
    absorb(&mut merged, b);
    merged
}

/// Merges every store of `incoming` into `target`, creating stores that
/// `target` has not seen yet.
pub fn merge_into(target: &mut StoreMap, incoming: StoreMap) {
    for (store_id, store) in incoming {
        match target.get_mut(&store_id) {
            Some(existing) => absorb(existing, &store),
            None => {
                target.insert(store_id, store);
            }
        }
    }
}

fn absorb(target: &mut StoreAggregate, other: &StoreAggregate) {
    for product in &other.products {
        match target.products.iter_mut().find(|p| p.link == product.link) {
            Some(existing) => {
                for keyword in &product.keywords {
                    existing.tag_keyword(keyword);
                }
            }
            None => target.products.push(product.clone()),
        }
    }
}
