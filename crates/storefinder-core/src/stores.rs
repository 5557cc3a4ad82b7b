use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-keyword mapping from normalized store identity to its aggregate.
///
/// Ordered by identity so that iteration, and therefore every ranking built
/// on top of it, is deterministic.
pub type StoreMap = BTreeMap<String, StoreAggregate>;

/// A product listed by a storefront, normalized from a raw search item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    /// Title with inline markup removed.
    pub title: String,
    /// Product URL; the product's unique key within its store.
    pub link: String,
    pub image: String,
    /// Lowest listed price as the numeric string the remote API returns.
    pub price: String,
    /// Keywords whose searches surfaced this product, in first-seen order
    /// and without duplicates.
    pub keywords: Vec<String>,
}

impl StoreProduct {
    /// Adds `keyword` unless it is already tagged.
    pub fn tag_keyword(&mut self, keyword: &str) {
        if !self.matched(keyword) {
            self.keywords.push(keyword.to_owned());
        }
    }

    /// Returns `true` if a search for `keyword` surfaced this product.
    #[must_use]
    pub fn matched(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// One storefront and every product collected for it during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAggregate {
    /// Case-folded, trimmed seller name. The business key of the store.
    pub store_id: String,
    /// Seller name in its original casing.
    pub store_name: String,
    /// Products in first-seen order. No two entries share a link.
    pub products: Vec<StoreProduct>,
}

impl StoreAggregate {
    /// Creates an aggregate with no products yet.
    #[must_use]
    pub fn new(store_id: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            store_name: store_name.into(),
            products: Vec::new(),
        }
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn find_product(&self, link: &str) -> Option<&StoreProduct> {
        self.products.iter().find(|p| p.link == link)
    }

    /// Appends `product` unless one with the same link is already present.
    ///
    /// Returns `true` if the product was added.
    pub fn push_unique(&mut self, product: StoreProduct) -> bool {
        if self.find_product(&product.link).is_some() {
            return false;
        }
        self.products.push(product);
        true
    }
}
