//! Classification of raw search hits into storefront products.
//!
//! Only listings hosted by the storefront program (smart stores and brand
//! stores) are kept. The store identity comes from the seller name because
//! storefront links do not carry a per-store segment.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use storefinder_core::StoreProduct;

use crate::types::RawResultItem;

/// Host patterns of the storefront program: the primary smart-store domain
/// and the brand-store domain, each optionally behind the mobile `m.` prefix.
/// Matched against the parsed host only, never the path or query.
static STOREFRONT_HOST_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^(?:m\.)?smartstore\.naver\.com$").expect("valid smartstore regex"),
        Regex::new(r"^(?:m\.)?brand\.naver\.com$").expect("valid brand store regex"),
    ]
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Seller name the platform uses for its own price-comparison listings.
pub const FIRST_PARTY_MALL_NAME: &str = "네이버";

/// Returns `true` if `link` is an absolute URL whose host is a smart store
/// or brand store domain.
#[must_use]
pub fn is_storefront_url(link: &str) -> bool {
    let Ok(url) = Url::parse(link.trim()) else {
        return false;
    };
    url.host_str()
        .is_some_and(|host| STOREFRONT_HOST_PATTERNS.iter().any(|re| re.is_match(host)))
}

/// Returns `true` if the item is listed by the storefront program.
///
/// Other marketplaces (open markets, price-comparison catalog pages) are
/// rejected even when they are reachable through the same search.
#[must_use]
pub fn is_storefront_item(item: &RawResultItem) -> bool {
    is_storefront_url(&item.link)
}

/// Canonical store key: trimmed and Unicode lower-cased seller name.
#[must_use]
pub fn normalize_store_identity(mall_name: &str) -> String {
    mall_name.trim().to_lowercase()
}

/// Returns `true` for seller names that do not denote a real third-party
/// storefront (empty, or the platform's own name).
#[must_use]
pub fn is_reserved_mall_name(mall_name: &str) -> bool {
    let trimmed = mall_name.trim();
    trimmed.is_empty() || trimmed == FIRST_PARTY_MALL_NAME
}

/// Removes inline `<tag>` sequences. Not an HTML parser: assumes the
/// well-formed highlight tags the search API emits.
#[must_use]
pub fn strip_markup(raw: &str) -> String {
    MARKUP_TAG.replace_all(raw, "").into_owned()
}

/// Converts a raw hit into a [`StoreProduct`] tagged with `keyword`.
///
/// The displayed price is the low bound of the listing's price range.
#[must_use]
pub fn to_store_product(item: &RawResultItem, keyword: &str) -> StoreProduct {
    StoreProduct {
        title: strip_markup(&item.title),
        link: item.link.clone(),
        image: item.image.clone(),
        price: item.lprice.clone(),
        keywords: vec![keyword.to_owned()],
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
