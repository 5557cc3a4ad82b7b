//! Response types for the Naver shopping search endpoint (`/v1/search/shop.json`).
//!
//! ## Observed shape
//!
//! ### `title`
//! Contains `<b>` highlight tags around the matched query terms, e.g.
//! `"<b>프로틴</b> 쉐이커 700ml"`. Stripped during classification.
//!
//! ### `link`
//! Storefront products point at `smartstore.naver.com/main/products/{id}` or
//! `brand.naver.com/{brand}/products/{id}`. The `main` segment is the same for
//! every store, so the link does not identify the store; `mallName` does.
//!
//! ### `lprice` / `hprice`
//! Numeric strings. `hprice` is frequently `""` when there is a single price.
//!
//! ### `mallName`
//! The seller's display name. Price-comparison catalog entries use the
//! platform's own name (`"네이버"`) instead of a real seller.
//!
//! ### `productType`
//! A numeric code string (`"1"`..`"12"`) describing catalog/general/used
//! listings. Not used for classification; the link domain is authoritative.
//!
//! Any string field may be absent on older listings; every field defaults
//! to `""` so a sparse item still deserializes.

use serde::{Deserialize, Serialize};

/// One page of results from the shopping search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingResponse {
    #[serde(default)]
    pub last_build_date: String,
    /// Total matches the remote service reports for the query.
    #[serde(default)]
    pub total: u64,
    /// Echo of the 1-based `start` offset that was requested.
    #[serde(default)]
    pub start: u32,
    /// Echo of the `display` page size that was requested.
    #[serde(default)]
    pub display: u32,
    #[serde(default)]
    pub items: Vec<RawResultItem>,
}

/// A single search hit, exactly as the remote API returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawResultItem {
    /// Raw title; may contain inline markup.
    pub title: String,
    pub link: String,
    pub image: String,
    /// Lowest listed price.
    pub lprice: String,
    /// Highest listed price, often empty.
    pub hprice: String,
    pub mall_name: String,
    pub product_id: String,
    pub product_type: String,
    pub brand: String,
    pub maker: String,
    pub category1: String,
    pub category2: String,
    pub category3: String,
    pub category4: String,
}
