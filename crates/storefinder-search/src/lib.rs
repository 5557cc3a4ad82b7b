pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod client;
pub mod controller;
pub mod error;
pub mod intersection;
pub mod search;
pub mod source;
pub mod types;

pub use aggregate::{group_by_store, merge_into, merge_stores};
pub use cache::{CacheKey, ResponseCache};
pub use classify::{is_storefront_item, is_storefront_url, normalize_store_identity, to_store_product};
pub use client::NaverShoppingClient;
pub use controller::{run_progressive_search, ProgressiveSearch, SearchStats, StopReason};
pub use error::SearchError;
pub use intersection::{all_stores, count_appearances, intersect};
pub use search::{search_stores, SearchOutcome};
pub use source::{PageRequest, PageSource};
pub use types::{RawResultItem, ShoppingResponse};
