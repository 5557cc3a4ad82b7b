//! Short-lived memoization of single remote pages.
//!
//! Keyed by every parameter that influences a page's content, so an
//! identical request inside the TTL window is served without a remote call.
//! Backed by [`moka`] for async-friendly expiry and bounded capacity.

use std::fmt;
use std::time::Duration;

use moka::future::Cache;
use storefinder_core::SortStrategy;

use crate::source::PageRequest;
use crate::types::ShoppingResponse;

/// Deterministic key derived from (keyword, page size, start, sort).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    keyword: String,
    page_size: u32,
    start: u32,
    sort: SortStrategy,
}

impl CacheKey {
    #[must_use]
    pub fn new(keyword: &str, page_size: u32, start: u32, sort: SortStrategy) -> Self {
        Self {
            keyword: keyword.to_owned(),
            page_size,
            start,
            sort,
        }
    }
}

impl From<&PageRequest> for CacheKey {
    fn from(request: &PageRequest) -> Self {
        Self::new(
            &request.keyword,
            request.page_size,
            request.start,
            request.sort,
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "naver:{}:{}:{}:{}",
            self.keyword, self.page_size, self.start, self.sort
        )
    }
}

/// TTL cache of remote pages, shared by every search in the process.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, ShoppingResponse>,
}

impl ResponseCache {
    /// Creates a cache whose entries expire `ttl` after insertion.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Returns the cached page, or `None` on a miss or expired entry.
    pub async fn get(&self, key: &CacheKey) -> Option<ShoppingResponse> {
        self.inner.get(key).await
    }

    /// Stores `value` under `key`. A later insert for the same key wins.
    pub async fn insert(&self, key: CacheKey, value: ShoppingResponse) {
        self.inner.insert(key, value).await;
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.inner.entry_count())
            .finish_non_exhaustive()
    }
}
