//! The seam between the search controller and whatever produces pages.

use storefinder_core::SortStrategy;

use crate::error::SearchError;
use crate::types::ShoppingResponse;

/// Parameters of a single remote page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub keyword: String,
    /// Items per page (`display`).
    pub page_size: u32,
    /// 1-based offset of the first item (`start`).
    pub start: u32,
    pub sort: SortStrategy,
}

/// A producer of search result pages.
///
/// [`crate::NaverShoppingClient`] is the production implementation; tests
/// script pages in memory.
///
/// All implementations must be `Send + Sync` so a single source can serve
/// concurrent searches.
pub trait PageSource: Send + Sync {
    /// Fetches one page. No retries: a failure is reported as-is.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the page cannot be obtained.
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl std::future::Future<Output = Result<ShoppingResponse, SearchError>> + Send;
}
