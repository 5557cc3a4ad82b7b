//! Top-level store-intersection search.

use serde::{Deserialize, Serialize};
use storefinder_core::{SearchSettings, StoreAggregate};
use tokio_util::sync::CancellationToken;

use crate::controller::{run_progressive_search, SearchStats};
use crate::error::SearchError;
use crate::intersection::{all_stores, intersect};
use crate::source::PageSource;

/// Result of a store-intersection search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Stores carrying products for every keyword, most products first.
    pub intersection_stores: Vec<StoreAggregate>,
    /// Distinct stores seen for any keyword.
    pub total_stores_found: usize,
    pub keyword_count: usize,
    pub search_stats: SearchStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Finds the stores that sell products matching all `keywords`.
///
/// `keywords` are expected to be validated already (see
/// [`storefinder_core::validate_keywords`]).
///
/// # Errors
///
/// Propagates any error from [`run_progressive_search`].
pub async fn search_stores<S: PageSource>(
    source: &S,
    keywords: &[String],
    settings: &SearchSettings,
    cancel: Option<&CancellationToken>,
) -> Result<SearchOutcome, SearchError> {
    let progress = run_progressive_search(source, keywords, settings, cancel).await?;

    let intersection_stores = intersect(&progress.maps);
    let total_stores_found = all_stores(&progress.maps).len();

    tracing::info!(
        keywords = keywords.len(),
        intersection = intersection_stores.len(),
        total_stores_found,
        api_calls = progress.stats.api_calls,
        pages_searched = progress.stats.pages_searched,
        "store search finished"
    );

    Ok(SearchOutcome {
        intersection_stores,
        total_stores_found,
        keyword_count: keywords.len(),
        search_stats: progress.stats,
        warning: progress.warning,
    })
}
