//! Progressive multi-sort search controller.
//!
//! For each configured sort strategy the controller walks the page range in
//! batches. After every batch it merges the batch into the per-keyword store
//! maps and re-computes the intersection; once the intersection reaches the
//! configured minimum, fetching stops for the whole search.
//!
//! Fetches within a batch are sequential: keyword by keyword, page by page.
//! A batch is merged only after every one of its fetches succeeded, so the
//! returned maps always reflect whole batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefinder_core::{FailurePolicy, SearchSettings, SortStrategy, StoreMap};
use tokio_util::sync::CancellationToken;

use crate::aggregate::{group_by_store, merge_into};
use crate::error::SearchError;
use crate::intersection::intersect;
use crate::source::{PageRequest, PageSource};

/// Why the controller stopped fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The intersection reached the configured minimum.
    MinIntersectionReached,
    /// Every strategy ran to its page cap.
    Exhausted,
    /// The caller's cancellation token fired.
    Cancelled,
    /// A fetch failed under [`FailurePolicy::ReturnPartial`].
    RemoteFailure,
}

/// Per-request counters returned with every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Page fetches handed to the page source, cache hits included.
    /// Offsets beyond the remote ceiling are never dispatched.
    pub api_calls: usize,
    /// Page indices fetched by completed batches, counted once per page
    /// regardless of keyword count.
    pub pages_searched: usize,
    pub stop_reason: StopReason,
}

/// Accumulated state of a finished progressive search.
#[derive(Debug, Clone)]
pub struct ProgressiveSearch {
    /// One map per input keyword, in input order.
    pub maps: Vec<StoreMap>,
    pub stats: SearchStats,
    /// Set when the result is known to be degraded (partial after failure).
    pub warning: Option<String>,
}

enum BatchOutcome {
    Complete(Vec<StoreMap>),
    Cancelled,
}

/// Runs the progressive search for `keywords` against `source`.
///
/// Returns whatever maps were accumulated when fetching stopped. A small or
/// empty intersection is a valid result.
///
/// # Errors
///
/// - [`SearchError::InvalidConfig`] if `settings` fail validation.
/// - Any page-source error under [`FailurePolicy::Abort`]; nothing
///   accumulated is returned in that case.
pub async fn run_progressive_search<S: PageSource>(
    source: &S,
    keywords: &[String],
    settings: &SearchSettings,
    cancel: Option<&CancellationToken>,
) -> Result<ProgressiveSearch, SearchError> {
    settings.validate()?;

    let mut maps = vec![StoreMap::new(); keywords.len()];
    let mut api_calls = 0usize;
    let mut pages_searched = 0usize;

    let finish = |maps: Vec<StoreMap>,
                  api_calls: usize,
                  pages_searched: usize,
                  stop_reason: StopReason,
                  warning: Option<String>| ProgressiveSearch {
        maps,
        stats: SearchStats {
            api_calls,
            pages_searched,
            stop_reason,
        },
        warning,
    };

    let strategy_count = settings.sort_strategies.len();
    let page_limit = settings.page_limit();
    if page_limit < settings.max_pages_per_sort {
        tracing::debug!(
            max_pages_per_sort = settings.max_pages_per_sort,
            page_limit,
            max_start = settings.max_start,
            "page cap clipped to remote offset ceiling"
        );
    }

    for (strategy_index, &sort) in settings.sort_strategies.iter().enumerate() {
        let mut page = 0u32;

        while page < page_limit {
            let batch_end = page.saturating_add(settings.pages_per_batch).min(page_limit);
            let starts: Vec<u32> = (page..batch_end)
                .filter_map(|p| settings.start_for_page(p))
                .collect();

            let outcome =
                fetch_batch(source, keywords, &starts, sort, settings, cancel, &mut api_calls).await;

            let batch_maps = match outcome {
                Ok(BatchOutcome::Complete(batch_maps)) => batch_maps,
                Ok(BatchOutcome::Cancelled) => {
                    tracing::info!(api_calls, pages_searched, "search cancelled");
                    return Ok(finish(
                        maps,
                        api_calls,
                        pages_searched,
                        StopReason::Cancelled,
                        None,
                    ));
                }
                Err(e) => match settings.failure_policy {
                    FailurePolicy::Abort => {
                        tracing::warn!(error = %e, sort = %sort, "page fetch failed; aborting search");
                        return Err(e);
                    }
                    FailurePolicy::ReturnPartial => {
                        tracing::warn!(
                            error = %e,
                            sort = %sort,
                            "page fetch failed; returning partial results"
                        );
                        let warning = format!(
                            "search stopped early after a remote failure; results are partial: {e}"
                        );
                        return Ok(finish(
                            maps,
                            api_calls,
                            pages_searched,
                            StopReason::RemoteFailure,
                            Some(warning),
                        ));
                    }
                },
            };

            for (map, batch) in maps.iter_mut().zip(batch_maps) {
                merge_into(map, batch);
            }
            pages_searched += starts.len();

            let intersection = intersect(&maps).len();
            tracing::info!(
                sort = %sort,
                first_page = page,
                last_page = batch_end - 1,
                intersection,
                api_calls,
                "batch complete"
            );

            if intersection >= settings.min_intersection {
                tracing::info!(
                    intersection,
                    min_intersection = settings.min_intersection,
                    api_calls,
                    pages_searched,
                    "minimum intersection reached; stopping early"
                );
                return Ok(finish(
                    maps,
                    api_calls,
                    pages_searched,
                    StopReason::MinIntersectionReached,
                    None,
                ));
            }

            page = batch_end;
            if page < page_limit
                && !pause(settings.delay_between_batches_ms, cancel).await
            {
                return Ok(finish(
                    maps,
                    api_calls,
                    pages_searched,
                    StopReason::Cancelled,
                    None,
                ));
            }
        }

        if strategy_index + 1 < strategy_count
            && !pause(settings.delay_between_sorts_ms, cancel).await
        {
            return Ok(finish(
                maps,
                api_calls,
                pages_searched,
                StopReason::Cancelled,
                None,
            ));
        }
    }

    tracing::info!(api_calls, pages_searched, "search budget exhausted");
    Ok(finish(
        maps,
        api_calls,
        pages_searched,
        StopReason::Exhausted,
        None,
    ))
}

/// Fetches every page offset of one batch for every keyword, grouping each
/// page into a batch-local map per keyword.
async fn fetch_batch<S: PageSource>(
    source: &S,
    keywords: &[String],
    starts: &[u32],
    sort: SortStrategy,
    settings: &SearchSettings,
    cancel: Option<&CancellationToken>,
    api_calls: &mut usize,
) -> Result<BatchOutcome, SearchError> {
    let mut batch_maps = Vec::with_capacity(keywords.len());
    let mut calls_in_batch = 0usize;

    for keyword in keywords {
        let mut keyword_map = StoreMap::new();

        for &start in starts {
            if is_cancelled(cancel) {
                return Ok(BatchOutcome::Cancelled);
            }
            if calls_in_batch > 0 && !pause(settings.delay_between_calls_ms, cancel).await {
                return Ok(BatchOutcome::Cancelled);
            }

            let request = PageRequest {
                keyword: keyword.clone(),
                page_size: settings.page_size,
                start,
                sort,
            };
            calls_in_batch += 1;
            *api_calls += 1;

            let response = source.fetch_page(&request).await?;
            merge_into(&mut keyword_map, group_by_store(&response.items, keyword));
        }

        batch_maps.push(keyword_map);
    }

    Ok(BatchOutcome::Complete(batch_maps))
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

/// Sleeps for `ms` milliseconds. Returns `false` if cancellation was
/// requested before or during the wait.
async fn pause(ms: u64, cancel: Option<&CancellationToken>) -> bool {
    if is_cancelled(cancel) {
        return false;
    }
    if ms == 0 {
        return true;
    }
    let sleep = tokio::time::sleep(Duration::from_millis(ms));
    match cancel {
        Some(token) => {
            tokio::select! {
                () = sleep => true,
                () = token.cancelled() => false,
            }
        }
        None => {
            sleep.await;
            true
        }
    }
}
