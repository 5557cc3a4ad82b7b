//! Controller tests against a scripted in-memory page source.

use std::sync::Mutex;

use storefinder_core::{FailurePolicy, SearchSettings, SortStrategy};
use storefinder_search::{
    run_progressive_search, search_stores, PageRequest, PageSource, RawResultItem, SearchError,
    ShoppingResponse, StopReason,
};
use tokio_util::sync::CancellationToken;

type Script = dyn Fn(&PageRequest) -> Result<ShoppingResponse, SearchError> + Send + Sync;

struct ScriptedSource {
    script: Box<Script>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedSource {
    fn new(
        script: impl Fn(&PageRequest) -> Result<ShoppingResponse, SearchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl PageSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ShoppingResponse, SearchError> {
        self.requests.lock().expect("lock").push(request.clone());
        (self.script)(request)
    }
}

fn item(mall_name: &str, link: &str) -> RawResultItem {
    RawResultItem {
        title: format!("<b>{mall_name}</b> item"),
        link: link.to_owned(),
        lprice: "10000".to_owned(),
        mall_name: mall_name.to_owned(),
        ..RawResultItem::default()
    }
}

/// A page listing one product from each of `store_count` shared stores.
fn shared_stores_page(request: &PageRequest, store_count: usize) -> ShoppingResponse {
    let items = (0..store_count)
        .map(|i| {
            item(
                &format!("Store {i:02}"),
                &format!(
                    "https://smartstore.naver.com/main/products/{}-{}-{}-{i}",
                    request.keyword, request.sort, request.start
                ),
            )
        })
        .collect();
    ShoppingResponse {
        items,
        ..ShoppingResponse::default()
    }
}

/// A page whose only store is unique to the keyword.
fn private_store_page(request: &PageRequest) -> ShoppingResponse {
    ShoppingResponse {
        items: vec![item(
            &format!("Only {}", request.keyword),
            &format!(
                "https://smartstore.naver.com/main/products/{}-{}",
                request.keyword, request.start
            ),
        )],
        ..ShoppingResponse::default()
    }
}

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| (*k).to_owned()).collect()
}

fn settings() -> SearchSettings {
    SearchSettings::default().without_delays()
}

fn remote_error() -> SearchError {
    SearchError::RemoteStatus {
        status: 500,
        message: "upstream unavailable".to_owned(),
    }
}

#[tokio::test]
async fn stops_after_first_batch_when_minimum_reached() {
    let source = ScriptedSource::new(|req| Ok(shared_stores_page(req, 12)));
    let kws = keywords(&["protein", "shaker"]);

    let result = run_progressive_search(&source, &kws, &settings(), None)
        .await
        .expect("search should succeed");

    assert_eq!(result.stats.stop_reason, StopReason::MinIntersectionReached);
    assert_eq!(result.stats.pages_searched, 2);
    assert_eq!(result.stats.api_calls, 4);
    assert_eq!(source.requests().len(), 4);
    assert!(source.requests().iter().all(|r| r.sort == SortStrategy::Sim));
    assert_eq!(result.maps.len(), 2);
    assert_eq!(result.maps[0].len(), 12);
}

#[tokio::test]
async fn fetches_keyword_by_keyword_then_page_by_page() {
    let source = ScriptedSource::new(|req| Ok(shared_stores_page(req, 12)));
    let kws = keywords(&["protein", "shaker"]);

    run_progressive_search(&source, &kws, &settings(), None)
        .await
        .expect("search should succeed");

    let order: Vec<(String, u32)> = source
        .requests()
        .into_iter()
        .map(|r| (r.keyword, r.start))
        .collect();
    assert_eq!(
        order,
        vec![
            ("protein".to_owned(), 1),
            ("protein".to_owned(), 101),
            ("shaker".to_owned(), 1),
            ("shaker".to_owned(), 101),
        ]
    );
}

#[tokio::test]
async fn exhausts_every_strategy_when_intersection_stays_small() {
    let source = ScriptedSource::new(|req| Ok(private_store_page(req)));
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        max_pages_per_sort: 3,
        pages_per_batch: 2,
        ..settings()
    };

    let result = run_progressive_search(&source, &kws, &settings, None)
        .await
        .expect("exhausting the budget is not an error");

    assert_eq!(result.stats.stop_reason, StopReason::Exhausted);
    // Two strategies, batches [0,1] and [2] each.
    assert_eq!(result.stats.pages_searched, 6);
    assert_eq!(result.stats.api_calls, 12);

    let sorts: Vec<SortStrategy> = source.requests().iter().map(|r| r.sort).collect();
    assert!(sorts[..6].iter().all(|s| *s == SortStrategy::Sim));
    assert!(sorts[6..].iter().all(|s| *s == SortStrategy::Date));
}

#[tokio::test]
async fn second_strategy_can_complete_the_intersection() {
    // Relevance ranking only surfaces keyword-private stores; recency
    // ranking surfaces shared ones.
    let source = ScriptedSource::new(|req| match req.sort {
        SortStrategy::Date => Ok(shared_stores_page(req, 10)),
        _ => Ok(private_store_page(req)),
    });
    let kws = keywords(&["protein", "shaker", "creatine"]);
    let settings = SearchSettings {
        max_pages_per_sort: 2,
        ..settings()
    };

    let result = run_progressive_search(&source, &kws, &settings, None)
        .await
        .expect("search should succeed");

    assert_eq!(result.stats.stop_reason, StopReason::MinIntersectionReached);
    assert_eq!(result.stats.pages_searched, 4);
    assert_eq!(result.stats.api_calls, 12);
}

#[tokio::test]
async fn offsets_beyond_ceiling_are_skipped_and_not_counted() {
    let source = ScriptedSource::new(|req| Ok(private_store_page(req)));
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        max_start: 150,
        max_pages_per_sort: 3,
        pages_per_batch: 3,
        sort_strategies: vec![SortStrategy::Sim],
        ..settings()
    };

    let result = run_progressive_search(&source, &kws, &settings, None)
        .await
        .expect("search should succeed");

    assert_eq!(result.stats.pages_searched, 2);
    assert_eq!(result.stats.api_calls, 4);
    assert!(source.requests().iter().all(|r| r.start <= 150));
}

#[tokio::test]
async fn page_cursor_stops_at_offset_ceiling() {
    let source = ScriptedSource::new(|_| Ok(ShoppingResponse::default()));
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        max_start: 150,
        max_pages_per_sort: 5,
        pages_per_batch: 1,
        sort_strategies: vec![SortStrategy::Sim],
        ..settings()
    };

    let result = run_progressive_search(&source, &kws, &settings, None)
        .await
        .expect("search should succeed");

    assert_eq!(result.stats.stop_reason, StopReason::Exhausted);
    assert_eq!(result.stats.api_calls, 4);
    assert_eq!(result.stats.pages_searched, 2);

    let starts: Vec<(String, u32)> = source
        .requests()
        .into_iter()
        .map(|r| (r.keyword, r.start))
        .collect();
    assert_eq!(
        starts,
        vec![
            ("protein".to_owned(), 1),
            ("shaker".to_owned(), 1),
            ("protein".to_owned(), 101),
            ("shaker".to_owned(), 101),
        ]
    );
}

#[tokio::test]
async fn remote_failure_aborts_by_default() {
    let source = ScriptedSource::new(|req| {
        if req.keyword == "shaker" && req.start == 101 {
            Err(remote_error())
        } else {
            Ok(private_store_page(req))
        }
    });
    let kws = keywords(&["protein", "shaker"]);

    let err = run_progressive_search(&source, &kws, &settings(), None)
        .await
        .expect_err("failure should propagate");

    assert!(
        matches!(err, SearchError::RemoteStatus { status: 500, .. }),
        "expected RemoteStatus(500), got: {err:?}"
    );
    assert_eq!(source.requests().len(), 4);
}

#[tokio::test]
async fn partial_policy_returns_completed_batches_with_warning() {
    let source = ScriptedSource::new(|req| {
        if req.start == 1 {
            Ok(shared_stores_page(req, 3))
        } else {
            Err(remote_error())
        }
    });
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        pages_per_batch: 1,
        failure_policy: FailurePolicy::ReturnPartial,
        ..settings()
    };

    let outcome = search_stores(&source, &kws, &settings, None)
        .await
        .expect("partial policy returns Ok");

    assert_eq!(outcome.search_stats.stop_reason, StopReason::RemoteFailure);
    assert_eq!(outcome.search_stats.pages_searched, 1);
    assert_eq!(outcome.intersection_stores.len(), 3);
    let warning = outcome.warning.expect("partial result carries a warning");
    assert!(warning.contains("upstream unavailable"), "warning: {warning}");
}

#[tokio::test]
async fn cancelled_before_start_issues_no_calls() {
    let source = ScriptedSource::new(|req| Ok(shared_stores_page(req, 12)));
    let kws = keywords(&["protein", "shaker"]);
    let token = CancellationToken::new();
    token.cancel();

    let result = run_progressive_search(&source, &kws, &settings(), Some(&token))
        .await
        .expect("cancellation is not an error");

    assert_eq!(result.stats.stop_reason, StopReason::Cancelled);
    assert_eq!(result.stats.api_calls, 0);
    assert_eq!(result.stats.pages_searched, 0);
    assert!(result.maps.iter().all(std::collections::BTreeMap::is_empty));
}

#[tokio::test]
async fn cancellation_mid_batch_discards_that_batch() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    // Cancel during the first call of the second batch.
    let source = ScriptedSource::new(move |req| {
        if req.start == 201 {
            trigger.cancel();
        }
        Ok(private_store_page(req))
    });
    let kws = keywords(&["protein", "shaker"]);

    let result = run_progressive_search(&source, &kws, &settings(), Some(&token))
        .await
        .expect("cancellation is not an error");

    assert_eq!(result.stats.stop_reason, StopReason::Cancelled);
    assert_eq!(result.stats.pages_searched, 2);
    assert_eq!(result.stats.api_calls, 5);
    // Only the two pages of the first batch made it into the map.
    assert_eq!(result.maps[0]["only protein"].product_count(), 2);
}

#[tokio::test]
async fn invalid_settings_fail_before_any_call() {
    let source = ScriptedSource::new(|req| Ok(shared_stores_page(req, 12)));
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        sort_strategies: Vec::new(),
        ..settings()
    };

    let err = run_progressive_search(&source, &kws, &settings, None)
        .await
        .expect_err("empty strategy list is rejected");

    assert!(matches!(err, SearchError::InvalidConfig(_)));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn first_party_listings_never_reach_the_result() {
    let source = ScriptedSource::new(|req| {
        let mut page = shared_stores_page(req, 2);
        page.items.push(item(
            "네이버",
            &format!(
                "https://smartstore.naver.com/main/products/first-party-{}",
                req.keyword
            ),
        ));
        Ok(page)
    });
    let kws = keywords(&["protein", "shaker"]);

    let outcome = search_stores(&source, &kws, &settings(), None)
        .await
        .expect("search should succeed");

    assert!(outcome
        .intersection_stores
        .iter()
        .all(|s| s.store_name != "네이버"));
    assert_eq!(outcome.total_stores_found, 2);
}

#[tokio::test]
async fn search_outcome_serializes_in_camel_case() {
    let source = ScriptedSource::new(|req| {
        let mut page = private_store_page(req);
        page.items.push(item(
            "Shared Mall",
            &format!(
                "https://brand.naver.com/shared/products/{}-{}",
                req.keyword, req.start
            ),
        ));
        Ok(page)
    });
    let kws = keywords(&["protein", "shaker"]);
    let settings = SearchSettings {
        max_pages_per_sort: 1,
        sort_strategies: vec![SortStrategy::Sim],
        ..settings()
    };

    let outcome = search_stores(&source, &kws, &settings, None)
        .await
        .expect("search should succeed");
    let json = serde_json::to_value(&outcome).expect("serialize");

    assert_eq!(json["keywordCount"], 2);
    assert_eq!(json["totalStoresFound"], 3);
    assert_eq!(json["searchStats"]["apiCalls"], 2);
    assert_eq!(json["searchStats"]["pagesSearched"], 1);
    assert_eq!(json["searchStats"]["stopReason"], "exhausted");
    assert_eq!(json["intersectionStores"][0]["storeId"], "shared mall");
    assert_eq!(
        json["intersectionStores"][0]["products"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
    assert!(json.get("warning").is_none());
}
