use std::collections::HashMap;
use std::env::VarError;

use super::*;
use crate::search_settings::SortStrategy;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with valid credentials populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("NAVER_CLIENT_ID", "test-client-id");
    m.insert("NAVER_CLIENT_SECRET", "test-client-secret");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREFINDER_ENV"));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.cache_ttl_secs, 300);
    assert_eq!(cfg.cache_max_entries, 1000);
    assert_eq!(cfg.rate_limit_max_requests, 10);
    assert_eq!(cfg.rate_limit_window_secs, 60);
    assert_eq!(cfg.search, SearchSettings::default());
}

#[test]
fn build_app_config_reads_credentials() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let creds = cfg.naver_credentials.expect("credentials should be present");
    assert_eq!(creds.client_id, "test-client-id");
    assert_eq!(creds.client_secret, "test-client-secret");
}

#[test]
fn build_app_config_allows_missing_credentials() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.naver_credentials.is_none());
}

#[test]
fn build_app_config_treats_blank_credentials_as_missing() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("NAVER_CLIENT_ID", "  ");
    map.insert("NAVER_CLIENT_SECRET", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.naver_credentials.is_none());
}

#[test]
fn build_app_config_fails_with_half_credentials() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("NAVER_CLIENT_ID", "only-the-id");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "NAVER_CLIENT_SECRET"),
        "expected MissingEnvVar(NAVER_CLIENT_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("STOREFINDER_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFINDER_BIND_ADDR"),
        "expected InvalidEnvVar(STOREFINDER_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_overrides_search_knobs() {
    let mut map = full_env();
    map.insert("STOREFINDER_PAGE_SIZE", "50");
    map.insert("STOREFINDER_MAX_PAGES_PER_SORT", "4");
    map.insert("STOREFINDER_PAGES_PER_BATCH", "1");
    map.insert("STOREFINDER_MIN_INTERSECTION", "3");
    map.insert("STOREFINDER_SORT_STRATEGIES", "date,asc");
    map.insert("STOREFINDER_DELAY_BETWEEN_SORTS_MS", "0");
    map.insert("STOREFINDER_FAILURE_POLICY", "partial");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search.page_size, 50);
    assert_eq!(cfg.search.max_pages_per_sort, 4);
    assert_eq!(cfg.search.pages_per_batch, 1);
    assert_eq!(cfg.search.min_intersection, 3);
    assert_eq!(
        cfg.search.sort_strategies,
        vec![SortStrategy::Date, SortStrategy::Asc]
    );
    assert_eq!(cfg.search.delay_between_sorts_ms, 0);
    assert_eq!(cfg.search.failure_policy, FailurePolicy::ReturnPartial);
}

#[test]
fn build_app_config_rejects_unknown_sort_strategy() {
    let mut map = full_env();
    map.insert("STOREFINDER_SORT_STRATEGIES", "sim,random");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFINDER_SORT_STRATEGIES"),
        "expected InvalidEnvVar(STOREFINDER_SORT_STRATEGIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_empty_sort_strategy_list() {
    let mut map = full_env();
    map.insert("STOREFINDER_SORT_STRATEGIES", " , ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidSetting {
                field: "sort_strategies",
                ..
            })
        ),
        "expected InvalidSetting(sort_strategies), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_page_size() {
    let mut map = full_env();
    map.insert("STOREFINDER_PAGE_SIZE", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFINDER_PAGE_SIZE"),
        "expected InvalidEnvVar(STOREFINDER_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_page_size_above_api_limit() {
    let mut map = full_env();
    map.insert("STOREFINDER_PAGE_SIZE", "250");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidSetting {
            field: "page_size",
            ..
        })
    ));
}

#[test]
fn build_app_config_rejects_zero_rate_limit_window() {
    let mut map = full_env();
    map.insert("STOREFINDER_RATE_LIMIT_WINDOW_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFINDER_RATE_LIMIT_WINDOW_SECS")
    );
}

#[test]
fn build_app_config_rejects_unknown_failure_policy() {
    let mut map = full_env();
    map.insert("STOREFINDER_FAILURE_POLICY", "retry");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFINDER_FAILURE_POLICY")
    );
}

#[test]
fn debug_output_redacts_credentials() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-client-secret"));
    assert!(!rendered.contains("test-client-id"));
    assert!(rendered.contains("[redacted]"));
}
