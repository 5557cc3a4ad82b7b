use crate::app_config::{AppConfig, Environment, NaverCredentials};
use crate::search_settings::{parse_sort_strategies, FailurePolicy, SearchSettings};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://openapi.naver.com/v1/search/shop.json";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("STOREFINDER_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_value(
        "STOREFINDER_BIND_ADDR",
        &or_default("STOREFINDER_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("STOREFINDER_LOG_LEVEL", "info");

    let naver_credentials = parse_credentials(&lookup)?;

    let api_base_url = or_default("STOREFINDER_API_BASE_URL", DEFAULT_API_BASE_URL);
    let request_timeout_secs: u64 = parse_value(
        "STOREFINDER_REQUEST_TIMEOUT_SECS",
        &or_default("STOREFINDER_REQUEST_TIMEOUT_SECS", "10"),
    )?;
    let user_agent = or_default(
        "STOREFINDER_USER_AGENT",
        "storefinder/0.1 (store-intersection)",
    );
    let cache_ttl_secs: u64 = parse_value(
        "STOREFINDER_CACHE_TTL_SECS",
        &or_default("STOREFINDER_CACHE_TTL_SECS", "300"),
    )?;
    let cache_max_entries: u64 = parse_value(
        "STOREFINDER_CACHE_MAX_ENTRIES",
        &or_default("STOREFINDER_CACHE_MAX_ENTRIES", "1000"),
    )?;
    let rate_limit_max_requests: usize = parse_value(
        "STOREFINDER_RATE_LIMIT_MAX_REQUESTS",
        &or_default("STOREFINDER_RATE_LIMIT_MAX_REQUESTS", "10"),
    )?;
    let rate_limit_window_secs: u64 = parse_value(
        "STOREFINDER_RATE_LIMIT_WINDOW_SECS",
        &or_default("STOREFINDER_RATE_LIMIT_WINDOW_SECS", "60"),
    )?;
    if rate_limit_window_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFINDER_RATE_LIMIT_WINDOW_SECS".to_string(),
            reason: "window must be at least one second".to_string(),
        });
    }

    let defaults = SearchSettings::default();
    let sort_var = "STOREFINDER_SORT_STRATEGIES";
    let sort_strategies = match lookup(sort_var) {
        Ok(raw) => parse_sort_strategies(&raw).map_err(|reason| ConfigError::InvalidEnvVar {
            var: sort_var.to_string(),
            reason,
        })?,
        Err(_) => defaults.sort_strategies.clone(),
    };
    let failure_policy: FailurePolicy = parse_value(
        "STOREFINDER_FAILURE_POLICY",
        &or_default("STOREFINDER_FAILURE_POLICY", "abort"),
    )?;

    let search = SearchSettings {
        page_size: parse_value(
            "STOREFINDER_PAGE_SIZE",
            &or_default("STOREFINDER_PAGE_SIZE", &defaults.page_size.to_string()),
        )?,
        max_start: parse_value(
            "STOREFINDER_MAX_START",
            &or_default("STOREFINDER_MAX_START", &defaults.max_start.to_string()),
        )?,
        max_pages_per_sort: parse_value(
            "STOREFINDER_MAX_PAGES_PER_SORT",
            &or_default(
                "STOREFINDER_MAX_PAGES_PER_SORT",
                &defaults.max_pages_per_sort.to_string(),
            ),
        )?,
        pages_per_batch: parse_value(
            "STOREFINDER_PAGES_PER_BATCH",
            &or_default(
                "STOREFINDER_PAGES_PER_BATCH",
                &defaults.pages_per_batch.to_string(),
            ),
        )?,
        min_intersection: parse_value(
            "STOREFINDER_MIN_INTERSECTION",
            &or_default(
                "STOREFINDER_MIN_INTERSECTION",
                &defaults.min_intersection.to_string(),
            ),
        )?,
        sort_strategies,
        delay_between_calls_ms: parse_value(
            "STOREFINDER_DELAY_BETWEEN_CALLS_MS",
            &or_default(
                "STOREFINDER_DELAY_BETWEEN_CALLS_MS",
                &defaults.delay_between_calls_ms.to_string(),
            ),
        )?,
        delay_between_batches_ms: parse_value(
            "STOREFINDER_DELAY_BETWEEN_BATCHES_MS",
            &or_default(
                "STOREFINDER_DELAY_BETWEEN_BATCHES_MS",
                &defaults.delay_between_batches_ms.to_string(),
            ),
        )?,
        delay_between_sorts_ms: parse_value(
            "STOREFINDER_DELAY_BETWEEN_SORTS_MS",
            &or_default(
                "STOREFINDER_DELAY_BETWEEN_SORTS_MS",
                &defaults.delay_between_sorts_ms.to_string(),
            ),
        )?,
        failure_policy,
    };
    search.validate()?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        naver_credentials,
        api_base_url,
        request_timeout_secs,
        user_agent,
        cache_ttl_secs,
        cache_max_entries,
        rate_limit_max_requests,
        rate_limit_window_secs,
        search,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Reads the credential pair. Both unset is fine; exactly one set is a
/// misconfiguration worth failing on.
fn parse_credentials<F>(lookup: &F) -> Result<Option<NaverCredentials>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let non_empty = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    match (non_empty("NAVER_CLIENT_ID"), non_empty("NAVER_CLIENT_SECRET")) {
        (Some(client_id), Some(client_secret)) => Ok(Some(NaverCredentials {
            client_id,
            client_secret,
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar("NAVER_CLIENT_SECRET".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar("NAVER_CLIENT_ID".to_string())),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFINDER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
