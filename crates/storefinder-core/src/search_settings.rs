//! Tunable policy knobs for the progressive multi-sort search.
//!
//! Defaults mirror the remote shopping API's documented limits: at most 100
//! items per call and a 1-based `start` offset no greater than 1000.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Hard upper bound on items per remote call.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A remote-API-defined result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Relevance ranking. Accurate, but favors large established stores.
    Sim,
    /// Most recently listed first. Surfaces newer and smaller stores.
    Date,
    /// Price, low to high.
    Asc,
    /// Price, high to low.
    Dsc,
}

impl SortStrategy {
    /// Wire code sent as the `sort` query parameter.
    #[must_use]
    pub fn as_code(self) -> &'static str {
        match self {
            SortStrategy::Sim => "sim",
            SortStrategy::Date => "date",
            SortStrategy::Asc => "asc",
            SortStrategy::Dsc => "dsc",
        }
    }
}

impl std::fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sim" => Ok(SortStrategy::Sim),
            "date" => Ok(SortStrategy::Date),
            "asc" => Ok(SortStrategy::Asc),
            "dsc" => Ok(SortStrategy::Dsc),
            other => Err(format!(
                "unknown sort strategy \"{other}\" (expected sim, date, asc or dsc)"
            )),
        }
    }
}

/// Parses a comma-separated strategy list such as `"sim,date"`.
///
/// Empty segments are ignored; duplicates are kept in the order given.
///
/// # Errors
///
/// Returns the first unrecognised strategy as a human-readable message.
pub fn parse_sort_strategies(raw: &str) -> Result<Vec<SortStrategy>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SortStrategy::from_str)
        .collect()
}

/// What the controller does when a remote page fetch fails mid-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Discard everything and propagate the error.
    #[default]
    Abort,
    /// Stop fetching and return the maps accumulated by completed batches,
    /// together with a warning.
    ReturnPartial,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "partial" | "return_partial" => Ok(FailurePolicy::ReturnPartial),
            other => Err(format!(
                "unknown failure policy \"{other}\" (expected abort or partial)"
            )),
        }
    }
}

/// Policy knobs consumed by the search controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Items requested per remote call.
    pub page_size: u32,
    /// Highest 1-based `start` offset the remote API accepts.
    pub max_start: u32,
    /// Page cap per sort strategy.
    pub max_pages_per_sort: u32,
    /// Pages fetched per keyword before the stop condition is re-checked.
    pub pages_per_batch: u32,
    /// Intersection size that ends the search early.
    pub min_intersection: usize,
    /// Strategies tried in order.
    pub sort_strategies: Vec<SortStrategy>,
    pub delay_between_calls_ms: u64,
    pub delay_between_batches_ms: u64,
    pub delay_between_sorts_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_start: 1000,
            max_pages_per_sort: 10,
            pages_per_batch: 2,
            min_intersection: 10,
            sort_strategies: vec![SortStrategy::Sim, SortStrategy::Date],
            delay_between_calls_ms: 50,
            delay_between_batches_ms: 100,
            delay_between_sorts_ms: 500,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl SearchSettings {
    /// Returns a copy with every pacing delay set to zero.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.delay_between_calls_ms = 0;
        self.delay_between_batches_ms = 0;
        self.delay_between_sorts_ms = 0;
        self
    }

    /// Maps a 0-based page index to the remote API's 1-based `start` offset,
    /// or `None` when the offset would exceed [`Self::max_start`].
    #[must_use]
    pub fn start_for_page(&self, page: u32) -> Option<u32> {
        let start = page.checked_mul(self.page_size)?.checked_add(1)?;
        (start <= self.max_start).then_some(start)
    }

    /// Number of pages a single sort strategy walks: [`Self::max_pages_per_sort`]
    /// clipped to the last page whose offset stays within [`Self::max_start`].
    #[must_use]
    pub fn page_limit(&self) -> u32 {
        let reachable = self
            .max_start
            .checked_sub(1)
            .and_then(|last| last.checked_div(self.page_size))
            .map_or(0, |last_page| last_page.saturating_add(1));
        self.max_pages_per_sort.min(reachable)
    }

    /// Checks that the knobs describe a search that can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidSetting {
                field: "page_size",
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if self.max_start == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "max_start",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_pages_per_sort == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "max_pages_per_sort",
                reason: "must be at least 1".into(),
            });
        }
        if self.pages_per_batch == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "pages_per_batch",
                reason: "must be at least 1".into(),
            });
        }
        if self.sort_strategies.is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "sort_strategies",
                reason: "at least one sort strategy is required".into(),
            });
        }
        Ok(())
    }
}
