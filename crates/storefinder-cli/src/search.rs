//! `search` command: runs one store-intersection search and prints it.

use clap::Args;
use storefinder_core::search_settings::parse_sort_strategies;
use storefinder_core::{
    validate_keywords, AppConfig, FailurePolicy, SearchSettings, StoreAggregate,
};
use storefinder_search::{search_stores, NaverShoppingClient, SearchOutcome};
use tokio_util::sync::CancellationToken;

/// Arguments of the `search` command. Unset knobs fall back to configuration.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Keywords to intersect (2 to 5)
    #[arg(required = true, num_args = 1..)]
    pub keywords: Vec<String>,

    /// Stop once this many stores carry every keyword
    #[arg(long)]
    pub min_intersection: Option<usize>,

    /// Page cap per sort strategy
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Pages fetched per keyword between stop checks
    #[arg(long)]
    pub pages_per_batch: Option<u32>,

    /// Comma-separated sort strategies, e.g. `sim,date`
    #[arg(long)]
    pub sort: Option<String>,

    /// Return partial results instead of failing when a remote call fails
    #[arg(long)]
    pub partial: bool,

    /// Print a store table instead of JSON
    #[arg(long)]
    pub table: bool,
}

/// Applies command-line overrides on top of the configured settings.
///
/// # Errors
///
/// Returns an error if `--sort` names an unknown strategy or the resulting
/// settings are invalid.
pub(crate) fn effective_settings(
    base: &SearchSettings,
    args: &SearchArgs,
) -> anyhow::Result<SearchSettings> {
    let mut settings = base.clone();
    if let Some(min) = args.min_intersection {
        settings.min_intersection = min;
    }
    if let Some(max_pages) = args.max_pages {
        settings.max_pages_per_sort = max_pages;
    }
    if let Some(batch) = args.pages_per_batch {
        settings.pages_per_batch = batch;
    }
    if let Some(raw) = &args.sort {
        settings.sort_strategies =
            parse_sort_strategies(raw).map_err(|reason| anyhow::anyhow!("--sort: {reason}"))?;
    }
    if args.partial {
        settings.failure_policy = FailurePolicy::ReturnPartial;
    }
    settings.validate()?;
    Ok(settings)
}

/// Runs the search and prints the outcome to stdout.
///
/// Ctrl-C stops fetching; whatever was accumulated is still printed.
///
/// # Errors
///
/// Returns an error if the keywords are invalid, credentials are missing,
/// or the search fails.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let keywords = validate_keywords(&args.keywords)?;
    let settings = effective_settings(&config.search, args)?;
    let client = NaverShoppingClient::from_config(config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; returning results gathered so far");
            on_interrupt.cancel();
        }
    });

    let outcome = search_stores(&client, &keywords, &settings, Some(&cancel)).await?;

    if args.table {
        print_table(&outcome, &keywords);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

fn print_table(outcome: &SearchOutcome, keywords: &[String]) {
    if let Some(warning) = &outcome.warning {
        println!("warning: {warning}");
    }
    println!(
        "{} of {} stores carry all {} keywords ({} API calls, {} pages, stopped: {:?})",
        outcome.intersection_stores.len(),
        outcome.total_stores_found,
        outcome.keyword_count,
        outcome.search_stats.api_calls,
        outcome.search_stats.pages_searched,
        outcome.search_stats.stop_reason,
    );
    if outcome.intersection_stores.is_empty() {
        return;
    }

    println!(
        "{:<32}{:>10}  {:<40}SAMPLE PRODUCT",
        "STORE", "PRODUCTS", "HITS PER KEYWORD"
    );
    for store in &outcome.intersection_stores {
        let sample = store
            .products
            .first()
            .map(|p| truncate(&p.title, 50))
            .unwrap_or_default();
        println!(
            "{:<32}{:>10}  {:<40}{}",
            truncate(&store.store_name, 30),
            store.product_count(),
            truncate(&keyword_hits(store, keywords), 36),
            sample
        );
    }
}

/// Renders how many of the store's products each keyword surfaced,
/// e.g. `protein:3 shaker:1`.
pub(crate) fn keyword_hits(store: &StoreAggregate, keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|keyword| {
            let hits = store.products.iter().filter(|p| p.matched(keyword)).count();
            format!("{keyword}:{hits}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_owned()
    }
}
