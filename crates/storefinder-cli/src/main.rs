mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "storefinder-cli")]
#[command(about = "Find storefronts that sell products for every keyword")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for stores carrying products for all keywords
    Search(SearchArgs),
    /// Print the effective configuration (credentials redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = storefinder_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Search(args)) => search::run_search(&config, &args).await?,
        Some(Commands::Config) => println!("{config:#?}"),
        None => println!("storefinder-cli: run `storefinder-cli search <KEYWORD>...` or `--help`"),
    }

    Ok(())
}
