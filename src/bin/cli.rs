//! Bakhus CLI
//!
//! Local entry point for beer and brewery lookups.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bakhus::{
    error::Result,
    models::{Config, EntityKind},
    services::{EntityCache, Resolver, UntappdApi, UntappdScraper},
    utils::http::{Fetcher, HttpFetcher},
};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Bakhus - beer and brewery lookups
#[derive(Parser, Debug)]
#[command(name = "bakhus", version, about = "Beer and brewery lookups")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Bypass the entity cache
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List search hits without resolving them
    Search {
        query: String,

        /// Entity kind: beer or brewery
        #[arg(short, long, default_value = "beer")]
        kind: EntityKind,
    },

    /// Search and resolve the top hits into full records
    Find {
        query: String,

        #[arg(short, long, default_value = "beer")]
        kind: EntityKind,
    },

    /// Resolve one entity by id
    Get {
        id: u64,

        #[arg(short, long, default_value = "beer")]
        kind: EntityKind,
    },

    /// Resolve the brewery of a beer
    BreweryByBeer { beer_id: u64 },

    /// Scrape every hit of a search into full records
    Crawl {
        query: String,

        #[arg(short, long, default_value = "beer")]
        kind: EntityKind,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_cache(config: &Config, bypass: bool) -> Result<EntityCache> {
    if bypass || !config.cache.enabled {
        log::debug!("Entity cache disabled");
        return Ok(EntityCache::disabled());
    }
    let timeout = Duration::from_millis(config.cache.timeout_ms);

    #[cfg(feature = "cache-redis")]
    {
        let store = bakhus::storage::RedisStore::open(&config.cache.redis_url)?;
        return Ok(EntityCache::new(Arc::new(store)).with_timeout(timeout));
    }

    #[cfg(not(feature = "cache-redis"))]
    {
        log::info!("Built without redis support; caching in memory for this run");
        return Ok(
            EntityCache::new(Arc::new(bakhus::storage::MemoryStore::new())).with_timeout(timeout),
        );
    }
}

fn build_scraper(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<UntappdScraper> {
    UntappdScraper::new(fetcher, &config.scraper, &config.selectors)
}

/// Wire the API, the scraper and the cache into a resolver.
fn build_resolver(config: &Config, bypass_cache: bool) -> Result<Resolver> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.scraper)?);
    if !config.has_credentials() {
        log::warn!("No API credentials set; API lookups will fail over to the scraper");
    }

    let api = UntappdApi::new(
        Arc::clone(&fetcher),
        &config.api,
        config.scraper.max_concurrent,
    );
    let scraper = build_scraper(config, fetcher)?;
    let cache = build_cache(config, bypass_cache)?;

    Ok(Resolver::new(
        Arc::new(api),
        Arc::new(scraper),
        cache,
        config.api.search_limit,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    let no_cache = cli.no_cache;

    if !matches!(cli.command, Command::Validate) {
        config.validate()?;
    }

    match cli.command {
        Command::Search { query, kind } => {
            let resolver = build_resolver(&config, no_cache)?;
            print_json(&resolver.search(&query, kind).await?)?;
        }

        Command::Find { query, kind } => {
            let resolver = build_resolver(&config, no_cache)?;
            let found = resolver.search_item(&query, kind).await?;
            if found.is_empty() {
                log::info!("Nothing found for '{}'", query);
            }
            print_json(&found)?;
        }

        Command::Get { id, kind } => {
            let resolver = build_resolver(&config, no_cache)?;
            let found = resolver.get_item(id, kind).await?;
            if found.is_none() {
                log::info!("No {} with id {}", kind, id);
            }
            print_json(&found)?;
        }

        Command::BreweryByBeer { beer_id } => {
            let resolver = build_resolver(&config, no_cache)?;
            let found = resolver.get_brewery_by_beer(beer_id).await?;
            if found.is_none() {
                log::info!("No brewery found for beer {}", beer_id);
            }
            print_json(&found)?;
        }

        Command::Crawl {
            query,
            kind,
            output,
        } => {
            let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.scraper)?);
            let scraper = build_scraper(&config, fetcher)?;
            let result = scraper.crawl(&query, kind).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&result)?)?;
                    log::info!("Crawl result saved to {}", path.display());
                }
                None => print_json(&result)?,
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            if !config.has_credentials() {
                log::warn!("No API credentials set (UNTAPPD_ID / UNTAPPD_TOKEN)");
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
