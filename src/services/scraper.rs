// src/services/scraper.rs

//! Fallback lookup source that scrapes the public website.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{
    Beer, Brewery, CrawlResult, Entity, EntityKind, PageSelectors, ScraperConfig, SearchResultSet,
};
use crate::services::{LookupSource, PageParser};
use crate::utils::build_url;
use crate::utils::http::{FetchOptions, Fetcher};

/// Scraper for the provider's HTML pages.
pub struct UntappdScraper {
    fetcher: Arc<dyn Fetcher>,
    parser: PageParser,
    config: ScraperConfig,
}

impl UntappdScraper {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        config: &ScraperConfig,
        selectors: &PageSelectors,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            parser: PageParser::new(selectors)?,
            config: config.clone(),
        })
    }

    fn options(&self) -> FetchOptions {
        FetchOptions::with_timeout(Duration::from_secs(self.config.timeout_secs))
            .header("User-Agent", self.config.user_agent.as_str())
    }

    async fn page(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = build_url(&self.config.base_url, path, query)?;
        let html = self.fetcher.fetch_html(&url, &self.options()).await?;
        Ok(html)
    }

    /// Search and hydrate every hit on the results page.
    ///
    /// Hits that fail to resolve are counted rather than aborting the run.
    pub async fn crawl(&self, query: &str, kind: EntityKind) -> Result<CrawlResult> {
        let started_at = Utc::now();
        let hits = self.search(query, kind).await?;
        log::info!(
            "Crawling {} {} hits for '{}' ({} reported)",
            hits.entities.len(),
            kind,
            query,
            hits.total
        );

        let delay = Duration::from_millis(self.config.request_delay_ms);
        let results: Vec<Option<Entity>> = stream::iter(hits.entities)
            .map(|item| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match self.get_entity(item.id, kind).await {
                    Ok(Some(entity)) => Some(entity),
                    Ok(None) => {
                        log::warn!("No {} found at id {} ({})", kind, item.id, item.name);
                        None
                    }
                    Err(e) => {
                        log::warn!("Failed to crawl {} {}: {}", kind, item.id, e);
                        None
                    }
                }
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        let failures = results.iter().filter(|r| r.is_none()).count();
        let entities: Vec<Entity> = results.into_iter().flatten().collect();
        log::info!(
            "Crawl for '{}' finished: {} resolved, {} failed",
            query,
            entities.len(),
            failures
        );

        Ok(CrawlResult {
            total: hits.total,
            entities,
            failures,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[async_trait]
impl LookupSource for UntappdScraper {
    fn name(&self) -> &'static str {
        "scraper"
    }

    fn concurrency(&self) -> usize {
        self.config.max_concurrent.max(1)
    }

    async fn search(&self, query: &str, kind: EntityKind) -> Result<SearchResultSet> {
        let html = self
            .page(
                "search",
                &[("q", query), ("type", kind.as_str()), ("sort", &self.config.sort)],
            )
            .await?;
        self.parser
            .parse_search_page(&html)
            .ok_or_else(|| AppError::parse(format!("{kind} search '{query}'"), "no result total"))
    }

    async fn get_beer(&self, id: u64) -> Result<Option<Beer>> {
        let html = self.page(&format!("beer/{id}"), &[]).await?;
        let beer = self.parser.parse_beer_page(id, &html);
        if beer.is_none() {
            log::warn!("Beer page {} has no name heading", id);
        }
        Ok(beer)
    }

    async fn get_brewery(&self, id: u64) -> Result<Option<Brewery>> {
        let html = self.page(&format!("brewery/{id}"), &[]).await?;
        let brewery = self.parser.parse_brewery_page(id, &html);
        if brewery.is_none() {
            log::warn!("Brewery page {} has no name heading", id);
        }
        Ok(brewery)
    }
}
