// src/services/source.rs

//! The operation set shared by the API gateway and the scraper.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Beer, Brewery, Entity, EntityKind, SearchItem, SearchResultSet};

/// An upstream that can search for and resolve entities.
///
/// The resolver holds one primary and one fallback source behind this trait.
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Upper bound on concurrent detail lookups while hydrating hits.
    fn concurrency(&self) -> usize {
        1
    }

    /// Cheap search returning references only.
    async fn search(&self, query: &str, kind: EntityKind) -> Result<SearchResultSet>;

    async fn get_beer(&self, id: u64) -> Result<Option<Beer>>;

    async fn get_brewery(&self, id: u64) -> Result<Option<Brewery>>;

    async fn get_entity(&self, id: u64, kind: EntityKind) -> Result<Option<Entity>> {
        Ok(match kind {
            EntityKind::Beer => self.get_beer(id).await?.map(Entity::Beer),
            EntityKind::Brewery => self.get_brewery(id).await?.map(Entity::Brewery),
        })
    }

    /// Search and hydrate the first `limit` hits into full records, in hit order.
    async fn search_entities(
        &self,
        query: &str,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<Entity>> {
        let hits = self.search(query, kind).await?;
        let items: Vec<SearchItem> = hits.entities.into_iter().take(limit).collect();
        log::debug!(
            "{}: hydrating {} of {} {} hits for '{}'",
            self.name(),
            items.len(),
            hits.total,
            kind,
            query
        );
        Ok(hydrate(self, items, kind).await)
    }

    async fn search_beer(&self, query: &str, limit: usize) -> Result<Vec<Beer>> {
        let entities = self.search_entities(query, EntityKind::Beer, limit).await?;
        Ok(entities.into_iter().filter_map(Entity::into_beer).collect())
    }

    async fn search_brewery(&self, query: &str, limit: usize) -> Result<Vec<Brewery>> {
        let entities = self
            .search_entities(query, EntityKind::Brewery, limit)
            .await?;
        Ok(entities.into_iter().filter_map(Entity::into_brewery).collect())
    }

    /// Resolve a beer, then the brewery it names. The brewery id may be `0`.
    async fn get_brewery_by_beer(&self, beer_id: u64) -> Result<Option<Brewery>> {
        let Some(beer) = self.get_beer(beer_id).await? else {
            return Ok(None);
        };
        self.get_brewery(beer.brewery.id).await
    }
}

/// Resolve every item concurrently, keeping item order. Failed items are skipped.
pub async fn hydrate<S>(source: &S, items: Vec<SearchItem>, kind: EntityKind) -> Vec<Entity>
where
    S: LookupSource + ?Sized,
{
    let concurrency = source.concurrency().max(1);
    let results: Vec<_> = stream::iter(items)
        .map(|item| async move {
            let result = source.get_entity(item.id, kind).await;
            (item, result)
        })
        .buffered(concurrency)
        .collect()
        .await;

    results
        .into_iter()
        .filter_map(|(item, result)| match result {
            Ok(Some(entity)) => Some(entity),
            Ok(None) => {
                log::warn!(
                    "{}: {} {} ({}) resolved to nothing",
                    source.name(),
                    kind,
                    item.id,
                    item.name
                );
                None
            }
            Err(error) => {
                log::warn!(
                    "{}: failed to hydrate {} {} ({}): {}",
                    source.name(),
                    kind,
                    item.id,
                    item.name,
                    error
                );
                None
            }
        })
        .collect()
}
