// src/services/resolver.rs

//! Front-end facing lookups with cache-aside reads and source fallback.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Beer, Brewery, Entity, EntityKind, SearchResultSet};
use crate::services::{EntityCache, LookupSource};

/// Dispatches lookups to a primary source, falling back to a secondary one
/// only when the primary cannot be reached.
///
/// Holds no per-call state; share it behind an `Arc`.
pub struct Resolver {
    primary: Arc<dyn LookupSource>,
    fallback: Arc<dyn LookupSource>,
    cache: EntityCache,
    search_limit: usize,
}

impl Resolver {
    pub fn new(
        primary: Arc<dyn LookupSource>,
        fallback: Arc<dyn LookupSource>,
        cache: EntityCache,
        search_limit: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache,
            search_limit,
        }
    }

    /// Run `op` against the primary source, then once against the fallback
    /// if the primary raised a transport fault.
    async fn with_fallback<'a, T, F, Fut>(&'a self, operation: &str, op: F) -> Result<T>
    where
        F: Fn(&'a dyn LookupSource) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match op(self.primary.as_ref()).await {
            Err(e) if e.is_transport() => {
                log::warn!(
                    "{} unavailable for {} ({}); trying {}",
                    self.primary.name(),
                    operation,
                    e,
                    self.fallback.name()
                );
                op(self.fallback.as_ref()).await
            }
            other => other,
        }
    }

    /// Raw search references. Not cached.
    pub async fn search(&self, query: &str, kind: EntityKind) -> Result<SearchResultSet> {
        self.with_fallback("search", |source| source.search(query, kind))
            .await
    }

    /// Search and hydrate up to the configured limit, in hit order. Not cached.
    ///
    /// An empty result from the primary source is returned as-is.
    pub async fn search_item(&self, query: &str, kind: EntityKind) -> Result<Vec<Entity>> {
        let limit = self.search_limit;
        self.with_fallback("search_item", |source| {
            source.search_entities(query, kind, limit)
        })
        .await
    }

    /// Cache-aside lookup of one entity.
    pub async fn get_item(&self, id: u64, kind: EntityKind) -> Result<Option<Entity>> {
        if let Some(entity) = self.cache.get(kind, id).await {
            return Ok(Some(entity));
        }

        let resolved = self
            .with_fallback("get_item", |source| source.get_entity(id, kind))
            .await?;

        if let Some(entity) = &resolved {
            self.cache.set(kind, id, entity).await;
        }
        Ok(resolved)
    }

    pub async fn get_beer(&self, id: u64) -> Result<Option<Beer>> {
        Ok(self
            .get_item(id, EntityKind::Beer)
            .await?
            .and_then(Entity::into_beer))
    }

    pub async fn get_brewery(&self, id: u64) -> Result<Option<Brewery>> {
        Ok(self
            .get_item(id, EntityKind::Brewery)
            .await?
            .and_then(Entity::into_brewery))
    }

    /// Resolve a beer, then the brewery it names, both through [`Self::get_item`].
    ///
    /// A brewery id of `0` is looked up like any other.
    pub async fn get_brewery_by_beer(&self, beer_id: u64) -> Result<Option<Brewery>> {
        let Some(beer) = self.get_beer(beer_id).await? else {
            return Ok(None);
        };
        self.get_brewery(beer.brewery.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::models::BreweryShort;
    use crate::services::testing::{Behavior, CountingSource, HangingStore};
    use crate::storage::MemoryStore;

    fn beer(id: u64, name: &str, brewery_id: u64) -> Beer {
        Beer {
            id,
            name: name.into(),
            brewery: BreweryShort {
                id: brewery_id,
                name: "Lervig".into(),
            },
            ..Beer::default()
        }
    }

    fn brewery(id: u64, name: &str) -> Brewery {
        Brewery {
            id,
            name: name.into(),
            ..Brewery::default()
        }
    }

    fn resolver(
        primary: &Arc<CountingSource>,
        fallback: &Arc<CountingSource>,
        cache: EntityCache,
    ) -> Resolver {
        Resolver::new(primary.clone(), fallback.clone(), cache, 3)
    }

    fn memory_cache() -> EntityCache {
        EntityCache::new(Arc::new(MemoryStore::new()))
    }

    /// (beer lookups, brewery lookups)
    fn lookups(source: &CountingSource) -> (usize, usize) {
        (
            source.beer_lookups.load(Ordering::SeqCst),
            source.brewery_lookups.load(Ordering::SeqCst),
        )
    }

    #[tokio::test]
    async fn test_get_item_returns_requested_id() {
        let api = Arc::new(CountingSource::new("api", Behavior::Serve).with_beer(beer(42, "A", 1)));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));

        let entity = resolver(&api, &scraper, EntityCache::disabled())
            .get_item(42, EntityKind::Beer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entity.id(), 42);
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_get_item_is_served_from_cache() {
        let api = Arc::new(CountingSource::new("api", Behavior::Serve).with_beer(beer(42, "A", 1)));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));
        let resolver = resolver(&api, &scraper, memory_cache());

        let first = resolver.get_item(42, EntityKind::Beer).await.unwrap();
        let second = resolver.get_item(42, EntityKind::Beer).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.beer_lookups.load(Ordering::SeqCst), 1);
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_fault_falls_back_once() {
        let api = Arc::new(CountingSource::new("api", Behavior::Unreachable));
        let scraper = Arc::new(
            CountingSource::new("scraper", Behavior::Serve).with_brewery(brewery(5231, "Lervig")),
        );
        let resolver = resolver(&api, &scraper, memory_cache());

        let found = resolver.get_brewery(5231).await.unwrap().unwrap();
        assert_eq!(found.name, "Lervig");
        assert_eq!(scraper.brewery_lookups.load(Ordering::SeqCst), 1);

        // Fallback results are written through as well.
        resolver.get_brewery(5231).await.unwrap();
        assert_eq!(scraper.brewery_lookups.load(Ordering::SeqCst), 1);
        assert_eq!(api.brewery_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_sources_down_is_an_error() {
        let api = Arc::new(CountingSource::new("api", Behavior::Unreachable));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Unreachable));

        let err = resolver(&api, &scraper, memory_cache())
            .get_item(1, EntityKind::Beer)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(api.calls(), 1);
        assert_eq!(scraper.calls(), 1);
    }

    #[tokio::test]
    async fn test_absent_or_malformed_primary_does_not_fall_back() {
        let api = Arc::new(CountingSource::new("api", Behavior::Serve));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve).with_beer(beer(1, "A", 1)));
        let found = resolver(&api, &scraper, memory_cache())
            .get_item(1, EntityKind::Beer)
            .await
            .unwrap();
        assert_eq!(found, None);
        assert_eq!(scraper.calls(), 0);

        let api = Arc::new(CountingSource::new("api", Behavior::Malformed));
        let err = resolver(&api, &scraper, memory_cache())
            .get_item(1, EntityKind::Beer)
            .await
            .unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_item_keeps_hit_order_when_lookups_finish_out_of_order() {
        let api = Arc::new(
            CountingSource::new("api", Behavior::Serve)
                .with_beer(beer(30, "C", 1))
                .with_beer(beer(10, "A", 1))
                .with_beer(beer(20, "B", 1))
                .with_beer(beer(40, "D", 1))
                .with_delay(30, Duration::from_millis(80))
                .with_delay(10, Duration::from_millis(30)),
        );
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));

        let found = resolver(&api, &scraper, memory_cache())
            .search_item("x", EntityKind::Beer)
            .await
            .unwrap();
        let ids: Vec<u64> = found.iter().map(Entity::id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_renumbered_entity_is_cached_under_requested_id() {
        let api = Arc::new(
            CountingSource::new("api", Behavior::Serve).with_beer_at(42, beer(99, "Merged", 1)),
        );
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));
        let resolver = resolver(&api, &scraper, memory_cache());

        let first = resolver.get_item(42, EntityKind::Beer).await.unwrap();
        let second = resolver.get_item(42, EntityKind::Beer).await.unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(api.beer_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unresponsive_cache_does_not_block_lookups() {
        let api = Arc::new(CountingSource::new("api", Behavior::Serve).with_beer(beer(42, "A", 1)));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));
        let cache =
            EntityCache::new(Arc::new(HangingStore)).with_timeout(Duration::from_millis(20));

        let found = tokio::time::timeout(
            Duration::from_secs(2),
            resolver(&api, &scraper, cache).get_item(42, EntityKind::Beer),
        )
        .await
        .expect("lookup should not wait on the cache")
        .unwrap();

        assert_eq!(found.map(|e| e.id()), Some(42));
        assert_eq!(api.beer_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_with_transport_fault_is_skipped_without_fallback() {
        let api = Arc::new(
            CountingSource::new("api", Behavior::Serve)
                .with_beer(beer(30, "C", 1))
                .with_beer(beer(10, "A", 1))
                .with_beer(beer(20, "B", 1))
                .with_unreachable(10),
        );
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));

        let found = resolver(&api, &scraper, memory_cache())
            .search_item("x", EntityKind::Beer)
            .await
            .unwrap();

        let ids: Vec<u64> = found.iter().map(Entity::id).collect();
        assert_eq!(ids, vec![30, 20]);
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_search_is_not_a_fallback_trigger() {
        let api = Arc::new(CountingSource::new("api", Behavior::Serve));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve).with_beer(beer(1, "A", 1)));
        let resolver = resolver(&api, &scraper, EntityCache::disabled());

        assert!(resolver.search_item("nothing", EntityKind::Beer).await.unwrap().is_empty());
        assert!(resolver.search("nothing", EntityKind::Beer).await.unwrap().is_empty());
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_falls_back_on_transport_fault() {
        let api = Arc::new(CountingSource::new("api", Behavior::Unreachable));
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve).with_beer(beer(7, "G", 1)));

        let result = resolver(&api, &scraper, EntityCache::disabled())
            .search("g", EntityKind::Beer)
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(scraper.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_brewery_by_beer_caches_both_hops() {
        let api = Arc::new(
            CountingSource::new("api", Behavior::Serve)
                .with_beer(beer(1569404, "Lost In Spice", 5231))
                .with_brewery(brewery(5231, "Lervig")),
        );
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));
        let resolver = resolver(&api, &scraper, memory_cache());

        let first = resolver.get_brewery_by_beer(1569404).await.unwrap();
        let second = resolver.get_brewery_by_beer(1569404).await.unwrap();

        assert_eq!(first.map(|b| b.id), Some(5231));
        assert_eq!(lookups(&api), (1, 1));
        assert_eq!(second.map(|b| b.name), Some("Lervig".to_string()));
    }

    #[tokio::test]
    async fn test_brewery_by_beer_with_unknown_brewery_id() {
        let api = Arc::new(
            CountingSource::new("api", Behavior::Serve)
                .with_beer(beer(9, "Vanity", 0))
                .with_brewery(brewery(0, "")),
        );
        let scraper = Arc::new(CountingSource::new("scraper", Behavior::Serve));

        let found = resolver(&api, &scraper, EntityCache::disabled())
            .get_brewery_by_beer(9)
            .await
            .unwrap();
        assert_eq!(found.map(|b| b.id), Some(0));
        assert_eq!(api.brewery_lookups.load(Ordering::SeqCst), 1);
    }
}
