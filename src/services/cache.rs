// src/services/cache.rs

//! Best-effort entity cache.
//!
//! Every store fault degrades to a miss on read and `false` on write.
//! Nothing here returns an error to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::time;

use crate::models::{Beer, Brewery, BreweryShort, Contact, Entity, EntityKind, Location, Similar};
use crate::storage::KeyValueStore;

/// Bound on one store round trip when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

/// Entity cache over an optional key-value store.
///
/// Every store call runs under `timeout`; a store that does not answer in
/// time counts as a fault.
#[derive(Clone)]
pub struct EntityCache {
    store: Option<Arc<dyn KeyValueStore>>,
    timeout: Duration,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl EntityCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: Some(store),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> Self {
        Self {
            store: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub async fn get(&self, kind: EntityKind, id: u64) -> Option<Entity> {
        let store = self.store.as_ref()?;
        let key = kind.cache_key(id);

        let raw = match time::timeout(self.timeout, store.get(&key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                log::warn!("Cache read for {} failed: {}", key, e);
                return None;
            }
            Err(_) => {
                log::warn!("Cache read for {} timed out after {:?}", key, self.timeout);
                return None;
            }
        };

        match decode(kind, &raw) {
            Ok(entity) => {
                log::debug!("Cache hit for {}", key);
                Some(entity)
            }
            Err(e) => {
                log::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store an entity under the key it was requested by. Returns whether it was written.
    pub async fn set(&self, kind: EntityKind, id: u64, entity: &Entity) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        let key = kind.cache_key(id);

        let value = match serde_json::to_string(entity) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Cannot encode {} for cache: {}", key, e);
                return false;
            }
        };

        match time::timeout(self.timeout, store.set(&key, &value)).await {
            Ok(Ok(written)) => written,
            Ok(Err(e)) => {
                log::warn!("Cache write for {} failed: {}", key, e);
                false
            }
            Err(_) => {
                log::warn!("Cache write for {} timed out after {:?}", key, self.timeout);
                false
            }
        }
    }
}

/// Flat beer fields; nested parts are attached after decoding.
#[derive(Deserialize)]
struct BeerRecord {
    id: u64,
    name: String,
    #[serde(default)]
    style: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    abv: f64,
    #[serde(default)]
    ibu: f64,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    raters: f64,
    #[serde(default)]
    brewery: Value,
    #[serde(default)]
    similar: Value,
}

#[derive(Deserialize)]
struct BreweryRecord {
    id: u64,
    name: String,
    #[serde(default)]
    brewery_type: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    raters: u64,
    #[serde(default)]
    contact: Value,
    #[serde(default)]
    location: Value,
}

/// Rebuild an entity from its cached JSON.
///
/// The flat record is decoded first, then each nested part is decoded and
/// attached on its own. A malformed nested part falls back to its default.
fn decode(kind: EntityKind, raw: &str) -> serde_json::Result<Entity> {
    match kind {
        EntityKind::Beer => {
            let record: BeerRecord = serde_json::from_str(raw)?;
            let mut beer = Beer {
                id: record.id,
                name: record.name,
                style: record.style,
                description: record.description,
                abv: record.abv,
                ibu: record.ibu,
                rating: record.rating,
                raters: record.raters,
                ..Beer::default()
            };
            beer.attach_brewery(nested::<BreweryShort>(record.brewery));
            beer.attach_similar(nested::<Vec<Similar>>(record.similar));
            Ok(Entity::Beer(beer))
        }
        EntityKind::Brewery => {
            let record: BreweryRecord = serde_json::from_str(raw)?;
            let mut brewery = Brewery {
                id: record.id,
                name: record.name,
                brewery_type: record.brewery_type,
                country: record.country,
                description: record.description,
                rating: record.rating,
                raters: record.raters,
                ..Brewery::default()
            };
            brewery.attach_contact(nested::<Contact>(record.contact));
            brewery.attach_location(nested::<Location>(record.location));
            Ok(Entity::Brewery(brewery))
        }
    }
}

fn nested<T: serde::de::DeserializeOwned + Default>(value: Value) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_default()
}
