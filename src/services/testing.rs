// src/services/testing.rs

//! Canned network and sources for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, FetchError, Result};
use crate::models::{Beer, Brewery, EntityKind, SearchItem, SearchResultSet};
use crate::services::LookupSource;
use crate::storage::{KeyValueStore, StoreError};
use crate::utils::http::{FetchOptions, Fetcher};

#[derive(Clone)]
enum Canned {
    Html(String),
    Json(Value),
    Fail,
}

/// [`Fetcher`] answering from routes keyed by URL path suffix.
///
/// Unrouted requests answer 404. Clones share routes and the request log.
#[derive(Clone, Default)]
pub struct StubFetcher {
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    requested: Arc<Mutex<Vec<String>>>,
    headers: Arc<Mutex<Vec<(String, String)>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, path: &str, canned: Canned) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), canned);
        self
    }

    pub fn html(self, path: &str, body: impl Into<String>) -> Self {
        self.route(path, Canned::Html(body.into()))
    }

    pub fn json(self, path: &str, body: Value) -> Self {
        self.route(path, Canned::Json(body))
    }

    /// Answer `path` with a 503.
    pub fn fail(self, path: &str) -> Self {
        self.route(path, Canned::Fail)
    }

    /// Hold answers for `path` back by `delay`.
    pub fn slow(self, path: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(path.to_string(), delay);
        self
    }

    /// Every URL requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Headers of the most recent request.
    pub fn last_headers(&self) -> Vec<(String, String)> {
        self.headers.lock().unwrap().clone()
    }

    async fn answer(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Canned, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        *self.headers.lock().unwrap() = options.headers.clone();

        let path = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        let canned = lookup(&self.routes, &path);
        if let Some(delay) = lookup(&self.delays, &path) {
            tokio::time::sleep(delay).await;
        }

        match canned {
            Some(Canned::Fail) => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            Some(canned) => Ok(canned),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

fn lookup<T: Clone>(table: &Mutex<HashMap<String, T>>, path: &str) -> Option<T> {
    table
        .lock()
        .unwrap()
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix.as_str()))
        .map(|(_, value)| value.clone())
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch_html(&self, url: &str, options: &FetchOptions) -> std::result::Result<String, FetchError> {
        match self.answer(url, options).await? {
            Canned::Html(body) => Ok(body),
            _ => Err(FetchError::ContentType {
                url: url.to_string(),
                content_type: "application/json".to_string(),
            }),
        }
    }

    async fn fetch_json(&self, url: &str, options: &FetchOptions) -> std::result::Result<Value, FetchError> {
        match self.answer(url, options).await? {
            Canned::Json(body) => Ok(body),
            _ => Err(FetchError::Decode {
                url: url.to_string(),
                message: "expected JSON".to_string(),
            }),
        }
    }
}

/// What a [`CountingSource`] answers for every call.
#[derive(Clone)]
pub enum Behavior {
    /// Answer from the canned entities
    Serve,
    /// Fail every call with a transport fault
    Unreachable,
    /// Fail every call with a parse fault
    Malformed,
}

/// [`LookupSource`] double that counts calls per operation.
pub struct CountingSource {
    name: &'static str,
    behavior: Behavior,
    beers: HashMap<u64, Beer>,
    breweries: HashMap<u64, Brewery>,
    hits: Vec<SearchItem>,
    delays: HashMap<u64, Duration>,
    down: HashSet<u64>,
    pub searches: AtomicUsize,
    pub beer_lookups: AtomicUsize,
    pub brewery_lookups: AtomicUsize,
}

impl CountingSource {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            beers: HashMap::new(),
            breweries: HashMap::new(),
            hits: Vec::new(),
            delays: HashMap::new(),
            down: HashSet::new(),
            searches: AtomicUsize::new(0),
            beer_lookups: AtomicUsize::new(0),
            brewery_lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_beer(mut self, beer: Beer) -> Self {
        self.hits.push(SearchItem {
            id: beer.id,
            name: beer.name.clone(),
        });
        self.beers.insert(beer.id, beer);
        self
    }

    /// Serve `beer` when `id` is requested, whatever id the record carries.
    pub fn with_beer_at(mut self, id: u64, beer: Beer) -> Self {
        self.beers.insert(id, beer);
        self
    }

    /// Hold detail lookups of `id` back by `delay`.
    pub fn with_delay(mut self, id: u64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Fail detail lookups of `id` with a transport fault.
    pub fn with_unreachable(mut self, id: u64) -> Self {
        self.down.insert(id);
        self
    }

    pub fn with_brewery(mut self, brewery: Brewery) -> Self {
        self.breweries.insert(brewery.id, brewery);
        self
    }

    /// Total calls of any kind.
    pub fn calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
            + self.beer_lookups.load(Ordering::SeqCst)
            + self.brewery_lookups.load(Ordering::SeqCst)
    }

    async fn pause(&self, id: u64) {
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn check_id(&self, id: u64) -> Result<()> {
        if self.down.contains(&id) {
            return Err(AppError::Transport(FetchError::Status {
                url: format!("https://{}.test/{}", self.name, id),
                status: StatusCode::BAD_GATEWAY,
            }));
        }
        self.check()
    }

    fn check(&self) -> Result<()> {
        match self.behavior {
            Behavior::Serve => Ok(()),
            Behavior::Unreachable => Err(AppError::Transport(FetchError::Status {
                url: format!("https://{}.test/", self.name),
                status: StatusCode::BAD_GATEWAY,
            })),
            Behavior::Malformed => Err(AppError::parse(self.name, "missing response object")),
        }
    }
}

#[async_trait]
impl LookupSource for CountingSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn concurrency(&self) -> usize {
        4
    }

    async fn search(&self, _query: &str, _kind: EntityKind) -> Result<SearchResultSet> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(SearchResultSet {
            total: self.hits.len() as u64,
            entities: self.hits.clone(),
        })
    }

    async fn get_beer(&self, id: u64) -> Result<Option<Beer>> {
        self.beer_lookups.fetch_add(1, Ordering::SeqCst);
        self.pause(id).await;
        self.check_id(id)?;
        Ok(self.beers.get(&id).cloned())
    }

    async fn get_brewery(&self, id: u64) -> Result<Option<Brewery>> {
        self.brewery_lookups.fetch_add(1, Ordering::SeqCst);
        self.pause(id).await;
        self.check_id(id)?;
        Ok(self.breweries.get(&id).cloned())
    }
}

/// Store that never answers, like a Redis host dropping packets.
pub struct HangingStore;

#[async_trait]
impl KeyValueStore for HangingStore {
    async fn get(&self, _key: &str) -> std::result::Result<Option<String>, StoreError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str) -> std::result::Result<bool, StoreError> {
        std::future::pending().await
    }
}
