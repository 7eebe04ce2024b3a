// src/services/api.rs

//! Client for the structured Untappd API.
//!
//! Responses are wrapped as `{"response": {...}}`. Missing nested keys
//! degrade to field defaults; a missing top-level object is a parse error.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, Beer, Brewery, BreweryShort, Contact, EntityKind, Location, SearchItem,
    SearchResultSet, Similar,
};
use crate::services::LookupSource;
use crate::utils::build_url;
use crate::utils::http::{FetchOptions, Fetcher};
use crate::utils::numbers::to_float;

/// Primary lookup source backed by the Untappd v4 API.
pub struct UntappdApi {
    fetcher: Arc<dyn Fetcher>,
    config: ApiConfig,
    concurrency: usize,
}

impl UntappdApi {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &ApiConfig, concurrency: usize) -> Self {
        Self {
            fetcher,
            config: config.clone(),
            concurrency,
        }
    }

    /// GET an endpoint with credentials appended.
    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("client_id", &self.config.client_id));
        query.push(("client_secret", &self.config.client_secret));

        let url = build_url(&self.config.base_url, path, &query)?;
        let response = self
            .fetcher
            .fetch_json(&url, &FetchOptions::default())
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl LookupSource for UntappdApi {
    fn name(&self) -> &'static str {
        "api"
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    async fn search(&self, query: &str, kind: EntityKind) -> Result<SearchResultSet> {
        let path = format!("search/{}", kind.as_str());
        let response = self.call(&path, &[("q", query)]).await?;
        parse_search(&response, kind)
    }

    async fn get_beer(&self, id: u64) -> Result<Option<Beer>> {
        let response = self.call(&format!("beer/info/{id}"), &[]).await?;
        let raw = top_level(&response, "/response/beer", || format!("beer {id}"))?;
        Ok(Some(parse_beer(id, raw)))
    }

    async fn get_brewery(&self, id: u64) -> Result<Option<Brewery>> {
        let response = self.call(&format!("brewery/info/{id}"), &[]).await?;
        let raw = top_level(&response, "/response/brewery", || format!("brewery {id}"))?;
        Ok(Some(parse_brewery(id, raw)))
    }
}

/// The object at `pointer`, or a parse error naming what was looked up.
fn top_level<'a>(
    response: &'a Value,
    pointer: &str,
    context: impl FnOnce() -> String,
) -> Result<&'a Value> {
    response
        .pointer(pointer)
        .filter(|v| v.is_object())
        .ok_or_else(|| AppError::parse(context(), format!("missing {pointer}")))
}

/// Map a search response to references. Items without an id are dropped.
fn parse_search(response: &Value, kind: EntityKind) -> Result<SearchResultSet> {
    let (collection, id_ptr, name_ptr) = match kind {
        EntityKind::Beer => ("/response/beers", "/beer/bid", "/beer/beer_name"),
        EntityKind::Brewery => (
            "/response/brewery",
            "/brewery/brewery_id",
            "/brewery/brewery_name",
        ),
    };
    let raw = top_level(response, collection, || format!("{kind} search"))?;

    let entities: Vec<SearchItem> = raw
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(SearchItem {
                        id: u64_opt(item, id_ptr)?,
                        name: str_at(item, name_ptr),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let total = u64_opt(response, "/response/found").unwrap_or(entities.len() as u64);
    Ok(SearchResultSet { total, entities })
}

/// The entity keeps `requested_id` even when the provider answers under
/// another id (merged or renumbered entries).
fn parse_beer(requested_id: u64, raw: &Value) -> Beer {
    note_renumbered("beer", requested_id, u64_opt(raw, "/bid"));

    let similar = raw
        .pointer("/similar/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(Similar {
                        id: u64_opt(item, "/beer/bid")?,
                        name: str_at(item, "/beer/beer_name"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Beer {
        id: requested_id,
        name: str_at(raw, "/beer_name"),
        style: str_at(raw, "/beer_style"),
        description: str_at(raw, "/beer_description"),
        abv: f64_at(raw, "/beer_abv"),
        ibu: f64_at(raw, "/beer_ibu"),
        rating: f64_at(raw, "/rating_score"),
        raters: f64_at(raw, "/rating_count"),
        brewery: BreweryShort {
            id: u64_opt(raw, "/brewery/brewery_id").unwrap_or(0),
            name: str_at(raw, "/brewery/brewery_name"),
        },
        similar,
    }
}

fn parse_brewery(requested_id: u64, raw: &Value) -> Brewery {
    note_renumbered("brewery", requested_id, u64_opt(raw, "/brewery_id"));

    Brewery {
        id: requested_id,
        name: str_at(raw, "/brewery_name"),
        brewery_type: str_at(raw, "/brewery_type"),
        country: str_at(raw, "/country_name"),
        description: str_at(raw, "/brewery_description"),
        contact: Contact {
            twitter: str_at(raw, "/contact/twitter"),
            facebook: str_at(raw, "/contact/facebook"),
            url: str_at(raw, "/contact/url"),
        },
        location: Location {
            lat: f64_opt(raw, "/location/brewery_lat"),
            lng: f64_opt(raw, "/location/brewery_lng"),
        },
        rating: f64_at(raw, "/rating/rating_score"),
        raters: u64_opt(raw, "/rating/count").unwrap_or(0),
    }
}

fn note_renumbered(kind: &str, requested_id: u64, answered: Option<u64>) {
    if let Some(answered) = answered.filter(|id| *id != requested_id) {
        log::debug!("{} {} answered as {}", kind, requested_id, answered);
    }
}

// --- Field extraction ---

fn str_at(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn f64_opt(value: &Value, pointer: &str) -> Option<f64> {
    match value.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => Some(to_float(s)),
        _ => None,
    }
}

fn f64_at(value: &Value, pointer: &str) -> f64 {
    f64_opt(value, pointer).unwrap_or(0.0)
}

fn u64_opt(value: &Value, pointer: &str) -> Option<u64> {
    match value.pointer(pointer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
