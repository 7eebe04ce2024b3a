// src/models/mod.rs

//! Domain models for the resolver.
//!
//! Entities are built fresh per lookup by a source and never mutated
//! afterwards, except for the attach steps used while decoding a cached copy.

mod beer;
mod brewery;
mod config;
mod entity;
mod search;
mod selectors;

// Re-export all public types
pub use beer::{Beer, BreweryShort, Similar};
pub use brewery::{Brewery, Contact, Location};
pub use config::{ApiConfig, CacheConfig, Config, ScraperConfig};
pub use entity::{Entity, EntityKind};
pub use search::{CrawlResult, SearchItem, SearchResultSet};
pub use selectors::PageSelectors;
