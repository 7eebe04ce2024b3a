// src/models/search.rs

//! Search and crawl result shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// Lightweight reference returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: u64,
    pub name: String,
}

/// One page of search hits, in page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Count reported by the provider, not the length of `entities`
    pub total: u64,
    pub entities: Vec<SearchItem>,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Summary of a crawl run: every search hit hydrated into a full record.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub total: u64,
    pub entities: Vec<Entity>,

    /// Hits whose detail page could not be fetched or parsed
    pub failures: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
