// src/models/beer.rs

//! Beer entity and the references embedded in it.

use serde::{Deserialize, Serialize};

/// Minimal brewery reference embedded in a beer.
///
/// `id` is `0` when the source could not tell which brewery it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreweryShort {
    pub id: u64,
    pub name: String,
}

/// Reference to a related beer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Similar {
    pub id: u64,
    pub name: String,
}

/// A beer as resolved from the API, a scraped page, or the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: u64,
    pub name: String,
    pub style: String,
    pub description: String,

    /// Alcohol by volume, percent
    pub abv: f64,

    /// International bitterness units
    pub ibu: f64,

    /// Average rating, 0.0 when unknown
    pub rating: f64,

    /// Number of ratings
    pub raters: f64,

    pub brewery: BreweryShort,

    #[serde(default)]
    pub similar: Vec<Similar>,
}

impl Beer {
    /// Attach the brewery reference after the flat fields were decoded.
    pub fn attach_brewery(&mut self, brewery: BreweryShort) {
        self.brewery = brewery;
    }

    /// Attach similar beers after the flat fields were decoded.
    pub fn attach_similar(&mut self, similar: Vec<Similar>) {
        self.similar = similar;
    }
}
