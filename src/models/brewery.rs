// src/models/brewery.rs

//! Brewery entity.

use serde::{Deserialize, Serialize};

/// Social and web links of a brewery. Missing links are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub twitter: String,
    pub facebook: String,
    pub url: String,
}

/// Geographic position, absent when the source does not publish it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A brewery with its full profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brewery {
    pub id: u64,
    pub name: String,

    /// Brewery category, e.g. "Micro Brewery"
    pub brewery_type: String,

    pub country: String,
    pub description: String,
    pub contact: Contact,
    pub location: Location,
    pub rating: f64,
    pub raters: u64,
}

impl Brewery {
    /// Attach contact links after the flat fields were decoded.
    pub fn attach_contact(&mut self, contact: Contact) {
        self.contact = contact;
    }

    /// Attach the location after the flat fields were decoded.
    pub fn attach_location(&mut self, location: Location) {
        self.location = location;
    }
}
