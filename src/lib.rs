// src/lib.rs

//! Bakhus: beer and brewery lookups over the Untappd API, with a page
//! scraper as fallback and a best-effort cache in front.

pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
