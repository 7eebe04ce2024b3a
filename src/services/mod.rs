//! Service layer for the resolver.
//!
//! - Lookup sources: the API client (`UntappdApi`) and the page scraper
//!   (`UntappdScraper`), both behind `LookupSource`
//! - Page parsing (`PageParser`)
//! - Best-effort entity cache (`EntityCache`)
//! - The front-end facade (`Resolver`)

mod api;
mod cache;
pub(crate) mod parser;
mod resolver;
mod scraper;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use api::UntappdApi;
pub use cache::EntityCache;
pub use parser::PageParser;
pub use resolver::Resolver;
pub use scraper::UntappdScraper;
pub use source::{LookupSource, hydrate};
