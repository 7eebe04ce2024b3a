// src/services/parser.rs

//! HTML to entity extraction for the provider's public pages.
//!
//! Every field is extracted on its own: a missing or malformed field falls
//! back to its default. Only a missing anchor (content container, name
//! heading, search total) rejects the whole page.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    Beer, Brewery, BreweryShort, Contact, Location, PageSelectors, SearchItem, SearchResultSet,
    Similar,
};
use crate::utils::numbers::{to_float, to_int, trailing_id};

/// Brewery links that carry a numeric id. Vanity links like `/BrewDog` do not.
const BREWERY_HREF_PATTERN: &str = r"^(?:https?://[^/]+)?/(?:brewery/(\d+)|w/[^/]+/(\d+))/?$";

/// Trailing label of the expanded description widget.
const DESCRIPTION_SUFFIX: &str = "Show Less";

/// Compiled selectors for the search, beer and brewery pages.
#[derive(Debug)]
pub struct PageParser {
    search_total: Selector,
    search_item: Selector,
    search_item_link: Selector,
    search_item_name: Selector,
    content: Selector,
    name: Selector,
    brewery: Selector,
    brewery_link: Selector,
    style: Selector,
    abv: Selector,
    ibu: Selector,
    rating: Selector,
    rating_attr: String,
    raters: Selector,
    description: Selector,
    similar_heading: Selector,
    similar_heading_text: String,
    similar_link: Selector,
    facebook: Selector,
    twitter: Selector,
    url: Selector,
    brewery_href: Regex,
}

impl PageParser {
    /// Compile all selectors up front so a bad config fails at startup.
    pub fn new(selectors: &PageSelectors) -> Result<Self> {
        Ok(Self {
            search_total: Self::parse_selector(&selectors.search_total)?,
            search_item: Self::parse_selector(&selectors.search_item)?,
            search_item_link: Self::parse_selector(&selectors.search_item_link)?,
            search_item_name: Self::parse_selector(&selectors.search_item_name)?,
            content: Self::parse_selector(&selectors.content)?,
            name: Self::parse_selector(&selectors.name)?,
            brewery: Self::parse_selector(&selectors.brewery)?,
            brewery_link: Self::parse_selector(&selectors.brewery_link)?,
            style: Self::parse_selector(&selectors.style)?,
            abv: Self::parse_selector(&selectors.abv)?,
            ibu: Self::parse_selector(&selectors.ibu)?,
            rating: Self::parse_selector(&selectors.rating)?,
            rating_attr: selectors.rating_attr.clone(),
            raters: Self::parse_selector(&selectors.raters)?,
            description: Self::parse_selector(&selectors.description)?,
            similar_heading: Self::parse_selector(&selectors.similar_heading)?,
            similar_heading_text: selectors.similar_heading_text.trim().to_string(),
            similar_link: Self::parse_selector(&selectors.similar_link)?,
            facebook: Self::parse_selector(&selectors.facebook)?,
            twitter: Self::parse_selector(&selectors.twitter)?,
            url: Self::parse_selector(&selectors.url)?,
            brewery_href: Regex::new(BREWERY_HREF_PATTERN)
                .map_err(|e| AppError::config(format!("Invalid brewery link pattern: {e}")))?,
        })
    }

    /// Parse a search results page into references, in page order.
    pub fn parse_search_page(&self, html: &str) -> Option<SearchResultSet> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let Some(total_elem) = root.select(&self.search_total).next() else {
            log::debug!("Search page has no total element; not a search page");
            return None;
        };
        let total = to_int(&text_of(total_elem));

        let mut entities = Vec::new();
        for (index, block) in root.select(&self.search_item).enumerate() {
            match self.parse_search_item(block) {
                Some(item) => entities.push(item),
                None => log::warn!("Skipping malformed search result block #{}", index),
            }
        }

        Some(SearchResultSet { total, entities })
    }

    fn parse_search_item(&self, block: ElementRef<'_>) -> Option<SearchItem> {
        let id = block
            .select(&self.search_item_link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(trailing_id)?;
        let name = first_text(block, &self.search_item_name)?;
        if name.is_empty() {
            return None;
        }
        Some(SearchItem { id, name })
    }

    /// Parse a beer detail page. `beer_id` is the id the page was fetched for.
    pub fn parse_beer_page(&self, beer_id: u64, html: &str) -> Option<Beer> {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let name = self.anchor_name(root, "beer", beer_id)?;

        let brewery = BreweryShort {
            id: self.brewery_id(root),
            name: first_text(root, &self.brewery).unwrap_or_default(),
        };

        Some(Beer {
            id: beer_id,
            name,
            style: first_text(root, &self.style).unwrap_or_default(),
            description: self.description(root),
            abv: first_text(root, &self.abv).map_or(0.0, |t| to_float(&t)),
            ibu: first_text(root, &self.ibu).map_or(0.0, |t| to_float(&t)),
            rating: self.rating(root),
            raters: first_text(root, &self.raters).map_or(0.0, |t| to_float(&t)),
            brewery,
            similar: self.similar(root),
        })
    }

    /// Parse a brewery detail page. `brewery_id` is the id the page was fetched for.
    pub fn parse_brewery_page(&self, brewery_id: u64, html: &str) -> Option<Brewery> {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let name = self.anchor_name(root, "brewery", brewery_id)?;

        Some(Brewery {
            id: brewery_id,
            name,
            brewery_type: first_text(root, &self.style).unwrap_or_default(),
            country: first_text(root, &self.brewery).unwrap_or_default(),
            description: self.description(root),
            contact: Contact {
                twitter: first_attr(root, &self.twitter, "href").unwrap_or_default(),
                facebook: first_attr(root, &self.facebook, "href").unwrap_or_default(),
                url: first_attr(root, &self.url, "href").unwrap_or_default(),
            },
            location: Location::default(),
            rating: self.rating(root),
            raters: first_text(root, &self.raters).map_or(0, |t| to_int(&t)),
        })
    }

    /// Name heading inside the content container; `None` when either is missing.
    fn anchor_name(&self, root: ElementRef<'_>, kind: &str, id: u64) -> Option<String> {
        let Some(content) = root.select(&self.content).next() else {
            log::debug!("No content container on {} page {}", kind, id);
            return None;
        };
        let name = first_text(content, &self.name).filter(|n| !n.is_empty());
        if name.is_none() {
            log::debug!("No name heading on {} page {}", kind, id);
        }
        name
    }

    fn rating(&self, root: ElementRef<'_>) -> f64 {
        first_attr(root, &self.rating, &self.rating_attr).map_or(0.0, |t| to_float(&t))
    }

    fn description(&self, root: ElementRef<'_>) -> String {
        first_text(root, &self.description)
            .map(|d| d.trim_end_matches(DESCRIPTION_SUFFIX).trim_end().to_string())
            .unwrap_or_default()
    }

    fn brewery_id(&self, root: ElementRef<'_>) -> u64 {
        root.select(&self.brewery)
            .next()
            .and_then(|line| line.select(&self.brewery_link).next())
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| self.brewery_href.captures(href.trim()))
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    fn similar(&self, root: ElementRef<'_>) -> Vec<Similar> {
        let Some(section) = root
            .select(&self.similar_heading)
            .find(|h| text_of(*h) == self.similar_heading_text)
            .and_then(|h| h.parent())
            .and_then(ElementRef::wrap)
        else {
            return Vec::new();
        };

        section
            .select(&self.similar_link)
            .filter_map(|link| {
                let id = link.value().attr("href").and_then(trailing_id)?;
                let name = text_of(link);
                (!name.is_empty()).then_some(Similar { id, name })
            })
            .collect()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Element text with whitespace runs collapsed.
fn text_of(element: ElementRef<'_>) -> String {
    let raw: Vec<&str> = element.text().collect();
    raw.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
}
