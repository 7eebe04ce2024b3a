// src/models/selectors.rs

//! CSS selectors for scraping the provider's search and detail pages.

use serde::{Deserialize, Serialize};

/// CSS selectors and landmarks used by the page parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    /// Element carrying the reported hit count on a search page
    pub search_total: String,

    /// Selector for each result block on a search page
    pub search_item: String,

    /// Link inside a result block whose href carries the entity id
    pub search_item_link: String,

    /// Name element inside a result block
    pub search_item_name: String,

    /// Primary content container of a detail page
    pub content: String,

    /// Heading holding the entity name, looked up inside `content`
    pub name: String,

    /// Brewery line of a beer page, location line of a brewery page
    pub brewery: String,

    /// Brewery link inside the `brewery` element
    pub brewery_link: String,

    pub style: String,
    pub abv: String,
    pub ibu: String,

    /// Ratings widget
    pub rating: String,

    /// Attribute on the ratings widget holding the numeric rating
    pub rating_attr: String,

    pub raters: String,
    pub description: String,

    /// Headings scanned for the similar-beers section
    pub similar_heading: String,

    /// Heading text that marks the similar-beers section
    pub similar_heading_text: String,

    /// Links to similar beers within the section
    pub similar_link: String,

    pub facebook: String,
    pub twitter: String,
    pub url: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            search_total: "p.total".to_string(),
            search_item: "div.beer-item".to_string(),
            search_item_link: "a.label".to_string(),
            search_item_name: "p.name".to_string(),
            content: "div.content".to_string(),
            name: "h1".to_string(),
            brewery: "p.brewery".to_string(),
            brewery_link: "a".to_string(),
            style: "p.style".to_string(),
            abv: "p.abv".to_string(),
            ibu: "p.ibu".to_string(),
            rating: "div.caps".to_string(),
            rating_attr: "data-rating".to_string(),
            raters: "p.raters".to_string(),
            description: "div.beer-descrption-read-less".to_string(),
            similar_heading: "h3".to_string(),
            similar_heading_text: "Similar Beers".to_string(),
            similar_link: r#"a[data-href=":beer/similar"]"#.to_string(),
            facebook: "a.fb.tip".to_string(),
            twitter: "a.tw.tip".to_string(),
            url: "a.url.tip".to_string(),
        }
    }
}
