//! Utility functions and helpers.

pub mod http;
pub mod numbers;

use url::Url;

use crate::error::Result;

/// Join a path onto a base URL and append query pairs.
///
/// The base may itself carry a path (`https://api.untappd.com/v4`); the
/// joined path is appended to it rather than replacing it.
pub fn build_url(base: &str, path: &str, query: &[(&str, &str)]) -> Result<String> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter().copied());
    }
    Ok(url.to_string())
}

/// Strip the query string so credentials never reach the logs.
pub fn redact(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => url_str.split('?').next().unwrap_or(url_str).to_string(),
    }
}
