// src/utils/numbers.rs

//! Numeric text cleaning for scraped values like "5.2% ABV" or "1,234 Ratings".

/// Keep digits and the first decimal point, drop everything else.
pub fn clean_numeric(text: &str) -> String {
    let mut seen_dot = false;
    text.chars()
        .filter(|c| {
            if c.is_ascii_digit() {
                true
            } else if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Parse cleaned text as a float rounded to two decimals; 0.0 when nothing is left.
pub fn to_float(text: &str) -> f64 {
    let cleaned = clean_numeric(text);
    cleaned
        .parse::<f64>()
        .map(|v| (v * 100.0).round() / 100.0)
        .unwrap_or(0.0)
}

/// Parse cleaned text as an integer, truncating any fraction; 0 when nothing is left.
pub fn to_int(text: &str) -> u64 {
    let cleaned = clean_numeric(text);
    let whole = cleaned.split('.').next().unwrap_or("");
    whole.parse().unwrap_or(0)
}

/// Last run of digits, e.g. the id in `/b/lost-in-spice/1569404`.
pub fn trailing_id(text: &str) -> Option<u64> {
    text.split(|c: char| !c.is_ascii_digit())
        .rfind(|run| !run.is_empty())
        .and_then(|run| run.parse().ok())
}
