// src/fetch/urls.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use url::Url;

/// `{base}/exchangerates/tables/{table}/?format=json`
pub fn exchange_rates_url(api_base: &str, table_type: &str) -> Result<Url> {
    endpoint(api_base, &["exchangerates", "tables", table_type, ""])
}

/// `{base}/cenyzlota/{start}/{end}?format=json`, both dates inclusive.
pub fn gold_history_url(api_base: &str, start: NaiveDate, end: NaiveDate) -> Result<Url> {
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();
    endpoint(api_base, &["cenyzlota", &start, &end])
}

fn endpoint(api_base: &str, segments: &[&str]) -> Result<Url> {
    let mut url =
        Url::parse(api_base).with_context(|| format!("parsing API base URL {}", api_base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("API base URL {} cannot take a path", api_base))?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().append_pair("format", "json");
    Ok(url)
}
