use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::http_probe::report;

/// The ways a catalog request can fail. These are expected while the portal is
/// unreachable or has moved its search API, so callers treat them as "no results".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("unreadable body: {0}")]
    Body(String),
}

/// Build the search URL for a portal root, e.g.
/// `https://data.cityofchicago.org/api/catalog/v1?query=traffic&limit=10`.
pub fn catalog_search_url(base_url: &str, keywords: &str, limit: usize) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{}/api/catalog/v1", base_url.trim_end_matches('/')))?;
    url.query_pairs_mut()
        .append_pair("query", keywords)
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

/// Derived dataset endpoint for a catalog resource id.
pub fn resource_url(base_url: &str, id: &str) -> String {
    format!("{}/resource/{}.json", base_url.trim_end_matches('/'), id)
}

/// Issue the catalog search request and return the decoded JSON document.
pub async fn fetch_catalog(client: &Client, url: Url, timeout: Duration) -> Result<Value, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::Transport(report(&e)))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| FetchError::Body(report(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_search_url() {
        let url = catalog_search_url("https://data.cityofchicago.org/", "traffic volume", 10)
            .expect("valid url");
        assert_eq!(url.path(), "/api/catalog/v1");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "traffic volume".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_resource_url() {
        assert_eq!(
            resource_url("https://data.cityofchicago.org", "85ca-t3if"),
            "https://data.cityofchicago.org/resource/85ca-t3if.json"
        );
    }
}
