use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::ProbeError;

pub mod client;

/// A dataset found through the portal's catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub id: String,
    pub description: String,
    /// `<base>/resource/<id>.json`, ready to be used as a probe candidate.
    pub endpoint: String,
}

/// Search the portal catalog for datasets matching `keywords`.
///
/// This is a best effort fallback: transport failures, non-200 responses and
/// bodies of an unexpected shape are logged and yield an empty list. Only
/// caller errors (a zero limit or an unusable base URL) are returned as `Err`.
pub async fn search_catalog(
    client: &Client,
    base_url: &str,
    keywords: &str,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<CatalogEntry>, ProbeError> {
    if limit == 0 {
        return Err(ProbeError::InvalidCatalogLimit(limit));
    }
    let url = client::catalog_search_url(base_url, keywords, limit).map_err(|e| {
        ProbeError::InvalidUrl {
            name: "catalog".to_string(),
            url: base_url.to_string(),
            reason: e.to_string(),
        }
    })?;

    tracing::debug!("Searching catalog at {}", url);
    match client::fetch_catalog(client, url, timeout).await {
        Ok(document) => Ok(parse_entries(&document, base_url, limit)),
        Err(e) => {
            tracing::warn!("Catalog search unavailable: {}", e);
            Ok(Vec::new())
        }
    }
}

/// Extract up to `limit` entries from a catalog search response.
/// Results without a resource name or id are skipped.
fn parse_entries(document: &Value, base_url: &str, limit: usize) -> Vec<CatalogEntry> {
    let Some(results) = document.get("results").and_then(Value::as_array) else {
        tracing::warn!("Catalog response has no results array");
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| {
            let resource = item.get("resource")?;
            let name = resource.get("name")?.as_str()?;
            let id = resource.get("id")?.as_str()?;
            let description = resource
                .get("description")
                .and_then(Value::as_str)
                .or_else(|| item.get("description").and_then(Value::as_str))
                .unwrap_or("N/A");

            Some(CatalogEntry {
                name: name.to_string(),
                id: id.to_string(),
                description: description.to_string(),
                endpoint: client::resource_url(base_url, id),
            })
        })
        .take(limit)
        .collect()
}
