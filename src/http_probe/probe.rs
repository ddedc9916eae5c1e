use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use url::Url;

use super::prelude::*;
use super::report;
use crate::config::probe_config::{Candidate, validate_candidates};
use crate::error::ProbeError;

/// Longest excerpt of an error response body kept in a result.
const ERROR_EXCERPT_CHARS: usize = 100;

/// Knobs shared by every probe in a run.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub record_limit: u32,
    pub timeout_seconds: f64,
    pub preview_width: usize,
    pub limit_param: String,
}

impl ProbeSettings {
    /// Returns the request timeout if all settings are usable.
    pub fn validate(&self) -> Result<Duration, ProbeError> {
        if self.record_limit == 0 {
            return Err(ProbeError::InvalidRecordLimit(self.record_limit));
        }
        if self.preview_width == 0 {
            return Err(ProbeError::InvalidPreviewWidth(self.preview_width));
        }
        if self.timeout_seconds <= 0.0 {
            return Err(ProbeError::InvalidTimeout(self.timeout_seconds));
        }
        Duration::try_from_secs_f64(self.timeout_seconds)
            .map_err(|_| ProbeError::InvalidTimeout(self.timeout_seconds))
    }
}

/// Probe every candidate in order and collect one result per candidate.
///
/// Candidates are probed one at a time; the next request only starts once the
/// previous one has finished. A failing candidate is recorded in the report and
/// never stops the run. The only errors returned are invalid settings or an
/// invalid candidate list, both detected before the first request.
pub async fn probe(
    client: &Client,
    candidates: &[Candidate],
    settings: &ProbeSettings,
) -> Result<ProbeReport, ProbeError> {
    let timeout = settings.validate()?;
    let urls = validate_candidates(candidates)?;

    let mut report = ProbeReport::new(Utc::now());
    for (candidate, url) in candidates.iter().zip(urls) {
        tracing::debug!("Probing {} at {}", candidate.name, url);
        let result = probe_candidate(client, candidate, url, settings, timeout).await;

        match result.outcome {
            ProbeOutcome::Success => tracing::info!(
                "{}: {} records, status {:?}",
                result.name,
                result.record_count,
                result.http_status
            ),
            ProbeOutcome::EmptySuccess => tracing::info!("{}: no records", result.name),
            ProbeOutcome::HttpError | ProbeOutcome::TransportError => tracing::warn!(
                "{}: {} (status {:?}): {}",
                result.name,
                result.outcome.label(),
                result.http_status,
                result.error_message.as_deref().unwrap_or_default()
            ),
        }

        report.insert(result);
    }

    Ok(report)
}

/// Issue a single bounded GET against `url` and classify what comes back.
pub async fn probe_candidate(
    client: &Client,
    candidate: &Candidate,
    mut url: Url,
    settings: &ProbeSettings,
    timeout: Duration,
) -> ProbeResult {
    if !settings.limit_param.is_empty() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != settings.limit_param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&settings.limit_param, &settings.record_limit.to_string());
    }

    let mut result = ProbeResult {
        name: candidate.name.clone(),
        url: candidate.url.clone(),
        outcome: ProbeOutcome::TransportError,
        http_status: None,
        sample_field_names: Vec::new(),
        columns: Vec::new(),
        sample_record: None,
        record_count: 0,
        error_message: None,
        elapsed: Duration::ZERO,
    };

    let start = Instant::now();
    match client.get(url).timeout(timeout).send().await {
        Err(e) => {
            result.error_message = Some(report(&e));
        }
        Ok(response) => {
            let status = response.status();
            result.http_status = Some(status.as_u16());
            result.outcome = ProbeOutcome::HttpError;
            let body = response.text().await;

            if status != StatusCode::OK {
                let body = body.unwrap_or_default();
                result.error_message = Some(error_excerpt(&body, status));
            } else {
                match body.map_err(|e| format!("failed to read response body: {}", report(&e)))
                    .and_then(|body| parse_records(&body))
                {
                    Err(message) => result.error_message = Some(message),
                    Ok(records) => {
                        result.record_count = records.len();
                        match records.into_iter().next() {
                            None => result.outcome = ProbeOutcome::EmptySuccess,
                            Some(first) => {
                                result.outcome = ProbeOutcome::Success;
                                result.columns = first.keys().cloned().collect();
                                result.sample_field_names = result
                                    .columns
                                    .iter()
                                    .take(settings.preview_width)
                                    .cloned()
                                    .collect();
                                result.sample_record = Some(first);
                            }
                        }
                    }
                }
            }
        }
    }
    result.elapsed = start.elapsed();

    result
}

/// Parse a body as a JSON array of record objects.
fn parse_records(body: &str) -> Result<Vec<Map<String, Value>>, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {e}"))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(format!(
                    "record {i} is {}, expected an object",
                    json_kind(&other)
                )),
            })
            .collect(),
        other => Err(format!(
            "expected a JSON array of records, got {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn error_excerpt(body: &str, status: StatusCode) -> String {
    let excerpt: String = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect();
    if excerpt.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("empty response body")
            .to_string()
    } else {
        excerpt
    }
}
