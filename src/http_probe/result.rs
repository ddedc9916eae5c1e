use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// How a single probe ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// HTTP 200 with a non-empty list of records.
    Success,
    /// HTTP 200 with an empty list of records.
    EmptySuccess,
    /// A response arrived, but it was not a 200 with a list of records.
    HttpError,
    /// No response arrived at all (DNS, connect, timeout).
    TransportError,
}

impl ProbeOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::EmptySuccess => "empty",
            ProbeOutcome::HttpError => "http error",
            ProbeOutcome::TransportError => "transport error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub name: String,
    pub url: String,
    pub outcome: ProbeOutcome,
    pub http_status: Option<u16>,
    /// The first `preview_width` field names of the first record.
    pub sample_field_names: Vec<String>,
    /// Every field name of the first record.
    pub columns: Vec<String>,
    /// The first record itself, kept only when the probe succeeded.
    pub sample_record: Option<Map<String, Value>>,
    pub record_count: usize,
    pub error_message: Option<String>,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        self.outcome == ProbeOutcome::Success
    }
}

/// Results of one run keyed by candidate name, in the order the candidates
/// were probed.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub started_at: DateTime<Utc>,
    results: IndexMap<String, ProbeResult>,
}

impl ProbeReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            results: IndexMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, result: ProbeResult) {
        self.results.insert(result.name.clone(), result);
    }

    pub fn get(&self, name: &str) -> Option<&ProbeResult> {
        self.results.get(name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.values()
    }

    /// Candidates that returned at least one record.
    pub fn working(&self) -> Vec<&ProbeResult> {
        self.iter().filter(|r| r.is_success()).collect()
    }

    pub fn count(&self, outcome: ProbeOutcome) -> usize {
        self.iter().filter(|r| r.outcome == outcome).count()
    }
}
