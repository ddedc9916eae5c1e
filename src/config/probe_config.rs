use std::collections::HashSet;

use serde::Deserialize;
use url::Url;

use crate::error::ProbeError;
use crate::http_probe::probe::ProbeSettings;

const CHICAGO_PORTAL: &str = "https://data.cityofchicago.org";

/// The full configuration for a probing run.
/// Every field is optional in the YAML file; missing fields fall back to the
/// values used when probing the Chicago traffic datasets.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of records requested from each candidate.
    #[serde(default = "default_record_limit")]
    pub record_limit: u32,

    /// Per request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,

    /// How many field names of the first record are kept as a preview.
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,

    /// Name of the query parameter carrying the record limit.
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// The endpoints to probe, in the order they are probed.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<Candidate>,

    /// Dataset catalog used when none of the candidates return data.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// A named URL to be probed for data availability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub url: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Portal root; search goes to `<base_url>/api/catalog/v1` and derived
    /// endpoints take the form `<base_url>/resource/<id>.json`.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    #[serde(default = "default_catalog_keywords")]
    pub keywords: String,

    #[serde(default = "default_catalog_limit")]
    pub limit: usize,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            keywords: default_catalog_keywords(),
            limit: default_catalog_limit(),
            enabled: true,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            record_limit: default_record_limit(),
            timeout_seconds: default_timeout_seconds(),
            preview_width: default_preview_width(),
            limit_param: default_limit_param(),
            candidates: default_candidates(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ProbeConfig {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            record_limit: self.record_limit,
            timeout_seconds: self.timeout_seconds,
            preview_width: self.preview_width,
            limit_param: self.limit_param.clone(),
        }
    }

    /// Check every precondition of a run up front, so a bad configuration is
    /// reported before any request goes out.
    pub fn validate(&self) -> Result<(), ProbeError> {
        self.settings().validate()?;
        validate_candidates(&self.candidates)?;

        if self.catalog.limit == 0 {
            return Err(ProbeError::InvalidCatalogLimit(self.catalog.limit));
        }
        parse_http_url("catalog", &self.catalog.base_url)?;
        Ok(())
    }
}

/// Parse every candidate URL and make sure names are present and unique.
/// Returns the parsed URLs in candidate order.
pub fn validate_candidates(candidates: &[Candidate]) -> Result<Vec<Url>, ProbeError> {
    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if candidate.name.trim().is_empty() {
            return Err(ProbeError::EmptyName {
                url: candidate.url.clone(),
            });
        }
        if !seen.insert(candidate.name.as_str()) {
            return Err(ProbeError::DuplicateName(candidate.name.clone()));
        }
        urls.push(parse_http_url(&candidate.name, &candidate.url)?);
    }

    Ok(urls)
}

pub fn parse_http_url(name: &str, raw: &str) -> Result<Url, ProbeError> {
    let invalid = |reason: String| ProbeError::InvalidUrl {
        name: name.to_string(),
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn default_record_limit() -> u32 {
    2
}

fn default_timeout_seconds() -> f64 {
    10.0
}

fn default_preview_width() -> usize {
    8
}

fn default_limit_param() -> String {
    "$limit".to_string()
}

fn default_catalog_base_url() -> String {
    CHICAGO_PORTAL.to_string()
}

fn default_catalog_keywords() -> String {
    "traffic volume speed camera".to_string()
}

fn default_catalog_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Traffic related dataset identifiers on the Chicago data portal.
pub fn default_candidates() -> Vec<Candidate> {
    [
        ("traffic_crashes", "85ca-t3if"),
        ("traffic_volume", "d7gs-wdfn"),
        ("red_light_cameras", "spqx-js37"),
        ("speed_cameras", "hhq-xns9"),
        ("traffic_volume_1", "traffic-volume-counts"),
        ("traffic_volume_2", "volume"),
        ("traffic_volume_3", "traffic"),
        ("traffic_volume_4", "u77s-8q7s"),
        ("speed_cameras_1", "speed-camera"),
        ("speed_cameras_2", "speed"),
        ("speed_cameras_3", "hhqg-x9hx"),
        ("realtime_traffic", "t2qc-9pjd"),
        ("congestion", "n4j6-wkkf"),
    ]
    .into_iter()
    .map(|(name, id)| Candidate::new(name, format!("{CHICAGO_PORTAL}/resource/{id}.json")))
    .collect()
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.record_limit, 2);
        assert_eq!(config.timeout_seconds, 10.0);
        assert_eq!(config.limit_param, "$limit");
        assert_eq!(config.candidates.len(), 13);
        assert!(config.catalog.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probe_config_deserialization() {
        let yaml = r#"
                    record_limit: 3
                    timeout_seconds: 5
                    candidates:
                        - name: crashes
                          url: https://data.cityofchicago.org/resource/85ca-t3if.json
                        - name: volume
                          url: https://data.cityofchicago.org/resource/d7gs-wdfn.json
                    catalog:
                        keywords: potholes
                        enabled: false
                                    "#;

        let config: ProbeConfig = serde_yaml::from_str(yaml).expect("Invalid YAML");
        assert_eq!(config.record_limit, 3);
        assert_eq!(config.timeout_seconds, 5.0);
        assert_eq!(config.preview_width, 8);
        assert_eq!(config.candidates.len(), 2);
        assert_eq!(config.candidates[0].name, "crashes");
        assert_eq!(config.candidates[1].name, "volume");
        assert_eq!(config.catalog.keywords, "potholes");
        assert_eq!(config.catalog.limit, 10);
        assert_eq!(config.catalog.base_url, "https://data.cityofchicago.org");
        assert!(!config.catalog.enabled);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ProbeConfig = serde_yaml::from_str("{}").expect("Invalid YAML");
        assert_eq!(config.candidates, default_candidates());
    }

    #[test]
    fn test_huge_timeout_from_yaml_is_rejected() {
        let config: ProbeConfig =
            serde_yaml::from_str("timeout_seconds: 1.0e20").expect("Invalid YAML");
        assert!(matches!(config.validate(), Err(ProbeError::InvalidTimeout(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let candidates = vec![
            Candidate::new("a", "https://example.com/a.json"),
            Candidate::new("a", "https://example.com/b.json"),
        ];
        assert!(matches!(
            validate_candidates(&candidates),
            Err(ProbeError::DuplicateName(name)) if name == "a"
        ));
    }

    #[test]
    fn test_rejects_empty_name() {
        let candidates = vec![Candidate::new("  ", "https://example.com/a.json")];
        assert!(matches!(
            validate_candidates(&candidates),
            Err(ProbeError::EmptyName { .. })
        ));
    }

    #[test]
    fn test_rejects_non_http_urls() {
        for url in ["not a url", "ftp://example.com/data.json", "file:///tmp/data.json"] {
            let candidates = vec![Candidate::new("x", url)];
            assert!(
                matches!(validate_candidates(&candidates), Err(ProbeError::InvalidUrl { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut config = ProbeConfig::default();
        config.record_limit = 0;
        assert!(matches!(config.validate(), Err(ProbeError::InvalidRecordLimit(0))));

        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e20] {
            let mut config = ProbeConfig::default();
            config.timeout_seconds = timeout;
            assert!(
                matches!(config.validate(), Err(ProbeError::InvalidTimeout(_))),
                "timeout {timeout} should be rejected"
            );
        }

        let mut config = ProbeConfig::default();
        config.preview_width = 0;
        assert!(matches!(config.validate(), Err(ProbeError::InvalidPreviewWidth(0))));

        let mut config = ProbeConfig::default();
        config.catalog.limit = 0;
        assert!(matches!(config.validate(), Err(ProbeError::InvalidCatalogLimit(0))));
    }
}
