use std::env;
use std::path::Path;

use reqwest::Client;

use super::probe_config::{Candidate, ProbeConfig};
use crate::error::ProbeError;
use crate::report::display_width;

const USER_AGENT: &str = concat!("portal-probe/", env!("CARGO_PKG_VERSION"));

pub struct AppConfig {
    pub config: ProbeConfig,
    /// Where the configuration came from, for the run banner.
    pub source: String,
    pub max_name_width: usize,
}

/// Load the application configuration from a YAML file and environment variables.
/// The file named by `CONFIG_FILE` (default `config.yml`) is read when it exists;
/// otherwise the built-in candidate list is used. `RECORD_LIMIT`, `TIMEOUT_SECONDS`
/// and `PREVIEW_WIDTH` override the corresponding values from the file.
pub fn load_config() -> Result<AppConfig, ProbeError> {
    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string());

    let (config, source) = if Path::new(&config_file_location).exists() {
        let config_str = std::fs::read_to_string(&config_file_location).map_err(|source| {
            ProbeError::ConfigRead {
                path: config_file_location.clone(),
                source,
            }
        })?;
        (parse_config(&config_file_location, &config_str)?, config_file_location)
    } else {
        tracing::info!(
            "Config file {} not found, using built-in candidates",
            config_file_location
        );
        (ProbeConfig::default(), "built-in defaults".to_string())
    };

    let config = apply_overrides(config, |var| env::var(var).ok())?;
    config.validate()?;

    let max_name_width = name_column_width(&config.candidates);

    Ok(AppConfig {
        config,
        source,
        max_name_width,
    })
}

/// Width of the name column in terminal cells, so wide characters line up.
pub fn name_column_width(candidates: &[Candidate]) -> usize {
    candidates
        .iter()
        .map(|c| display_width(&c.name))
        .max()
        .unwrap_or(10)
}

pub fn parse_config(path: &str, yaml: &str) -> Result<ProbeConfig, ProbeError> {
    serde_yaml::from_str(yaml).map_err(|source| ProbeError::ConfigParse {
        path: path.to_string(),
        source,
    })
}

/// Apply environment overrides through `lookup`, which returns the raw value of
/// a variable if it is set.
pub fn apply_overrides<F>(mut config: ProbeConfig, lookup: F) -> Result<ProbeConfig, ProbeError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("RECORD_LIMIT") {
        config.record_limit = parse_env("RECORD_LIMIT", &value)?;
    }
    if let Some(value) = lookup("TIMEOUT_SECONDS") {
        config.timeout_seconds = parse_env("TIMEOUT_SECONDS", &value)?;
    }
    if let Some(value) = lookup("PREVIEW_WIDTH") {
        config.preview_width = parse_env("PREVIEW_WIDTH", &value)?;
    }
    Ok(config)
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ProbeError> {
    value.trim().parse().map_err(|_| ProbeError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Setup the HTTP client shared by all probes.
/// Timeouts are applied per request, so one client serves both the probing
/// pass and the catalog search.
pub fn setup_client() -> Result<Client, ProbeError> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}
