use thiserror::Error;

/// Errors that abort a run before any candidate is probed.
///
/// Failures of individual candidates are never reported through this type;
/// they end up as a [`crate::http_probe::result::ProbeOutcome`] instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("candidate name must not be empty (url: {url})")]
    EmptyName { url: String },

    #[error("duplicate candidate name: {0}")]
    DuplicateName(String),

    #[error("invalid url for {name}: {url} ({reason})")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("record limit must be at least 1, got {0}")]
    InvalidRecordLimit(u32),

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("preview width must be at least 1, got {0}")]
    InvalidPreviewWidth(usize),

    #[error("catalog search limit must be at least 1, got {0}")]
    InvalidCatalogLimit(usize),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid YAML in config file {path}: {source}")]
    ConfigParse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
