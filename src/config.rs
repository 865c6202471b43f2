use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const BASE_URL_ENV: &str = "DISH_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
}

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
}

impl Config {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        info!("Using API base URL {base_url}");
        Ok(Self { base_url })
    }
}
