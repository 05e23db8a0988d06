//! Configuration for Procuret clients.
//!
//! Holds the API base URL and identification used when assembling request URLs,
//! and performs the URL assembly that percent-encodes query parameters.

use crate::query::QueryParameter;
use crate::Error;
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;
use validator::Validate;

/// Default base URL of the Procuret API.
pub const DEFAULT_API_BASE_URL: &str = "https://procuret.com/api";

/// Configuration for a Procuret client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ProcuretConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User agent sent with requests
    #[validate(length(min = 1))]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("procuret-rust/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ProcuretConfig {
    /// Create a new configuration for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_base_url: api_base_url.into(),
            user_agent: default_user_agent(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid API base URL: {e}")))
    }

    /// Build the URL for `path` below the base URL, appending `parameters` as
    /// the query string.
    ///
    /// Keys and rendered values are percent-encoded here, in order. No query
    /// string is added when `parameters` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base URL is invalid and
    /// [`Error::InvalidEndpoint`] if `path` is an absolute URL, climbs out of
    /// the base with a `..` segment, or cannot be joined onto it.
    pub fn endpoint(&self, path: &str, parameters: &[QueryParameter]) -> Result<Url, Error> {
        check_relative_path(path)?;

        let mut base = self.parse_base_url()?;
        if !base.path().ends_with('/') {
            let directory = format!("{}/", base.path());
            base.set_path(&directory);
        }

        let mut url = base.join(path.trim_start_matches('/'))?;
        if !parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(
                parameters
                    .iter()
                    .map(|parameter| (parameter.key(), parameter.rendered_value())),
            );
        }

        trace!(%url, parameters = parameters.len(), "assembled endpoint");
        Ok(url)
    }
}

fn check_relative_path(path: &str) -> Result<(), Error> {
    if path.starts_with("//") || Url::parse(path).is_ok() {
        return Err(Error::InvalidEndpoint(format!(
            "endpoint path must be relative to the API base URL: {path}"
        )));
    }

    let path_only = path.split(['?', '#']).next().unwrap_or_default();
    let climbs = path_only.split(['/', '\\']).any(|segment| {
        let segment = segment.to_ascii_lowercase();
        matches!(segment.as_str(), ".." | ".%2e" | "%2e." | "%2e%2e")
    });
    if climbs {
        return Err(Error::InvalidEndpoint(format!(
            "endpoint path must not contain `..` segments: {path}"
        )));
    }

    Ok(())
}

impl Default for ProcuretConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
        }
    }
}
