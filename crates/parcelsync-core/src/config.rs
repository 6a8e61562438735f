use std::fmt::{Debug, Formatter};

use crate::domain::UtcDateTime;
use crate::error::ConfigError;

pub const DEFAULT_API_VERSION: &str = "2024-01";
pub const DEFAULT_BASE_URL: &str = "https://api.aftership.com/tracking";

/// Validated connector configuration supplied by the runtime collaborator.
///
/// Construction fails fast on a missing credential or malformed `start_date`,
/// before any request is issued.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    api_key: String,
    start_date: Option<String>,
    api_version: String,
    base_url: String,
}

impl ConnectorConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            start_date: None,
            api_version: String::from(DEFAULT_API_VERSION),
            base_url: String::from(DEFAULT_BASE_URL),
        })
    }

    /// Earliest record date to sync on a first run.
    ///
    /// Validated as an ISO-8601 datetime with offset, but the original string
    /// is kept and later passed to the API verbatim.
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Result<Self, ConfigError> {
        let start_date = start_date.into();
        UtcDateTime::parse(&start_date).map_err(|_| ConfigError::InvalidStartDate {
            value: start_date.clone(),
        })?;

        self.start_date = Some(start_date);
        Ok(self)
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Result<Self, ConfigError> {
        let api_version = api_version.into();
        if api_version.trim().is_empty() {
            return Err(ConfigError::EmptyApiVersion);
        }

        self.api_version = api_version;
        Ok(self)
    }

    /// Override the API root, e.g. to point at a sandbox host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Full URL for a resource path, e.g. `/trackings`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, self.api_version, path)
    }
}

// The credential must never leak through Debug output or logs.
impl Debug for ConnectorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("api_key", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .finish()
    }
}
