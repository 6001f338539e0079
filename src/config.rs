//! Catalog endpoint configuration

use std::time::Duration;

/// Site that item page URLs point to
pub const DEFAULT_SITE_URL: &str = "https://hanime.tv";

/// Base URL of the JSON API
pub const DEFAULT_API_URL: &str = "https://hanime.tv/api";

/// Where the catalog lives and how long a request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base of the item page URLs handed out in search results
    pub site_url: String,
    /// Base of the search, detail and sources endpoints
    pub api_url: String,
    /// Total request timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }
}

impl CatalogConfig {
    /// Replaces the site URL.
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    /// Replaces the API URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets a total request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Site URL without trailing slashes
    pub(crate) fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// API URL without trailing slashes
    pub(crate) fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.site_base(), "https://hanime.tv");
        assert_eq!(config.api_base(), "https://hanime.tv/api");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_trailing_slashes_ignored() {
        let config = CatalogConfig::default()
            .with_site_url("http://localhost:8080/")
            .with_api_url("http://localhost:8080/api//")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.site_base(), "http://localhost:8080");
        assert_eq!(config.api_base(), "http://localhost:8080/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
