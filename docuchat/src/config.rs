//! Client configuration.
//!
//! The only tunable is the backend base address. Everything else is a fixed
//! client constant.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

/// Environment variable holding the backend base address.
pub const BASE_URL_ENV: &str = "DOCUCHAT_API_BASE_URL";

/// Hosted backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://harshkalia-24-summarise-files.hf.space/";

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Display width, in pixels, for document previews.
pub const PREVIEW_WIDTH: u32 = 400;

/// Only the first page is previewed.
pub const PREVIEW_PAGE: u32 = 1;

/// Extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".docx", ".txt"];

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    /// Build a config for an explicit base address.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL: {base_url}"))?;
        Ok(Self { base_url })
    }

    /// Read the base address from `DOCUCHAT_API_BASE_URL`, falling back to
    /// the hosted default.
    pub fn from_env() -> Result<Self> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    /// Parsed backend base address.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `upload`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClientConfig::new("http://localhost:8000/").unwrap();
        assert_eq!(config.endpoint("/upload"), "http://localhost:8000/upload");

        let config = ClientConfig::new("http://localhost:8000").unwrap();
        assert_eq!(config.endpoint("query"), "http://localhost:8000/query");
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let config = ClientConfig::new("https://example.com/api/").unwrap();
        assert_eq!(config.endpoint("clear"), "https://example.com/api/clear");
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn default_base_url_parses() {
        let config = ClientConfig::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.endpoint("upload"), format!("{DEFAULT_BASE_URL}upload"));
    }
}
