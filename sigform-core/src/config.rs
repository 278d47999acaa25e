//! Service configuration
//!
//! Everything the processor and the HTTP server need from the environment is
//! read once into [`ServiceConfig`] and passed down explicitly.

use crate::error::{Result, SigformError};
use std::time::Duration;

/// Renderer endpoint used when `PDF_RENDERER_URL` is not set
pub const DEFAULT_RENDERER_URL: &str = "https://html2pdf-q4n2.onrender.com/generate";

/// Default timeout for one renderer call
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound for request bodies (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration shared by the document processor and the server
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API key sent to the renderer as `x-api-key`
    pub api_key: Option<String>,
    /// Renderer endpoint accepting `{"html": ...}`
    pub renderer_url: String,
    /// Timeout applied to the renderer call
    pub render_timeout: Duration,
    /// Interface the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            renderer_url: DEFAULT_RENDERER_URL.to_string(),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// A missing API key is not an error here; it only fails the HTML path
    /// when a document is actually rendered.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = lookup("PDF_API_KEY");

        if let Some(url) = lookup("PDF_RENDERER_URL").filter(|v| !v.trim().is_empty()) {
            config.renderer_url = url.trim().to_string();
        }
        if let Some(secs) = lookup("PDF_RENDER_TIMEOUT_SECS") {
            config.render_timeout =
                Duration::from_secs(parse_var("PDF_RENDER_TIMEOUT_SECS", &secs)?);
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", &limit)?;
        }

        Ok(config)
    }

    /// Configuration with the given API key and defaults for everything else
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the renderer endpoint
    pub fn renderer_url(mut self, url: impl Into<String>) -> Self {
        self.renderer_url = url.into();
        self
    }

    /// Set the renderer timeout
    pub fn render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// The API key, if present and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SigformError::Config(format!("{name} has an invalid value: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_key(), None);
        assert_eq!(config.renderer_url, DEFAULT_RENDERER_URL);
        assert_eq!(config.render_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("PDF_API_KEY", "secret"),
            ("PDF_RENDERER_URL", "http://localhost:9000/generate"),
            ("PDF_RENDER_TIMEOUT_SECS", "5"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.renderer_url, "http://localhost:9000/generate");
        assert_eq!(config.render_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("PDF_API_KEY", "   ")])).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, SigformError::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }
}
