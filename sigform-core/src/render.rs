//! Client for the external HTML-to-PDF renderer

use crate::config::ServiceConfig;
use crate::error::{Result, SigformError};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Header carrying the renderer API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// JSON body sent to the renderer
#[derive(Debug, Serialize)]
pub struct RenderPayload<'a> {
    pub html: &'a str,
}

/// Issues one POST per document to the configured renderer endpoint
#[derive(Debug, Clone)]
pub struct RendererClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl RendererClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.render_timeout)
            .build()?;

        Ok(Self {
            http,
            url: config.renderer_url.clone(),
            api_key: config.api_key().map(str::to_string),
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Render `html` and return the PDF bytes exactly as received.
    ///
    /// Only `200 OK` counts as success; any other status is reported with
    /// its code. The API key is checked before any network traffic.
    pub async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let api_key = self.api_key.as_deref().ok_or(SigformError::MissingApiKey)?;

        debug!("Sending {} bytes of HTML to {}", html.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, api_key)
            .json(&RenderPayload { html })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Renderer at {} responded with {}", self.url, status);
            return Err(SigformError::Renderer {
                status: status.as_u16(),
            });
        }

        let pdf = response.bytes().await?;
        info!("Renderer produced {} bytes", pdf.len());
        Ok(pdf.to_vec())
    }
}
