//! Document processor tying the renderer and the field injection together

use crate::annotate::annotate_document;
use crate::blank::{blank_document, to_bytes};
use crate::config::ServiceConfig;
use crate::error::{Result, SigformError};
use crate::forms::{SignatureBox, MANAGED_FIELDS};
use crate::read_form_fields;
use crate::render::RendererClient;

/// PDF toolkit reported by the capability check
pub const PDF_TOOLKIT: &str = "lopdf 0.34";

/// Entry point used by the HTTP handlers and the CLI.
///
/// Holds the configuration and a pooled renderer client; cheap to share
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    config: ServiceConfig,
    renderer: RendererClient,
}

impl DocumentProcessor {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let renderer = RendererClient::new(&config)?;
        Ok(Self { config, renderer })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Capability string reported by the health endpoints
    pub fn toolkit_version(&self) -> String {
        format!("sigform {} ({PDF_TOOLKIT})", env!("CARGO_PKG_VERSION"))
    }

    /// Annotate a blank page in memory and read the fields back.
    ///
    /// Exercises only the local PDF toolkit; the renderer is not contacted.
    pub fn check_toolkit(&self) -> Result<String> {
        let probe = to_bytes(&mut blank_document(1))?;
        let annotated = annotate_document(&probe, "Probe", SignatureBox::default())?;
        let found = read_form_fields(&annotated)?.len();
        if found != MANAGED_FIELDS.len() {
            return Err(SigformError::InvalidPdf(format!(
                "self-check produced {found} fields, expected {}",
                MANAGED_FIELDS.len()
            )));
        }
        Ok(self.toolkit_version())
    }

    /// Convert HTML to PDF through the external renderer
    pub async fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>> {
        self.renderer.render(html).await
    }

    /// Add the three signature fields to an existing PDF
    pub fn annotate_document(
        &self,
        pdf: &[u8],
        customer_name: &str,
        signature_box: SignatureBox,
    ) -> Result<Vec<u8>> {
        annotate_document(pdf, customer_name, signature_box)
    }

    /// Render `html`, then add the signature fields to the result
    pub async fn create_pdf_with_signature(
        &self,
        html: &str,
        customer_name: &str,
        signature_box: SignatureBox,
    ) -> Result<Vec<u8>> {
        // Reject bad geometry before spending a renderer call on it
        signature_box.validate()?;
        let rendered = self.render_html_to_pdf(html).await?;
        self.annotate_document(&rendered, customer_name, signature_box)
    }
}
