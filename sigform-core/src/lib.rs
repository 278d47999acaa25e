//! # sigform
//!
//! Adds fillable signature fields to PDF documents.
//!
//! Given a PDF (or HTML rendered to PDF by an external service) and a
//! signature box, three form fields are placed on the last page:
//!
//! - `customerName`: read-only text field 30pt below the box
//! - `signature`: interactive signature field covering the box
//! - `manualSignature`: empty text field 60pt below the box
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigform::{annotate_document, SignatureBox};
//!
//! # fn main() -> sigform::Result<()> {
//! let input = std::fs::read("contract.pdf")?;
//! let output = annotate_document(&input, "Jane Doe", SignatureBox::default())?;
//! std::fs::write("contract_signed.pdf", output)?;
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod blank;
pub mod config;
pub mod error;
pub mod forms;
pub mod processor;
pub mod render;

pub use annotate::annotate_document;
pub use config::ServiceConfig;
pub use error::{Result, SigformError};
pub use forms::{read_fields, FieldInfo, FieldKind, FieldRect, FormField, SignatureBox};
pub use processor::{DocumentProcessor, PDF_TOOLKIT};
pub use render::RendererClient;

/// Read the form fields of a serialized PDF
pub fn read_form_fields(pdf: &[u8]) -> Result<Vec<FieldInfo>> {
    let doc = lopdf::Document::load_mem(pdf)?;
    read_fields(&doc)
}
