//! # sigform-api
//!
//! REST API server adding signature form fields to PDFs
//!

mod api;

pub use api::{
    add_signature_field, app, check_renderer, create_pdf_with_signature, health_check, AppError,
    AppState, CapabilityResponse, CreatePdfRequest, ErrorResponse, DEFAULT_CUSTOMER_NAME,
    PDF_FILENAME, SERVICE_NAME,
};
