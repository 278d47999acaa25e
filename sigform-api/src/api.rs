use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Json,
        Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sigform::{DocumentProcessor, SigformError, SignatureBox};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "sigform PDF signature service";

/// File name offered to clients for every generated document
pub const PDF_FILENAME: &str = "document_with_signature.pdf";

/// Customer name used when the request does not carry one
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

/// Request payload for the HTML endpoint.
///
/// Every field is optional at the JSON level so that a missing `html`
/// surfaces as a plain 400 instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePdfRequest {
    /// HTML markup forwarded to the renderer
    pub html: Option<String>,
    /// Value of the read-only customer-name field (blank means "Customer")
    pub customer_name: Option<String>,
    pub signature_x: Option<i32>,
    pub signature_y: Option<i32>,
    pub signature_width: Option<i32>,
    pub signature_height: Option<i32>,
}

impl CreatePdfRequest {
    /// Customer name, with missing or blank values replaced by the default
    pub fn customer_name(&self) -> &str {
        customer_name_or_default(self.customer_name.as_deref())
    }

    /// Signature box with defaults filled in for missing coordinates
    pub fn signature_box(&self) -> SignatureBox {
        let defaults = SignatureBox::default();
        SignatureBox::new(
            self.signature_x.unwrap_or(defaults.x),
            self.signature_y.unwrap_or(defaults.y),
            self.signature_width.unwrap_or(defaults.width),
            self.signature_height.unwrap_or(defaults.height),
        )
    }
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
}

/// Response of the capability check
#[derive(Debug, Serialize, Deserialize)]
pub struct CapabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// Application-specific error types for the API.
///
/// Neither variant puts details into the response body; they are logged.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input
    #[error("Invalid request: {0}")]
    Validation(String),
    /// Rendering, configuration or PDF errors from the processor
    #[error(transparent)]
    Processing(#[from] SigformError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(reason) => {
                warn!("Rejected request: {}", reason);
                StatusCode::BAD_REQUEST.into_response()
            }
            AppError::Processing(err) => {
                error!("PDF processing failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
}

impl AppState {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}

/// Build the application router with all routes configured
pub fn app(state: AppState) -> Router {
    let body_limit = state.processor.config().max_upload_bytes;

    Router::new()
        // Monitoring
        .route("/health", get(health_check))
        .route("/check-itext", get(check_renderer))
        // PDF operations
        .route("/create-pdf-with-signature", post(create_pdf_with_signature))
        .route("/add-signature-field", post(add_signature_field))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn pdf_response(pdf: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={PDF_FILENAME}"),
            ),
        ],
        pdf,
    )
        .into_response()
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp(),
    }))
}

/// Report the PDF toolkit capability.
///
/// Runs the local toolkit self-check only; the HTML renderer is never probed.
pub async fn check_renderer(State(state): State<AppState>) -> Response {
    match state.processor.check_toolkit() {
        Ok(version) => (
            StatusCode::OK,
            Json(CapabilityResponse {
                available: true,
                version: Some(version),
                error: None,
                timestamp: timestamp(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("PDF toolkit self-check failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CapabilityResponse {
                    available: false,
                    version: None,
                    error: Some(err.to_string()),
                    timestamp: timestamp(),
                }),
            )
                .into_response()
        }
    }
}

/// Render HTML through the external service and add the signature fields
pub async fn create_pdf_with_signature(
    State(state): State<AppState>,
    payload: Result<Json<CreatePdfRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let html = request
        .html
        .as_deref()
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| AppError::Validation("no HTML content provided".to_string()))?;

    let signature_box = request.signature_box();
    signature_box
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    info!("Creating signed PDF from {} bytes of HTML", html.len());

    let pdf = state
        .processor
        .create_pdf_with_signature(html, request.customer_name(), signature_box)
        .await?;

    Ok(pdf_response(pdf))
}

/// Add the signature fields to an uploaded PDF
pub async fn add_signature_field(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut pdf_data = None;
    let mut params = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "pdf" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;
            pdf_data = Some(bytes);
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::Validation(format!("Failed to read field '{field_name}': {e}"))
            })?;
            debug!("Multipart field '{}' = {:?}", field_name, value);
            params.insert(field_name, value);
        }
    }

    let pdf_bytes = pdf_data
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation("no PDF file uploaded".to_string()))?;

    let defaults = SignatureBox::default();
    let signature_box = SignatureBox::new(
        form_int(&params, "signatureX", defaults.x)?,
        form_int(&params, "signatureY", defaults.y)?,
        form_int(&params, "signatureWidth", defaults.width)?,
        form_int(&params, "signatureHeight", defaults.height)?,
    );
    signature_box
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let customer_name = customer_name_or_default(params.get("customerName").map(String::as_str));

    info!("Adding signature fields to uploaded PDF ({} bytes)", pdf_bytes.len());

    let pdf = state
        .processor
        .annotate_document(&pdf_bytes, customer_name, signature_box)?;

    Ok(pdf_response(pdf))
}

fn customer_name_or_default(name: Option<&str>) -> &str {
    name.filter(|name| !name.trim().is_empty()).unwrap_or(DEFAULT_CUSTOMER_NAME)
}

/// Integer form value; blank or missing values fall back to `default`
fn form_int(params: &HashMap<String, String>, name: &str, default: i32) -> Result<i32, AppError> {
    match params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Validation(format!("{name} is not an integer: {value:?}"))),
        None => Ok(default),
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Endpoint not found".to_string(),
        }),
    )
}
