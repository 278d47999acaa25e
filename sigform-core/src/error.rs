use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigformError {
    #[error("PDF_API_KEY is not configured")]
    MissingApiKey,

    #[error("Renderer responded with status {status}")]
    Renderer { status: u16 },

    #[error("Renderer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Invalid signature box: {0}")]
    InvalidGeometry(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for SigformError {
    fn from(err: lopdf::Error) -> Self {
        SigformError::InvalidPdf(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SigformError>;
