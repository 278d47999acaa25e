use sigform::{DocumentProcessor, ServiceConfig};
use sigform_api::{app, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigform_api=debug,sigform=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    if config.api_key().is_none() {
        warn!("PDF_API_KEY is not set; HTML rendering requests will fail until it is configured");
    }
    info!("Using renderer at {}", config.renderer_url);

    let address = config.bind_address();
    let processor = DocumentProcessor::new(config)?;
    let app = app(AppState::new(processor));

    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("sigform API listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}
