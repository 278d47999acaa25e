use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sigform::{read_form_fields, DocumentProcessor, FieldInfo, ServiceConfig, SignatureBox};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sigform",
    about = "Add signature form fields to PDF documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Placement of the signature box; the two text fields follow it
#[derive(Args, Debug)]
struct Placement {
    /// Value of the read-only customer name field
    #[arg(short = 'n', long, default_value = "Customer")]
    customer_name: String,

    /// Left edge of the signature field (points)
    #[arg(short = 'x', long, default_value_t = 400, allow_negative_numbers = true)]
    x: i32,

    /// Bottom edge of the signature field (points)
    #[arg(short = 'y', long, default_value_t = 50, allow_negative_numbers = true)]
    y: i32,

    /// Width of all three fields
    #[arg(long, default_value_t = 100)]
    width: i32,

    /// Height of the signature field
    #[arg(long, default_value_t = 50)]
    height: i32,
}

impl Placement {
    fn signature_box(&self) -> SignatureBox {
        SignatureBox::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add the signature fields to an existing PDF
    Annotate {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        placement: Placement,
    },

    /// Render an HTML file through the configured renderer and add the fields
    Render {
        /// HTML file to render
        #[arg(long)]
        html: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Renderer API key
        #[arg(long, env = "PDF_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Renderer endpoint
        #[arg(long, env = "PDF_RENDERER_URL")]
        renderer_url: Option<String>,

        #[command(flatten)]
        placement: Placement,
    },

    /// List the form fields of a PDF
    Fields {
        /// Input PDF file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sigform=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Annotate {
            input,
            output,
            placement,
        } => {
            let pdf = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let processor = DocumentProcessor::new(ServiceConfig::default())?;
            let annotated = processor
                .annotate_document(&pdf, &placement.customer_name, placement.signature_box())
                .with_context(|| format!("Failed to annotate {}", input.display()))?;

            std::fs::write(&output, annotated)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✓ Signature fields added: {}", output.display());
        }

        Commands::Render {
            html,
            output,
            api_key,
            renderer_url,
            placement,
        } => {
            let markup = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read {}", html.display()))?;
            if markup.trim().is_empty() {
                anyhow::bail!("{} contains no HTML", html.display());
            }

            let mut config = ServiceConfig::from_env()?;
            if let Some(key) = api_key {
                config.api_key = Some(key);
            }
            if let Some(url) = renderer_url {
                config = config.renderer_url(url);
            }
            debug!("Rendering {} via {}", html.display(), config.renderer_url);

            let processor = DocumentProcessor::new(config)?;
            let pdf = processor
                .create_pdf_with_signature(
                    &markup,
                    &placement.customer_name,
                    placement.signature_box(),
                )
                .await
                .context("Failed to create PDF")?;

            std::fs::write(&output, pdf)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✓ PDF created with signature fields: {}", output.display());
        }

        Commands::Fields { input } => {
            let pdf = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let fields = read_form_fields(&pdf)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            if fields.is_empty() {
                println!("No form fields found in {}", input.display());
            }
            for field in &fields {
                println!("{}", describe(field));
            }
        }
    }

    Ok(())
}

fn describe(field: &FieldInfo) -> String {
    let kind = field.kind.map(|k| k.pdf_name()).unwrap_or("?");
    let rect = field
        .rect
        .map(|r| format!("[{} {} {} {}]", r.x, r.y, r.width, r.height))
        .unwrap_or_else(|| "[]".to_string());
    let page = field
        .page
        .map(|p| format!("page {p}"))
        .unwrap_or_else(|| "page ?".to_string());

    let mut line = format!("{}\t{}\t{}\t{}", field.name, kind, rect, page);
    if field.read_only {
        line.push_str("\tread-only");
    }
    if let Some(value) = &field.value {
        line.push_str(&format!("\t{value:?}"));
    }
    line
}
