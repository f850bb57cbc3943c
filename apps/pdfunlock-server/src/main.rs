//! PDF unlock server
//!
//! Stateless HTTP front for the decryption endpoint. Each request carries one
//! base64-encoded PDF and its password; the answer carries the same document
//! without a password.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use pdfunlock_core::endpoint::{EndpointConfig, DEFAULT_TIMEOUT_MS};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the PDF unlock server
#[derive(Parser, Debug)]
#[command(name = "pdfunlock-server")]
#[command(about = "HTTP endpoint that removes passwords from PDF files")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PDFUNLOCK_PORT", default_value = "8080")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "PDFUNLOCK_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "PDFUNLOCK_BODY_LIMIT_MB", default_value = "64")]
    body_limit_mb: usize,

    /// Processing timeout per request in milliseconds
    #[arg(long, env = "PDFUNLOCK_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Answer 400 for PDFs that have no password
    #[arg(long, env = "PDFUNLOCK_REJECT_UNENCRYPTED")]
    reject_unencrypted: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_filter = if args.verbose {
        "pdfunlock_server=debug,pdfunlock_core=debug,tower_http=debug"
    } else {
        "pdfunlock_server=info,pdfunlock_core=info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EndpointConfig {
        body_limit: args.body_limit_mb * 1024 * 1024,
        timeout: Duration::from_millis(args.timeout_ms),
        reject_unencrypted: args.reject_unencrypted,
    };

    info!("Starting PDF unlock server on {}:{}", args.host, args.port);
    info!("Body limit: {} MiB", args.body_limit_mb);
    info!("Processing timeout: {}ms", args.timeout_ms);
    if config.reject_unencrypted {
        info!("Rejecting PDFs without a password");
    }

    let app = pdfunlock_server::router(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
