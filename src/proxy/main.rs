//! Airtable proxy server.
//!
//! Keeps the Airtable access token on the server and forwards project
//! table reads to browsers, with permissive CORS for the map page.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use projmap::airtable::DEFAULT_API_URL;
use projmap::server::{router, AppState, ProxyConfig, DEFAULT_TABLE_NAME};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "proxy")]
#[command(about = "Airtable proxy for the project map")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Airtable personal access token
    #[arg(long, env = "AIRTABLE_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Airtable base ID (appXXXXXXXXXXXXXX)
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    base_id: Option<String>,

    /// Table holding the projects
    #[arg(long, env = "AIRTABLE_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    table_name: String,

    /// Airtable API root
    #[arg(long, env = "AIRTABLE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Projmap Proxy");
    if args.token.is_none() || args.base_id.is_none() {
        warn!("Airtable token or base ID not set; /projects will answer with a configuration error");
    }

    let state = Arc::new(AppState::new(ProxyConfig {
        token: args.token,
        base_id: args.base_id,
        table_name: args.table_name,
        api_url: args.api_url,
    }));

    let app = router(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
