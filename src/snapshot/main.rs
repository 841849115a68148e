//! Headless map snapshot.
//!
//! Runs the full load pipeline against the proxy, Airtable or a local
//! file, with an in-memory renderer and listing, and prints the resulting
//! GeoJSON and listing state as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

use projmap::airtable::{AirtableClient, DEFAULT_API_URL};
use projmap::config::MapConfig;
use projmap::listing::{MemoryEntry, MemoryListing};
use projmap::models::{FeatureCollection, Position, Row};
use projmap::render::{Flight, RecordingRenderer};
use projmap::server::DEFAULT_TABLE_NAME;
use projmap::source::{AirtableSource, DataSource, FetchError, ProxySource, StaticSource};
use projmap::{LoadOutcome, LoadReport, Session};

#[derive(Parser, Debug)]
#[command(name = "snapshot")]
#[command(about = "Load project data through the map pipeline and print the result")]
struct Args {
    /// Map configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Proxy endpoint (overrides the configuration)
    #[arg(long)]
    endpoint: Option<String>,

    /// Read rows or GeoJSON from a local file instead
    #[arg(long, conflicts_with_all = ["endpoint", "airtable", "builtin"])]
    file: Option<PathBuf>,

    /// Use the hard-coded project points
    #[arg(long, conflicts_with_all = ["endpoint", "airtable"])]
    builtin: bool,

    /// Call Airtable directly (development only)
    #[arg(long, conflicts_with = "endpoint")]
    airtable: bool,

    /// Airtable personal access token (with --airtable)
    #[arg(long, env = "AIRTABLE_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Airtable base ID (with --airtable)
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    base_id: Option<String>,

    /// Table holding the projects (with --airtable)
    #[arg(long, env = "AIRTABLE_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    table_name: String,

    /// Airtable API root (with --airtable)
    #[arg(long, env = "AIRTABLE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Sort the listing by distance from "lng,lat"
    #[arg(long)]
    near: Option<String>,

    /// Select the listing entry with this name after loading
    #[arg(long)]
    select: Option<String>,
}

enum AnySource {
    Proxy(ProxySource),
    Airtable(AirtableSource),
    Fixed(StaticSource),
}

impl DataSource for AnySource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
        match self {
            AnySource::Proxy(source) => source.fetch_rows().await,
            AnySource::Airtable(source) => source.fetch_rows().await,
            AnySource::Fixed(source) => source.fetch_rows().await,
        }
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    report: LoadReport,
    points: FeatureCollection,
    lines: FeatureCollection,
    listing: Vec<&'a MemoryEntry>,
    camera: Option<Flight>,
    popups: &'a [Position],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the snapshot to stdout
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MapConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => MapConfig::default(),
    };

    let search = args.near.as_deref().map(parse_position).transpose()?;
    let source = build_source(&args, &config)?;

    let session = Session::new(
        source,
        RecordingRenderer::new(),
        MemoryListing::default(),
        config,
    );

    let report = match session.load().await {
        LoadOutcome::Loaded(report) => report,
        LoadOutcome::Skipped => bail!("Load was skipped"),
    };
    if !report.fetched {
        warn!("Fetch failed, snapshot shows an empty map");
    }

    // The page renders one listing entry per project
    *session.listing_mut() = MemoryListing::from_points(session.store().points());
    session.bind();

    if let Some(search) = search {
        if !session.config().geocoder.contains(search) {
            warn!("{:?} lies outside the geocoder search bounds", search);
        }
        session.resort(search);
    }

    if let Some(name) = &args.select {
        let entry = session.listing().find_by_name(name);
        match entry.and_then(|entry| session.select(entry)) {
            Some(id) => info!("Selected project {} ({})", id, name),
            None => warn!("No listing entry named {:?}", name),
        }
    }

    let store = session.store();
    let renderer = session.renderer();
    let listing = session.listing();
    let snapshot = Snapshot {
        report,
        points: store.points_collection(),
        lines: store.lines_collection(),
        listing: listing.ordered().collect(),
        camera: renderer.camera,
        popups: &renderer.popups,
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn build_source(args: &Args, config: &MapConfig) -> Result<AnySource> {
    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source = StaticSource::from_json_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok(AnySource::Fixed(source));
    }

    if args.builtin {
        return Ok(AnySource::Fixed(StaticSource::builtin()));
    }

    if args.airtable {
        let (Some(token), Some(base_id)) = (&args.token, &args.base_id) else {
            bail!("--airtable needs AIRTABLE_PERSONAL_ACCESS_TOKEN and AIRTABLE_BASE_ID");
        };
        let client = AirtableClient::new(&args.api_url, token, base_id)?;
        return Ok(AnySource::Airtable(AirtableSource::new(
            client,
            &args.table_name,
        )));
    }

    let endpoint = args
        .endpoint
        .as_deref()
        .unwrap_or(&config.data.projects_endpoint);
    let endpoint =
        Url::parse(endpoint).with_context(|| format!("Invalid proxy endpoint {}", endpoint))?;
    Ok(AnySource::Proxy(ProxySource::new(endpoint)))
}

/// Parse "lng,lat"
fn parse_position(text: &str) -> Result<Position> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid position {:?}", text))?;

    match parts.as_slice() {
        [lng, lat] if lng.is_finite() && lat.is_finite() => Ok([*lng, *lat]),
        _ => bail!("Expected \"lng,lat\", got {:?}", text),
    }
}
