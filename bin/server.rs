// Media Analysis - Web Server
// JSON dashboard API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_analysis::api::{self, AppState};
use media_analysis::{AppConfig, DashboardSettings, RecordTable};

#[derive(Parser, Debug)]
#[command(name = "media-server", version, about = "Serve dashboard queries over HTTP")]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "MEDIA_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset file (overrides [data].path)
    #[arg(long, env = "MEDIA_ANALYSIS_DATA")]
    data: Option<PathBuf>,

    /// Port (overrides [server].port)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_analysis=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    println!("🌐 Media Analysis - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let data_path = args
        .data
        .or_else(|| config.data.path.clone())
        .context("no dataset given: pass --data or set [data].path")?;

    let table = RecordTable::load_path(&data_path, &config.data.load_options())
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;
    println!("✓ Dataset loaded: {} articles from {:?}", table.len(), data_path);

    let settings = DashboardSettings::from_config(&config.aggregate)?;
    let state = AppState::new(table, settings, config.filter.clone());

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/dashboard?from=YYYY-MM-DD&to=YYYY-MM-DD", addr);
    println!("\n   Press Ctrl+C to stop\n");
    info!(%addr, "listening");

    axum::serve(listener, api::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
