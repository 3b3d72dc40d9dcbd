use clap::Parser;
use livetv_catalog::{
    admin::PlaylistService,
    channels::IdScheme,
    create_app,
    fetch::HttpFetcher,
    settings::Settings,
    store::InMemoryPlaylistStore,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Identifier scheme for channels without tvg-id (overrides config)
    #[arg(long, value_enum)]
    ids: Option<IdScheme>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let settings = Settings::load(&args.config)?;
    info!("Configuration loaded from {}: {:?}", args.config, settings);

    let ids = args.ids.unwrap_or(settings.catalog.ids);
    let port = args.port.unwrap_or(settings.server.port);

    let fetcher = Arc::new(HttpFetcher::new(&settings.fetch)?);
    let store = Arc::new(InMemoryPlaylistStore::new());
    let service = PlaylistService::new(fetcher, store, ids);

    let seeds = settings.playlist_seeds();
    if seeds.is_empty() {
        warn!("No playlists configured; the catalog starts empty");
    }
    let imported = service.import_playlists(seeds).await;
    info!("Imported {} playlists (ids: {:?})", imported, ids);

    let app = create_app(service);

    let addr = format!("{}:{}", settings.server.host, port);
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
