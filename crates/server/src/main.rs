mod api;
mod assets;
mod config;
mod routes;
mod state;
mod uploads;
mod utils;

use config::{config_path_from_env, load_or_create_config, resolve_path};
use library::TrackCache;
use routes::app_router;
use state::AppState;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Starting");

    let config_path = config_path_from_env();
    let (config, created) = match load_or_create_config(&config_path) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("Failed to load config {:?}: {}", config_path, err);
            return Err(err.into());
        }
    };
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let bind_addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };
    let music_root = resolve_path(&config_path, &config.music.root);
    if !music_root.exists() {
        error!("Music root does not exist: {}", music_root.display());
        return Err(format!("music root does not exist: {}", music_root.display()).into());
    }
    let web_dist = resolve_path(&config_path, &config.web.dist);
    if !assets::spa_entry_exists(&web_dist) {
        warn!(
            "No {} in {}; the web client will not be served",
            assets::SPA_ENTRY,
            web_dist.display()
        );
    }

    let tracks = TrackCache::new(music_root.clone());
    let initial = tracks.clone();
    match tokio::task::spawn_blocking(move || initial.refresh()).await {
        Ok(Ok(summary)) => info!(
            "Initial scan: {} tracks, {} skipped",
            summary.count,
            summary.skipped.len()
        ),
        Ok(Err(err)) => warn!("Initial scan failed: {}", err),
        Err(err) => warn!("Initial scan join error: {}", err),
    }

    let state = AppState {
        tracks,
        music_root: music_root.clone(),
        web_dist,
        body_limit: config.server.body_limit,
    };
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}, music root: {}", bind_addr, music_root.display());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", err);
        }
    }

    info!("Shutdown signal received.");
}
