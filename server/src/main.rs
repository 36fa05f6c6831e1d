mod app;
mod config;
mod routes;
mod services;
mod state;
mod store;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use crate::store::DataStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = DataStore::new(config::data_dir());
    tracing::info!(data_dir = %store.dir().display(), "Loading map data...");

    let points = match store.load_points().await {
        Ok(points) => points,
        Err(e) => {
            tracing::error!(error = %e, "failed to load points");
            return;
        }
    };
    if let Err(e) = wayfinder_shared::validate_unique_ids(&points) {
        tracing::error!(error = %e, "points file is invalid");
        return;
    }
    let map = match store.load_map().await {
        Ok(map) => map,
        Err(e) => {
            tracing::error!(error = %e, "failed to load map data");
            return;
        }
    };
    let stats = match store.load_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(error = %e, "statistics unreadable, starting fresh");
            wayfinder_shared::NavigationStats::default()
        }
    };
    tracing::info!(
        points = points.len(),
        floors = map.floor_count(),
        navigations = stats.total_navigations,
        "Map data loaded"
    );

    let state = AppState::new(Some(store), points, map, stats);

    tokio::spawn(services::stats_flusher::run(state.clone()));

    let app = app::build_app(state.clone());

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Wayfinder server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    state.flush_stats().await;
    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
