mod api;
mod middleware;

use std::sync::Arc;

use dogpark_places::{MarkerBoard, PipelineOptions, PlacesClient, SearchPipeline};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, seed_board, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dogpark_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = dogpark_core::RegionRegistry::from_optional_path(config.regions_path.as_deref())?;
    tracing::info!(regions = registry.len(), "region registry loaded");

    let client = PlacesClient::with_base_url(
        config.require_places_api_key()?,
        config.request_timeout_secs,
        &config.user_agent,
        &config.places_base_url,
    )?;
    let pipeline = SearchPipeline::new(
        client,
        MarkerBoard::shared(),
        PipelineOptions::from_app_config(&config),
    );

    let state = AppState {
        registry: Arc::new(registry),
        pipeline: Arc::new(pipeline),
    };
    if let Some(identifier) = config.initial_region.clone() {
        tokio::spawn(seed_board(state.clone(), identifier));
    }
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "dogpark server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
