mod api;
mod middleware;

use std::sync::Arc;

use storefinder_search::{NaverShoppingClient, SearchError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storefinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = match NaverShoppingClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(SearchError::MissingCredentials) => {
            tracing::warn!(
                "NAVER_CLIENT_ID / NAVER_CLIENT_SECRET not set; searches will fail until configured"
            );
            None
        }
        Err(e) => return Err(e.into()),
    };

    let shutdown = CancellationToken::new();
    let state = AppState {
        client,
        settings: Arc::new(config.search.clone()),
        shutdown: shutdown.clone(),
    };
    let app = build_app(
        state,
        rate_limit_state(config.rate_limit_max_requests, config.rate_limit_window_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "storefinder server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
    shutdown.cancel();
}
