use anyhow::{Context, Result};
use bookeasy_server::{config::Config, telemetry, App};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    telemetry::init(&config)?;

    let router = App::new(config.clone()).await?.router();
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    info!(
        address = %config.bind_address,
        capacity_mode = ?config.capacity_mode,
        status_transitions = ?config.status_transitions,
        persistent = config.database_url.is_some(),
        "bookeasy listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    opentelemetry::global::shutdown_tracer_provider();
    info!("bookeasy stopped");
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix. If a handler cannot be installed
/// that source is ignored rather than ending the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}
