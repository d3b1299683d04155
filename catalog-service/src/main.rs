use catalog_service::config::CatalogConfig;
use catalog_service::services::init_metrics;
use catalog_service::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::load()?;

    init_tracing(
        "catalog-service",
        &config.telemetry.log_level,
        config.telemetry.otlp_endpoint.as_deref(),
    );

    // Recorder must be installed before the first request is counted
    init_metrics()?;

    tracing::info!(
        backend = ?config.storage.backend,
        manifest_key = %config.manifest_key,
        "Starting catalog-service"
    );

    let app = Application::build(config).await?;

    tokio::select! {
        result = app.run_until_stopped() => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {}
    }

    Ok(())
}
