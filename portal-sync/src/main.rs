use std::{sync::Arc, time::Duration};

use anyhow::Result;
use portal_sync::{
    config::AppConfig, metrics_server, observability, portal::PortalClient, sinks::ConfiguredStore,
    RefreshCoordinator,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = Arc::new(ConfiguredStore::connect(&cfg.store, &cfg.sink).await?);
    let client = PortalClient::from_config(&cfg.portal)?;
    let coordinator = RefreshCoordinator::new(client, store, cfg.sink.batch_size);

    let interval = Duration::from_secs(cfg.refresh.interval_secs.max(60));
    tracing::info!(interval_secs = interval.as_secs(), "starting portal sync");

    coordinator
        .run(interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
