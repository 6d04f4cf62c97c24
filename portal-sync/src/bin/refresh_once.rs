use std::sync::Arc;

use anyhow::Result;
use portal_sync::{config::AppConfig, observability, portal::PortalClient, sinks::ConfiguredStore, RefreshCoordinator};

/// Run a single refresh (including the statistics backfill) and print the
/// resulting snapshot and sensor readings as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration (point PORTAL_SYNC_CONFIG at a `kind = "memory"` store for a dry run).
    let cfg = AppConfig::load()?;

    let store = Arc::new(ConfiguredStore::connect(&cfg.store, &cfg.sink).await?);
    let client = PortalClient::from_config(&cfg.portal)?;
    let coordinator = RefreshCoordinator::new(client, store, cfg.sink.batch_size);

    let snapshot = coordinator.refresh().await?;
    let output = serde_json::json!({
        "readings": snapshot.readings(),
        "snapshot": &*snapshot,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
