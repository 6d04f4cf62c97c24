use anyhow::{bail, Result};
use portal_sync::{config::AppConfig, observability, portal::PortalClient};

/// Verify the configured credentials against the portal without touching the
/// statistics store.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let client = PortalClient::from_config(&cfg.portal)?;

    match client.authenticate().await {
        Ok(()) => {
            tracing::info!(base_url = client.base_url(), "credentials accepted");
            Ok(())
        }
        Err(e) if e.is_auth() => bail!("invalid credentials: {e}"),
        Err(e) => bail!("cannot connect to portal: {e}"),
    }
}
