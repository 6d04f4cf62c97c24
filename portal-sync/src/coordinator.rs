use std::{future::Future, sync::Arc, time::Duration};

use portal_client::domain::UsageRecord;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;

use crate::pipeline::{Pipeline, PipelineError};
use crate::portal::{PortalClient, PortalError};
use crate::sinks::{StatisticKind, StatisticsSink, StatisticsStore};
use crate::snapshot::Snapshot;
use crate::sources::{usage_history::parse_usage_history, UsageHistorySource};
use crate::transform::{check_usage_record, UsageRecordValidation};

#[derive(thiserror::Error, Debug)]
pub enum RefreshError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("portal update failed: {0}")]
    Transient(#[source] PortalError),
    #[error("statistics backfill failed: {0}")]
    Statistics(#[from] PipelineError),
    #[error("a refresh is already running")]
    Busy,
}

impl RefreshError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<PortalError> for RefreshError {
    fn from(e: PortalError) -> Self {
        match e {
            PortalError::Auth(msg) => Self::Auth(msg),
            other => Self::Transient(other),
        }
    }
}

/// Fetches the portal feeds, backfills statistics and holds the latest
/// snapshot. Refreshes never overlap.
pub struct RefreshCoordinator<St> {
    client: PortalClient,
    store: Arc<St>,
    batch_size: usize,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    in_flight: Mutex<()>,
}

impl<St> RefreshCoordinator<St>
where
    St: StatisticsStore + 'static,
{
    pub fn new(client: PortalClient, store: Arc<St>, batch_size: usize) -> Self {
        Self {
            client,
            store,
            batch_size,
            snapshot: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    /// Latest successful snapshot; stale while refreshes keep failing.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let _guard = self.in_flight.try_lock().map_err(|_| RefreshError::Busy)?;
        metrics::counter!("portal_refresh_total").increment(1);

        match self.fetch_and_backfill().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.snapshot.write().await = Some(snapshot.clone());
                tracing::info!(
                    usage_records = snapshot.usage.len(),
                    billing_records = snapshot.billing.len(),
                    payment_records = snapshot.payments.len(),
                    "refresh complete"
                );
                Ok(snapshot)
            }
            Err(e) => {
                metrics::counter!("portal_refresh_failures_total").increment(1);
                tracing::error!(error = %e, auth = e.is_auth(), "refresh failed; keeping previous snapshot");
                Err(e)
            }
        }
    }

    async fn fetch_and_backfill(&self) -> Result<Snapshot, RefreshError> {
        self.client.authenticate().await?;

        let usage_rows = self.client.usage_history().await?;
        let billing = self.client.billing_history().await?;
        let payments = self.client.payment_history().await?;
        let account = self.client.account_summary().await?;

        let records: Arc<[UsageRecord]> = parse_usage_history(&usage_rows).into();

        for (name, kind) in [
            ("consumption statistics", StatisticKind::Consumption),
            ("cost statistics", StatisticKind::Cost),
        ] {
            let pipeline: Pipeline<_, UsageRecord, _> = Pipeline {
                name,
                source: UsageHistorySource::new(records.clone()),
                transforms: vec![Arc::new(UsageRecordValidation::new(kind.statistic_id()))],
                sink: StatisticsSink::new(self.store.clone(), kind, self.batch_size),
            };
            pipeline.run().await?;
        }

        // rejections were already logged and counted by the pipelines
        let usage = records.iter().filter(|r| check_usage_record(r).is_ok()).cloned().collect();

        Ok(Snapshot {
            usage,
            billing,
            payments,
            account,
            refreshed_at: OffsetDateTime::now_utc(),
        })
    }

    /// Refresh now and then every `interval` until `shutdown` resolves.
    /// Failures are logged and left to the next tick.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // errors are already logged and counted by refresh()
                    let _ = self.refresh().await;
                }
                () = &mut shutdown => {
                    tracing::info!("refresh loop stopping");
                    return;
                }
            }
        }
    }
}
