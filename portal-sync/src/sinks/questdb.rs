use std::time::Duration;

use portal_client::{
    db::statistics_queries,
    domain::{StatisticMetadata, StatisticsPoint},
};
use sqlx::postgres::PgPool;

use crate::sinks::store::{StatisticsStore, StoreError};

/// Statistics store backed by QuestDB over the Postgres wire protocol.
///
/// Expects the table from `sql/schema/01_statistics.sql`.
pub struct QuestDbStatisticsStore {
    pool: PgPool,
    max_retries: u32,
    retry_backoff: Duration,
}

impl QuestDbStatisticsStore {
    pub fn new(pool: PgPool, max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            pool,
            max_retries,
            retry_backoff,
        }
    }
}

#[async_trait::async_trait]
impl StatisticsStore for QuestDbStatisticsStore {
    async fn last_point(&self, statistic_id: &str) -> Result<Option<StatisticsPoint>, StoreError> {
        statistics_queries::last_point(&self.pool, statistic_id)
            .await
            .map_err(|e| {
                metrics::counter!("statistics_store_errors_total").increment(1);
                StoreError::Query(e.to_string())
            })
    }

    async fn append(&self, metadata: &StatisticMetadata, points: &[StatisticsPoint]) -> Result<(), StoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let mut attempt: u32 = 0;
        loop {
            match statistics_queries::insert_points(&self.pool, metadata, points).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let sleep_for = self.retry_backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        statistic_id = %metadata.statistic_id,
                        "questdb statistics insert failed, retrying with backoff"
                    );
                    tokio::time::sleep(sleep_for).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        statistic_id = %metadata.statistic_id,
                        "questdb statistics insert failed, giving up"
                    );
                    metrics::counter!("statistics_store_errors_total").increment(1);
                    return Err(StoreError::Write(e.to_string()));
                }
            }
        }
    }
}
