pub mod questdb;
pub mod statistics;
pub mod store;

use std::time::Duration;

use portal_client::domain::{StatisticMetadata, StatisticsPoint};
use sqlx::postgres::PgPoolOptions;

use crate::config::{SinkConfig, StoreConfig, StoreKind};

pub use questdb::QuestDbStatisticsStore;
pub use statistics::{build_points, StatisticKind, StatisticsSink};
pub use store::{InMemoryStatisticsStore, StatisticsStore, StoreError};

/// The store selected by `[store] kind` in the config file.
pub enum ConfiguredStore {
    QuestDb(QuestDbStatisticsStore),
    Memory(InMemoryStatisticsStore),
}

impl ConfiguredStore {
    pub async fn connect(store: &StoreConfig, sink: &SinkConfig) -> anyhow::Result<Self> {
        match store.kind {
            StoreKind::Memory => {
                tracing::warn!("using in-memory statistics store; nothing will persist");
                Ok(Self::Memory(InMemoryStatisticsStore::new()))
            }
            StoreKind::Questdb => {
                let uri = store
                    .uri
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.uri is required for kind = \"questdb\""))?;
                let pool = PgPoolOptions::new()
                    .max_connections(store.max_connections)
                    .connect(uri)
                    .await?;
                Ok(Self::QuestDb(QuestDbStatisticsStore::new(
                    pool,
                    sink.max_retries,
                    Duration::from_millis(sink.retry_backoff_ms),
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl StatisticsStore for ConfiguredStore {
    async fn last_point(&self, statistic_id: &str) -> Result<Option<StatisticsPoint>, StoreError> {
        match self {
            Self::QuestDb(s) => s.last_point(statistic_id).await,
            Self::Memory(s) => s.last_point(statistic_id).await,
        }
    }

    async fn append(&self, metadata: &StatisticMetadata, points: &[StatisticsPoint]) -> Result<(), StoreError> {
        match self {
            Self::QuestDb(s) => s.append(metadata, points).await,
            Self::Memory(s) => s.append(metadata, points).await,
        }
    }
}
