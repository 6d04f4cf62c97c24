use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use portal_client::domain::{StatisticMetadata, StatisticsPoint};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("statistics store query failed: {0}")]
    Query(String),
    #[error("statistics store write failed: {0}")]
    Write(String),
}

/// The host's long-term statistics store, keyed by statistic id.
#[async_trait::async_trait]
pub trait StatisticsStore: Send + Sync {
    /// Latest point already recorded for the stream.
    async fn last_point(&self, statistic_id: &str) -> Result<Option<StatisticsPoint>, StoreError>;

    /// Append points, oldest first, to the stream described by `metadata`.
    async fn append(&self, metadata: &StatisticMetadata, points: &[StatisticsPoint]) -> Result<(), StoreError>;
}

/// Keeps every stream in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStatisticsStore {
    streams: Mutex<HashMap<String, Vec<StatisticsPoint>>>,
}

impl InMemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self, statistic_id: &str) -> Vec<StatisticsPoint> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(statistic_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl StatisticsStore for InMemoryStatisticsStore {
    async fn last_point(&self, statistic_id: &str) -> Result<Option<StatisticsPoint>, StoreError> {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(streams
            .get(statistic_id)
            .and_then(|points| points.iter().max_by_key(|p| p.start))
            .cloned())
    }

    async fn append(&self, metadata: &StatisticMetadata, points: &[StatisticsPoint]) -> Result<(), StoreError> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(metadata.statistic_id.clone())
            .or_default()
            .extend_from_slice(points);
        Ok(())
    }
}
