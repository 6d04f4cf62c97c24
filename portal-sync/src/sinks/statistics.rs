use std::sync::Arc;

use futures::StreamExt;
use portal_client::domain::{
    statistics::{STATISTIC_CONSUMPTION, STATISTIC_COST},
    StatisticMetadata, StatisticsPoint, UsageRecord,
};

use crate::pipeline::{Envelope, PipelineError, Sink};
use crate::sinks::store::StatisticsStore;

/// Which column of the usage history feeds a statistics stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticKind {
    /// Units used, in CCF.
    Consumption,
    /// Bill amount, in USD.
    Cost,
}

impl StatisticKind {
    pub fn statistic_id(self) -> &'static str {
        match self {
            Self::Consumption => STATISTIC_CONSUMPTION,
            Self::Cost => STATISTIC_COST,
        }
    }

    pub fn metadata(self) -> StatisticMetadata {
        match self {
            Self::Consumption => StatisticMetadata::consumption(),
            Self::Cost => StatisticMetadata::cost(),
        }
    }

    pub fn period_value(self, record: &UsageRecord) -> Option<f64> {
        match self {
            Self::Consumption => Some(record.units_used_ccf),
            Self::Cost => record.bill_amount_usd,
        }
    }
}

/// Cumulative points for `records` (oldest first) that are newer than `last`.
///
/// The running total continues from `last.cumulative_sum`, so a stream stays
/// non-decreasing even after old periods fall out of the portal's history
/// window. Records without a value for `kind`, or not strictly after the
/// previous point, produce nothing.
pub fn build_points(
    records: &[UsageRecord],
    kind: StatisticKind,
    last: Option<&StatisticsPoint>,
) -> Vec<StatisticsPoint> {
    let mut sum = last.map_or(0.0, |p| p.cumulative_sum);
    let mut cursor = last.map(|p| p.start);
    let mut points = Vec::new();

    for record in records {
        let Some(value) = kind.period_value(record) else {
            continue;
        };
        let start = record.period_start();
        if cursor.is_some_and(|c| start <= c) {
            continue;
        }

        sum += value;
        cursor = Some(start);
        points.push(StatisticsPoint {
            start,
            period_value: value,
            cumulative_sum: sum,
        });
    }

    points
}

/// Backfills one statistics stream from chronological usage records.
pub struct StatisticsSink<St> {
    store: Arc<St>,
    kind: StatisticKind,
    batch_size: usize,
}

impl<St> StatisticsSink<St> {
    pub fn new(store: Arc<St>, kind: StatisticKind, batch_size: usize) -> Self {
        Self {
            store,
            kind,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait::async_trait]
impl<St> Sink<UsageRecord> for StatisticsSink<St>
where
    St: StatisticsStore + 'static,
{
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<UsageRecord>, PipelineError>> + Send + Unpin + 'static,
    {
        let metadata = self.kind.metadata();
        let mut records = Vec::new();

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => records.push(env.payload),
                Err(e) => {
                    tracing::warn!(statistic_id = %metadata.statistic_id, error = %e, "skipping usage record");
                }
            }
        }

        // Without the last recorded point we can't tell what is new; inserting
        // anyway would duplicate history.
        let last = self
            .store
            .last_point(&metadata.statistic_id)
            .await
            .map_err(|e| PipelineError::Sink(e.to_string()))?;
        if let Some(last) = &last {
            tracing::debug!(
                statistic_id = %metadata.statistic_id,
                last_start = %last.start,
                last_sum = last.cumulative_sum,
                "found last recorded statistic"
            );
        }

        let points = build_points(&records, self.kind, last.as_ref());
        let Some(first) = points.first() else {
            tracing::debug!(statistic_id = %metadata.statistic_id, "no new statistics to insert");
            return Ok(());
        };

        tracing::info!(
            statistic_id = %metadata.statistic_id,
            count = points.len(),
            from = %first.start,
            "inserting statistics"
        );

        for batch in points.chunks(self.batch_size) {
            self.store
                .append(&metadata, batch)
                .await
                .map_err(|e| PipelineError::Sink(e.to_string()))?;
            metrics::counter!("statistics_points_inserted_total").increment(batch.len() as u64);
        }

        Ok(())
    }
}
