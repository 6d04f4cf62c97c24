use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{StatisticMetadata, StatisticsPoint};

/// Most recent point recorded for a statistics stream, if any.
pub async fn last_point(pool: &PgPool, statistic_id: &str) -> Result<Option<StatisticsPoint>> {
    let row = sqlx::query_as::<_, StatisticsPoint>(
        r#"
        SELECT
            start,
            period_value,
            cumulative_sum
        FROM statistics
        WHERE statistic_id = $1
        ORDER BY start DESC
        LIMIT 1
        "#,
    )
    .bind(statistic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Append points to a statistics stream in one multi-row INSERT.
///
/// Callers are responsible for only passing points newer than `last_point`;
/// the table has no uniqueness constraint to fall back on.
pub async fn insert_points(
    pool: &PgPool,
    metadata: &StatisticMetadata,
    points: &[StatisticsPoint],
) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO statistics (start, statistic_id, source, unit, period_value, cumulative_sum) ",
    );

    builder.push_values(points, |mut b, p| {
        b.push_bind(p.start)
            .push_bind(&metadata.statistic_id)
            .push_bind(&metadata.source)
            .push_bind(&metadata.unit)
            .push_bind(p.period_value)
            .push_bind(p.cumulative_sum);
    });

    builder.build().execute(pool).await?;
    Ok(())
}
