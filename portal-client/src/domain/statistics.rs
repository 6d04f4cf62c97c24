use time::OffsetDateTime;

pub const STATISTICS_SOURCE: &str = "nisource";
pub const STATISTIC_CONSUMPTION: &str = "nisource:consumption";
pub const STATISTIC_COST: &str = "nisource:cost";

pub const UNIT_CCF: &str = "CCF";
pub const UNIT_USD: &str = "USD";

/// A single long-term statistics row: one billing period and the running total
/// of its stream up to and including that period.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatisticsPoint {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start: OffsetDateTime,
    pub period_value: f64,
    pub cumulative_sum: f64,
}

/// Describes a statistics stream to the store that receives its points.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatisticMetadata {
    pub statistic_id: String,
    pub name: String,
    pub source: String,
    pub unit: String,
    pub has_mean: bool,
    pub has_sum: bool,
}

impl StatisticMetadata {
    pub fn consumption() -> Self {
        Self::summed(STATISTIC_CONSUMPTION, "NiSource Gas Consumption", UNIT_CCF)
    }

    pub fn cost() -> Self {
        Self::summed(STATISTIC_COST, "NiSource Gas Cost", UNIT_USD)
    }

    fn summed(statistic_id: &str, name: &str, unit: &str) -> Self {
        Self {
            statistic_id: statistic_id.to_string(),
            name: name.to_string(),
            source: STATISTICS_SOURCE.to_string(),
            unit: unit.to_string(),
            has_mean: false,
            has_sum: true,
        }
    }
}
