use time::{Date, OffsetDateTime};

/// One billing period from the portal's usage history feed.
///
/// Only the billing date and the units used are mandatory; every other column
/// is allowed to be blank in the feed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsageRecord {
    pub billing_date: Date,
    pub read_type: Option<String>,
    pub avg_temp_f: Option<f64>,
    pub days_in_period: Option<u32>,
    pub units_used_ccf: f64,
    pub yearly_usage_pct: Option<f64>,
    pub bill_amount_usd: Option<f64>,
    pub cost_per_day_usd: Option<f64>,
}

impl UsageRecord {
    /// Start of the period as recorded in long-term statistics (midnight UTC).
    pub fn period_start(&self) -> OffsetDateTime {
        self.billing_date.midnight().assume_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn period_start_is_midnight_utc() {
        let record = UsageRecord {
            billing_date: date!(2024-03-14),
            read_type: None,
            avg_temp_f: None,
            days_in_period: Some(29),
            units_used_ccf: 42.0,
            yearly_usage_pct: None,
            bill_amount_usd: None,
            cost_per_day_usd: None,
        };
        assert_eq!(record.period_start(), datetime!(2024-03-14 00:00:00 UTC));
    }
}
