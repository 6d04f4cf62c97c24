pub mod normalize;

use crate::pipeline::{Envelope, PipelineError, Transform};
use portal_client::domain::UsageRecord;
use time::macros::date;

/// Pure validation of a `UsageRecord` before it feeds long-term statistics
/// or display readings.
///
/// Rules:
/// - units used must be non-negative.
/// - a bill amount, when present, must be non-negative.
/// - billing date must be within a broad sanity window [2000-01-01, 2100-01-01).
pub fn check_usage_record(r: &UsageRecord) -> Result<(), PipelineError> {
    if r.units_used_ccf < 0.0 {
        return Err(PipelineError::Transform(format!(
            "units used must be non-negative (billing date {})",
            r.billing_date
        )));
    }

    if r.bill_amount_usd.is_some_and(|amount| amount < 0.0) {
        return Err(PipelineError::Transform(format!(
            "bill amount must be non-negative (billing date {})",
            r.billing_date
        )));
    }

    let min_date = date!(2000-01-01);
    let max_date = date!(2100-01-01);

    if r.billing_date < min_date || r.billing_date >= max_date {
        return Err(PipelineError::Transform(format!(
            "billing date {} out of allowed range",
            r.billing_date
        )));
    }

    Ok(())
}

pub fn validate_usage_record(env: Envelope<UsageRecord>) -> Result<Envelope<UsageRecord>, PipelineError> {
    check_usage_record(&env.payload)?;
    Ok(env)
}

/// Rejects invalid records on their way into one statistics stream.
#[derive(Clone)]
pub struct UsageRecordValidation {
    statistic_id: &'static str,
}

impl UsageRecordValidation {
    pub fn new(statistic_id: &'static str) -> Self {
        Self { statistic_id }
    }
}

#[async_trait::async_trait]
impl Transform<UsageRecord, UsageRecord> for UsageRecordValidation {
    async fn apply(&self, input: Envelope<UsageRecord>) -> Result<Envelope<UsageRecord>, PipelineError> {
        match validate_usage_record(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_usage_record_rejected_total", "statistic_id" => self.statistic_id)
                    .increment(1);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Date;

    fn record(billing_date: Date, units: f64, bill: Option<f64>) -> Envelope<UsageRecord> {
        Envelope::now(UsageRecord {
            billing_date,
            read_type: Some("ACTUAL READING".to_string()),
            avg_temp_f: Some(41.0),
            days_in_period: Some(30),
            units_used_ccf: units,
            yearly_usage_pct: None,
            bill_amount_usd: bill,
            cost_per_day_usd: None,
        })
    }

    #[test]
    fn usage_validation_accepts_valid_record() {
        let res = validate_usage_record(record(date!(2024-01-15), 87.0, Some(120.5)));
        assert!(res.is_ok());
    }

    #[test]
    fn usage_validation_accepts_missing_bill() {
        let res = validate_usage_record(record(date!(2024-01-15), 0.0, None));
        assert!(res.is_ok());
    }

    #[test]
    fn usage_validation_rejects_negative_units() {
        let res = validate_usage_record(record(date!(2024-01-15), -1.0, None));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn usage_validation_rejects_negative_bill() {
        let res = validate_usage_record(record(date!(2024-01-15), 10.0, Some(-4.0)));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[tokio::test]
    async fn validation_transform_passes_valid_and_rejects_invalid() {
        let validation = UsageRecordValidation::new("nisource:consumption");
        assert!(validation.apply(record(date!(2024-01-15), 3.0, None)).await.is_ok());
        assert!(validation.apply(record(date!(2024-01-15), -3.0, None)).await.is_err());
    }

    #[test]
    fn usage_validation_rejects_out_of_range_date() {
        let res = validate_usage_record(record(date!(1999-12-31), 10.0, None));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }
}
