use portal_client::domain::{AccountSummary, UsageRecord};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::sources::CsvRow;

/// Everything fetched by one successful refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Oldest billing period first.
    pub usage: Vec<UsageRecord>,
    pub billing: Vec<CsvRow>,
    pub payments: Vec<CsvRow>,
    pub account: Option<AccountSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub refreshed_at: OffsetDateTime,
}

/// Current values for display sensors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readings {
    pub gas_usage_ccf: Option<f64>,
    pub bill_amount_usd: Option<f64>,
    pub balance_due_usd: Option<f64>,
    pub current_amount_due_usd: Option<f64>,
    pub past_due_usd: Option<f64>,
    pub due_date: Option<Date>,
}

impl Snapshot {
    pub fn latest_usage(&self) -> Option<&UsageRecord> {
        self.usage.last()
    }

    pub fn readings(&self) -> Readings {
        let latest = self.latest_usage();
        let account = self.account.as_ref();

        Readings {
            gas_usage_ccf: latest.map(|r| r.units_used_ccf),
            // a $0.00 bill means the period hasn't been billed yet
            bill_amount_usd: latest.and_then(|r| r.bill_amount_usd).filter(|amount| *amount != 0.0),
            balance_due_usd: account.and_then(|a| a.balance_usd),
            current_amount_due_usd: account.and_then(|a| a.current_amount_due_usd),
            past_due_usd: account.and_then(|a| a.past_due_usd).map(f64::abs),
            due_date: account.and_then(|a| a.due_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn usage(billing_date: Date, units: f64, bill: Option<f64>) -> UsageRecord {
        UsageRecord {
            billing_date,
            read_type: None,
            avg_temp_f: None,
            days_in_period: None,
            units_used_ccf: units,
            yearly_usage_pct: None,
            bill_amount_usd: bill,
            cost_per_day_usd: None,
        }
    }

    fn snapshot(usage: Vec<UsageRecord>, account: Option<AccountSummary>) -> Snapshot {
        Snapshot {
            usage,
            billing: vec![],
            payments: vec![],
            account,
            refreshed_at: datetime!(2024-03-20 06:00:00 UTC),
        }
    }

    #[test]
    fn readings_use_newest_period_and_account() {
        let snap = snapshot(
            vec![usage(date!(2024-02-14), 20.0, Some(150.0)), usage(date!(2024-03-14), 30.0, Some(185.5))],
            Some(AccountSummary {
                balance_usd: Some(185.5),
                current_amount_due_usd: Some(185.5),
                past_due_usd: Some(-12.0),
                due_date: Some(date!(2024-04-02)),
                ..AccountSummary::default()
            }),
        );

        let readings = snap.readings();
        assert_eq!(readings.gas_usage_ccf, Some(30.0));
        assert_eq!(readings.bill_amount_usd, Some(185.5));
        assert_eq!(readings.balance_due_usd, Some(185.5));
        assert_eq!(readings.past_due_usd, Some(12.0));
        assert_eq!(readings.due_date, Some(date!(2024-04-02)));
    }

    #[test]
    fn zero_bill_and_missing_account_read_as_unknown() {
        let snap = snapshot(vec![usage(date!(2024-03-14), 30.0, Some(0.0))], None);
        let readings = snap.readings();

        assert_eq!(readings.gas_usage_ccf, Some(30.0));
        assert_eq!(readings.bill_amount_usd, None);
        assert_eq!(readings.balance_due_usd, None);
        assert_eq!(readings.due_date, None);
    }

    #[test]
    fn empty_snapshot_has_no_readings() {
        assert_eq!(snapshot(vec![], None).readings(), Readings::default());
    }
}
