use std::sync::Arc;

use portal_client::domain::UsageRecord;

use crate::pipeline::{Envelope, EnvelopeStream, Source};
use crate::sources::csv_feed::CsvRow;
use crate::transform::normalize::{
    is_blank, optional, parse_csv_date, parse_currency, parse_days, parse_percentage, parse_quantity, ParseError,
};

/// Usage history feed columns:
/// - Date (MM/DD/YYYY)
/// - Type of Read (optional)
/// - Avg Temp (optional, °F)
/// - Number of Days (optional)
/// - Units Used (CCF)
/// - Yearly Usage (optional, e.g. "20%")
/// - Bill Amount (optional, e.g. "$232.00")
/// - Cost per Day (optional, e.g. "$7.03")
pub const COL_DATE: &str = "Date";
pub const COL_READ_TYPE: &str = "Type of Read";
pub const COL_AVG_TEMP: &str = "Avg Temp";
pub const COL_DAYS: &str = "Number of Days";
pub const COL_UNITS_USED: &str = "Units Used";
pub const COL_YEARLY_USAGE: &str = "Yearly Usage";
pub const COL_BILL_AMOUNT: &str = "Bill Amount";
pub const COL_COST_PER_DAY: &str = "Cost per Day";

fn required<'a>(row: &'a CsvRow, name: &str) -> Result<&'a str, ParseError> {
    row.field(name)
        .filter(|v| !is_blank(v))
        .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
}

/// An unparseable optional cell is dropped on its own; the row survives.
fn lenient<T>(row: &CsvRow, name: &str, parse: impl Fn(&str) -> Result<T, ParseError>) -> Option<T> {
    match optional(row.field(name), parse) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(column = name, error = %e, "ignoring unparseable usage cell");
            None
        }
    }
}

fn parse_optional_string(s: Option<&str>) -> Option<String> {
    let trimmed = s?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Only `Date` and `Units Used` can reject a row.
pub fn record_from_row(row: &CsvRow) -> Result<UsageRecord, ParseError> {
    Ok(UsageRecord {
        billing_date: parse_csv_date(required(row, COL_DATE)?)?,
        read_type: parse_optional_string(row.field(COL_READ_TYPE)),
        avg_temp_f: lenient(row, COL_AVG_TEMP, parse_quantity),
        days_in_period: lenient(row, COL_DAYS, parse_days),
        units_used_ccf: parse_quantity(required(row, COL_UNITS_USED)?)?,
        yearly_usage_pct: lenient(row, COL_YEARLY_USAGE, parse_percentage),
        bill_amount_usd: lenient(row, COL_BILL_AMOUNT, parse_currency),
        cost_per_day_usd: lenient(row, COL_COST_PER_DAY, parse_currency),
    })
}

/// Turn the newest-first usage feed into chronological records.
///
/// Rows that fail to parse are logged and dropped; they never abort the rest.
pub fn parse_usage_history(rows: &[CsvRow]) -> Vec<UsageRecord> {
    let mut records: Vec<UsageRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(line, row)| match record_from_row(row) {
            Ok(r) => Some(r),
            Err(e) => {
                metrics::counter!("usage_csv_parse_errors_total").increment(1);
                tracing::warn!(row = line + 1, error = %e, "skipping unparseable usage row");
                None
            }
        })
        .collect();

    records.reverse();
    tracing::debug!(parsed = records.len(), total = rows.len(), "parsed usage history");
    records
}

/// Streams already-normalized usage records, oldest first.
pub struct UsageHistorySource {
    records: Arc<[UsageRecord]>,
}

impl UsageHistorySource {
    pub fn new(records: Arc<[UsageRecord]>) -> Self {
        Self { records }
    }
}

#[async_trait::async_trait]
impl Source<UsageRecord> for UsageHistorySource {
    async fn stream(&self) -> EnvelopeStream<UsageRecord> {
        let items: Vec<_> = self.records.iter().cloned().map(|r| Ok(Envelope::now(r))).collect();
        Box::pin(futures::stream::iter(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{build_points, StatisticKind};
    use crate::sources::csv_feed::parse_feed;
    use futures::StreamExt;
    use time::macros::date;

    const NEWEST_FIRST: &str = "\
Date,Type of Read,Avg Temp,Number of Days,Units Used,Yearly Usage, Bill Amount, Cost per Day
03/14/2024,ACTUAL READING,45,29,30,20%,$185.50,$6.40
02/14/2024,CALC BY DATA CENTER,33,31,20,-5%,$150.00,$4.84
01/14/2024,ACTUAL READING,29,30,10,,$90.25,$3.01
";

    #[test]
    fn rows_are_reversed_into_chronological_order() {
        let rows = parse_feed(NEWEST_FIRST).unwrap();
        let records = parse_usage_history(&rows);

        let dates: Vec<_> = records.iter().map(|r| r.billing_date).collect();
        assert_eq!(dates, vec![date!(2024-01-14), date!(2024-02-14), date!(2024-03-14)]);
        let units: Vec<_> = records.iter().map(|r| r.units_used_ccf).collect();
        assert_eq!(units, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn row_fields_are_normalized() {
        let rows = parse_feed(NEWEST_FIRST).unwrap();
        let newest = record_from_row(&rows[0]).unwrap();

        assert_eq!(newest.read_type.as_deref(), Some("ACTUAL READING"));
        assert_eq!(newest.avg_temp_f, Some(45.0));
        assert_eq!(newest.days_in_period, Some(29));
        assert_eq!(newest.yearly_usage_pct, Some(20.0));
        assert_eq!(newest.bill_amount_usd, Some(185.50));
        assert_eq!(newest.cost_per_day_usd, Some(6.40));

        let oldest = record_from_row(&rows[2]).unwrap();
        assert_eq!(oldest.yearly_usage_pct, None);
    }

    #[test]
    fn malformed_units_row_is_skipped_and_later_rows_survive() {
        let text = "\
Date,Units Used,Bill Amount
03/14/2024,30,$185.50
02/14/2024,lots,$150.00
01/14/2024,10,$90.25
";
        let rows = parse_feed(text).unwrap();
        let records = parse_usage_history(&rows);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].billing_date, date!(2024-01-14));
        assert_eq!(records[1].billing_date, date!(2024-03-14));
    }

    #[test]
    fn unbilled_period_keeps_its_consumption() {
        let text = "\
Date,Units Used, Bill Amount, Cost per Day,Avg Temp
03/14/2024,30,$185.50,$6.40,45
02/14/2024,20,$,$,n/a
01/14/2024,10,$90.25,$3.01,29
";
        let rows = parse_feed(text).unwrap();
        let records = parse_usage_history(&rows);

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].bill_amount_usd, None);
        assert_eq!(records[1].cost_per_day_usd, None);
        assert_eq!(records[1].avg_temp_f, None);

        let consumption: Vec<_> = build_points(&records, StatisticKind::Consumption, None)
            .iter()
            .map(|p| p.cumulative_sum)
            .collect();
        assert_eq!(consumption, vec![10.0, 30.0, 60.0]);
        let cost: Vec<_> = build_points(&records, StatisticKind::Cost, None)
            .iter()
            .map(|p| p.cumulative_sum)
            .collect();
        assert_eq!(cost, vec![90.25, 275.75]);
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let row: CsvRow = [("Date", "01/14/2024")].into_iter().collect();
        assert_eq!(
            record_from_row(&row),
            Err(ParseError::MissingColumn(COL_UNITS_USED.to_string()))
        );

        let row: CsvRow = [("Date", ""), ("Units Used", "4")].into_iter().collect();
        assert_eq!(record_from_row(&row), Err(ParseError::MissingColumn(COL_DATE.to_string())));
    }

    #[tokio::test]
    async fn source_streams_records_in_given_order() {
        let rows = parse_feed(NEWEST_FIRST).unwrap();
        let records: Arc<[UsageRecord]> = parse_usage_history(&rows).into();
        let source = UsageHistorySource::new(records);

        let streamed: Vec<_> = source
            .stream()
            .await
            .map(|item| item.unwrap().payload.units_used_ccf)
            .collect()
            .await;
        assert_eq!(streamed, vec![10.0, 20.0, 30.0]);
    }
}
