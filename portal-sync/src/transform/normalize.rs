//! Field-level parsing for the portal's CSV and JSON feeds.
//!
//! Cells come through as the portal renders them for humans: `"$1,185.50"`,
//! `"-5%"`, `"01/15/2024"`. Every parser trims surrounding whitespace first.

use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("invalid {kind} value '{value}'")]
    InvalidValue { kind: &'static str, value: String },
}

impl ParseError {
    fn invalid(kind: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            kind,
            value: value.to_string(),
        }
    }
}

const CSV_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn parse_finite(kind: &'static str, raw: &str, cleaned: &str) -> Result<f64, ParseError> {
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::invalid(kind, raw)),
    }
}

/// `"$185.50"` → `185.50`. Thousands separators are dropped and a minus sign
/// may sit on either side of the currency symbol.
pub fn parse_currency(value: &str) -> Result<f64, ParseError> {
    let trimmed = value.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let cleaned: String = rest.chars().filter(|c| *c != ',').collect();

    let amount = parse_finite("currency", value, &cleaned)?;
    Ok(if negative { -amount } else { amount })
}

/// `"20%"` → `20.0`.
pub fn parse_percentage(value: &str) -> Result<f64, ParseError> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_finite("percentage", value, number)
}

/// Plain numeric quantity such as CCF used or an average temperature.
pub fn parse_quantity(value: &str) -> Result<f64, ParseError> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    parse_finite("quantity", value, &cleaned)
}

pub fn parse_days(value: &str) -> Result<u32, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid("day count", value))
}

/// CSV feeds use `MM/DD/YYYY`; single-digit months and days are accepted.
pub fn parse_csv_date(value: &str) -> Result<Date, ParseError> {
    Date::parse(value.trim(), CSV_DATE).map_err(|_| ParseError::invalid("date", value))
}

/// The account feed uses `YYYY-MM-DD`, sometimes followed by a time part.
pub fn parse_iso_date(value: &str) -> Result<Date, ParseError> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, ISO_DATE).map_err(|_| ParseError::invalid("date", value))
}

/// Empty, or just a currency symbol (how the portal renders unbilled periods).
pub fn is_blank(cell: &str) -> bool {
    matches!(cell.trim(), "" | "$")
}

/// Blank cells become `None`; anything else must parse.
pub fn optional<T>(
    cell: Option<&str>,
    parse: impl Fn(&str) -> Result<T, ParseError>,
) -> Result<Option<T>, ParseError> {
    match cell {
        Some(raw) if !is_blank(raw) => parse(raw).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn currency_strips_symbol_and_separators() {
        assert_eq!(parse_currency("$185.50"), Ok(185.50));
        assert_eq!(parse_currency(" $1,232.00 "), Ok(1232.0));
        assert_eq!(parse_currency("7.03"), Ok(7.03));
        assert_eq!(parse_currency("-$12.40"), Ok(-12.40));
        assert_eq!(parse_currency("$-12.40"), Ok(-12.40));
    }

    #[test]
    fn currency_rejects_garbage() {
        assert!(parse_currency("$").is_err());
        assert!(parse_currency("N/A").is_err());
        assert!(parse_currency("$NaN").is_err());
    }

    #[test]
    fn percentage_strips_trailing_sign() {
        assert_eq!(parse_percentage("20%"), Ok(20.0));
        assert_eq!(parse_percentage("-5%"), Ok(-5.0));
        assert_eq!(parse_percentage("12.5"), Ok(12.5));
        assert!(parse_percentage("%").is_err());
    }

    #[test]
    fn quantity_and_days() {
        assert_eq!(parse_quantity("1,024"), Ok(1024.0));
        assert_eq!(parse_quantity(" 87 "), Ok(87.0));
        assert!(parse_quantity("eighty").is_err());
        assert_eq!(parse_days("31"), Ok(31));
        assert!(parse_days("-3").is_err());
    }

    #[test]
    fn csv_dates_with_and_without_padding() {
        assert_eq!(parse_csv_date("01/15/2024"), Ok(date!(2024-01-15)));
        assert_eq!(parse_csv_date("1/5/2024"), Ok(date!(2024-01-05)));
        assert!(parse_csv_date("2024-01-15").is_err());
        assert!(parse_csv_date("13/01/2024").is_err());
    }

    #[test]
    fn iso_dates_ignore_time_part() {
        assert_eq!(parse_iso_date("2025-12-29"), Ok(date!(2025-12-29)));
        assert_eq!(parse_iso_date("2025-12-29T00:00:00"), Ok(date!(2025-12-29)));
        assert!(parse_iso_date("12/29/2025").is_err());
    }

    #[test]
    fn optional_treats_blank_as_absent() {
        assert_eq!(optional(None, parse_currency), Ok(None));
        assert_eq!(optional(Some("  "), parse_currency), Ok(None));
        assert_eq!(optional(Some(" $ "), parse_currency), Ok(None));
        assert_eq!(optional(Some("$3.00"), parse_currency), Ok(Some(3.0)));
        assert!(optional(Some("abc"), parse_currency).is_err());
    }
}
