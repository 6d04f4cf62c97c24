use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

/// One row of a portal CSV download, keyed by header exactly as sent.
///
/// The portal is inconsistent about header whitespace (`" Bill Amount"` next
/// to `"Units Used"`), so headers are never trimmed here; use [`CsvRow::field`]
/// for lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CsvRow {
    fields: BTreeMap<String, String>,
}

impl CsvRow {
    pub fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    /// Cell for `name`, falling back to the `" name"` variant of the header.
    /// An exact match always wins.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .or_else(|| self.fields.get(&format!(" {name}")))
            .map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Parse a whole CSV download. Rows are returned in feed order; short rows
/// simply lack the trailing columns.
pub fn parse_feed(text: &str) -> Result<Vec<CsvRow>, csv::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(CsvRow::from_record(&headers, &record));
    }
    Ok(rows)
}
