use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

use super::model::{Column, Dataset, Value};

/// Cell contents read as missing, matching the defaults of common dataframe
/// CSV readers.
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a comma-separated file whose first row is the header.
///
/// Every original column is kept in file order and row order is preserved.
/// Rows with a different field count than the header are rejected.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(guess_value_type(value));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();

    Ok(Dataset::from_columns(columns))
}

/// Load a dataset, falling back to an empty table on any failure.
///
/// The error is logged and returned alongside so the UI can show it next to
/// the dataset instead of aborting.
pub fn load_or_empty(path: &Path) -> (Dataset, Option<String>) {
    match load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} rows with columns {:?} from {}",
                dataset.len(),
                dataset.column_names(),
                path.display()
            );
            (dataset, None)
        }
        Err(e) => {
            let msg = format!("Failed to load data from {}: {e:#}", path.display());
            log::error!("{msg}");
            (Dataset::empty(), Some(msg))
        }
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

pub fn guess_value_type(s: &str) -> Value {
    if NULL_TOKENS.contains(&s.trim()) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return Value::Bool(s.eq_ignore_ascii_case("true"));
    }
    Value::Text(s.to_string())
}

/// Parse a timestamp in any of the accepted layouts. Date-only values map to
/// midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Interpret a cell as a timestamp, whether already typed or still text.
pub fn value_as_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(t) => Some(*t),
        Value::Text(s) => parse_timestamp(s),
        _ => None,
    }
}
