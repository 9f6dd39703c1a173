use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::loader::value_as_timestamp;
use super::model::{Column, ColumnKind, Dataset, Value};
use crate::analysis::stats;

/// Column holding the acquisition time of each reading.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Fill value for missing text cells.
pub const MISSING_TEXT: &str = "Unknown";

// ---------------------------------------------------------------------------
// Cleaning report
// ---------------------------------------------------------------------------

/// What a cleaning pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    /// Set when the timestamp column was normalised.
    pub timestamp_column: Option<String>,
    /// Columns converted to floats.
    pub coerced_columns: Vec<String>,
    /// Number of cells filled, per column. Columns with no fills are absent.
    pub imputed: BTreeMap<String, usize>,
}

impl CleaningReport {
    pub fn total_imputed(&self) -> usize {
        self.imputed.values().sum()
    }

    /// Human readable lines for the UI.
    pub fn steps(&self) -> Vec<String> {
        let mut steps = Vec::new();
        if let Some(col) = &self.timestamp_column {
            steps.push(format!("Parsed '{col}' as timestamps"));
        }
        if !self.coerced_columns.is_empty() {
            steps.push(format!(
                "Coerced to numeric: {}",
                self.coerced_columns.join(", ")
            ));
        }
        for (col, n) in &self.imputed {
            steps.push(format!("Filled {n} missing values in '{col}'"));
        }
        if steps.is_empty() {
            steps.push("No changes needed".to_string());
        }
        steps
    }
}

/// A cleaned dataset together with the report of what changed.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub dataset: Dataset,
    pub report: CleaningReport,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Clean `dataset` and persist the result to `output_path`, replacing any
/// existing file there. Parent directories are created as needed.
///
/// An empty input still produces an (empty) output file.
pub fn clean(dataset: &Dataset, output_path: &Path) -> Result<Cleaned> {
    let cleaned = clean_in_memory(dataset);
    write_csv(&cleaned.dataset, output_path)?;
    log::info!(
        "Cleaned {} rows ({} cells imputed) → {}",
        cleaned.dataset.len(),
        cleaned.report.total_imputed(),
        output_path.display()
    );
    Ok(cleaned)
}

/// The cleaning pass without the file side effect.
///
/// Rows and columns are never dropped. Missing values are imputed: median for
/// numeric columns, mode for boolean columns, [`MISSING_TEXT`] for text and
/// all-empty columns, forward then backward fill for timestamps.
pub fn clean_in_memory(dataset: &Dataset) -> Cleaned {
    let mut report = CleaningReport::default();

    let columns = dataset
        .columns
        .iter()
        .map(|col| {
            let mut col = col.clone();
            if col.name == TIMESTAMP_COLUMN && normalize_timestamps(&mut col) {
                report.timestamp_column = Some(col.name.clone());
            } else if coerce_numeric(&mut col) {
                report.coerced_columns.push(col.name.clone());
            }
            let filled = impute_missing(&mut col);
            if filled > 0 {
                report.imputed.insert(col.name.clone(), filled);
            }
            col
        })
        .collect();

    Cleaned {
        dataset: Dataset::from_columns(columns),
        report,
    }
}

/// Write header and rows as comma-separated text.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    if dataset.width() > 0 {
        writer
            .write_record(dataset.column_names())
            .context("writing CSV header")?;
        for row in 0..dataset.len() {
            let record: Vec<String> = dataset
                .columns
                .iter()
                .map(|c| c.values[row].to_csv_field())
                .collect();
            writer
                .write_record(&record)
                .with_context(|| format!("writing CSV row {row}"))?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Cleaning steps
// ---------------------------------------------------------------------------

/// Convert the column to timestamp cells. Returns `false` (column untouched)
/// when nothing parses, or when the column is already fully typed.
fn normalize_timestamps(col: &mut Column) -> bool {
    if col.kind() == ColumnKind::Timestamp {
        return false;
    }
    let parsed: Vec<Value> = col
        .values
        .iter()
        .map(|v| value_as_timestamp(v).map_or(Value::Null, Value::Timestamp))
        .collect();
    if parsed.iter().all(Value::is_null) {
        return false;
    }
    col.values = parsed;
    true
}

/// Convert a mostly-numeric column to floats. Returns `true` when any cell
/// changed.
fn coerce_numeric(col: &mut Column) -> bool {
    let non_null = col.values.iter().filter(|v| !v.is_null()).count();
    let numeric = col.values.iter().filter(|v| cell_as_f64(v).is_some()).count();
    if numeric == 0 || numeric * 2 < non_null {
        return false;
    }

    let mut changed = false;
    for v in col.values.iter_mut() {
        let coerced = cell_as_f64(v).map_or(Value::Null, Value::Float);
        if *v != coerced {
            *v = coerced;
            changed = true;
        }
    }
    changed
}

fn cell_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        other => other.as_f64(),
    }
}

/// Fill missing cells according to the column kind. Returns the fill count.
fn impute_missing(col: &mut Column) -> usize {
    let missing = col.missing_count();
    if missing == 0 {
        return 0;
    }

    match col.kind() {
        ColumnKind::Numeric => {
            let median = stats::median(&col.valid_numbers()).unwrap_or(0.0);
            fill_nulls(col, Value::Float(median));
        }
        ColumnKind::Boolean => {
            let trues = col.values.iter().filter(|v| **v == Value::Bool(true)).count();
            let falses = col.values.iter().filter(|v| **v == Value::Bool(false)).count();
            fill_nulls(col, Value::Bool(trues > falses));
        }
        ColumnKind::Timestamp => {
            forward_fill(&mut col.values);
            col.values.reverse();
            forward_fill(&mut col.values);
            col.values.reverse();
        }
        ColumnKind::Text | ColumnKind::Empty => {
            fill_nulls(col, Value::Text(MISSING_TEXT.to_string()));
        }
    }
    missing
}

fn fill_nulls(col: &mut Column, fill: Value) {
    for v in col.values.iter_mut().filter(|v| v.is_null()) {
        *v = fill.clone();
    }
}

fn forward_fill(values: &mut [Value]) {
    let mut last: Option<Value> = None;
    for v in values.iter_mut() {
        if v.is_null() {
            if let Some(prev) = &last {
                *v = prev.clone();
            }
        } else {
            last = Some(v.clone());
        }
    }
}
