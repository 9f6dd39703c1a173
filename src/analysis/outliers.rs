//! Row-level outlier detection over a chosen set of numeric columns.
//!
//! Each column is scored with the modified z-score
//! `0.6745 · |x − median| / MAD` (Iglewicz & Hoaglin). When more than half the
//! readings share one value the MAD collapses to zero (irradiance at night is
//! the usual case), so the mean absolute deviation around the median is used
//! instead, scaled by 1.253314. A column where both are zero has no spread
//! and never flags a row.
//!
//! A row is an outlier when ANY selected column flags it.

use std::collections::BTreeSet;

use thiserror::Error;

use super::stats;
use crate::data::model::Dataset;

/// Scores above this flag the cell.
pub const MODIFIED_Z_THRESHOLD: f64 = 3.5;

const MAD_SCALE: f64 = 0.6745;
const MEAN_AD_SCALE: f64 = 1.253314;
const EPS: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("no columns selected for outlier detection")]
    NoColumns,
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}

/// Rows flagged as outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSet {
    /// Flagged row indices in ascending order.
    pub rows: Vec<usize>,
    /// Flagged cells per selected column, in selection order.
    pub per_column: Vec<(String, usize)>,
    pub threshold: f64,
}

impl OutlierSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flag rows of `dataset` whose value in any of `columns` is an outlier.
///
/// Missing cells are never flagged. The dataset is not modified.
pub fn detect_outliers(dataset: &Dataset, columns: &[&str]) -> Result<OutlierSet, AnalysisError> {
    if columns.is_empty() {
        return Err(AnalysisError::NoColumns);
    }

    let mut flagged = BTreeSet::new();
    let mut per_column = Vec::with_capacity(columns.len());

    for &name in columns {
        let column = dataset
            .column(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))?;
        if !column.is_numeric() && column.missing_count() != column.len() {
            return Err(AnalysisError::NotNumeric(name.to_string()));
        }

        let rows = flag_column(&column.numeric_values());
        per_column.push((name.to_string(), rows.len()));
        flagged.extend(rows);
    }

    Ok(OutlierSet {
        rows: flagged.into_iter().collect(),
        per_column,
        threshold: MODIFIED_Z_THRESHOLD,
    })
}

/// Row indices whose modified z-score exceeds the threshold.
fn flag_column(values: &[Option<f64>]) -> Vec<usize> {
    let valid: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(center) = stats::median(&valid) else {
        return Vec::new();
    };

    let abs_dev: Vec<f64> = valid.iter().map(|v| (v - center).abs()).collect();
    let mad = stats::median(&abs_dev).unwrap_or(0.0);

    let scale = if mad > EPS {
        mad / MAD_SCALE
    } else {
        let mean_ad = stats::mean(&abs_dev).unwrap_or(0.0);
        if mean_ad <= EPS {
            return Vec::new();
        }
        mean_ad * MEAN_AD_SCALE
    };

    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| {
            let score = ((*v)? - center).abs() / scale;
            (score > MODIFIED_Z_THRESHOLD).then_some(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;
    use crate::data::model::{Column, Value};

    fn col(name: &str, vals: &[f64]) -> Column {
        Column::new(name, vals.iter().map(|&v| Value::Float(v)).collect())
    }

    fn irradiance() -> Dataset {
        // GHI row 3 sits 50 standard deviations (of the other rows) away.
        let base = [500.0, 501.0, 499.0, 500.0];
        let sd = stats::std_dev(&base).unwrap();
        Dataset::from_columns(vec![
            col("GHI", &[500.0, 501.0, 499.0, 500.0 + 50.0 * sd, 500.0]),
            col("DNI", &[300.0, 310.0, 305.0, 298.0, 302.0]),
            col("DHI", &[100.0, 102.0, 99.0, 101.0, 98.0]),
        ])
    }

    #[test]
    fn flags_single_extreme_row() {
        let ds = irradiance();
        let set = detect_outliers(&ds, &["GHI", "DNI", "DHI"]).unwrap();
        assert_eq!(set.rows, vec![3]);
        assert_eq!(set.per_column[0], ("GHI".to_string(), 1));
        assert_eq!(set.threshold, MODIFIED_Z_THRESHOLD);
    }

    #[test]
    fn flags_extreme_row_loaded_from_csv() {
        let base = [500.0, 501.0, 499.0, 500.0];
        let spike = 500.0 + 50.0 * stats::std_dev(&base).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("irradiance.csv");
        std::fs::write(
            &path,
            format!(
                "GHI,DNI,DHI\n500,300,100\n501,310,102\n499,305,99\n{spike},298,101\n500,302,98\n"
            ),
        )
        .unwrap();

        let ds = loader::load_file(&path).unwrap();
        assert_eq!(ds.len(), 5);
        let set = detect_outliers(&ds, &["GHI", "DNI", "DHI"]).unwrap();
        assert_eq!(set.rows, vec![3]);
    }

    #[test]
    fn constant_column_never_flags() {
        let ds = Dataset::from_columns(vec![col("DHI", &[7.0; 6])]);
        assert!(detect_outliers(&ds, &["DHI"]).unwrap().is_empty());
    }

    #[test]
    fn mostly_zero_column_falls_back_to_mean_deviation() {
        // Night readings: MAD is zero but the midday spike still stands out.
        let mut vals = vec![0.0; 20];
        vals[7] = 900.0;
        let ds = Dataset::from_columns(vec![col("GHI", &vals)]);
        assert_eq!(detect_outliers(&ds, &["GHI"]).unwrap().rows, vec![7]);
    }

    #[test]
    fn input_is_not_mutated() {
        let ds = irradiance();
        let before = ds.clone();
        let set = detect_outliers(&ds, &["GHI"]).unwrap();
        assert_eq!(ds, before);
        assert!(set.len() <= ds.len());
    }

    #[test]
    fn missing_cells_are_skipped() {
        let ds = Dataset::from_columns(vec![Column::new(
            "WS",
            vec![
                Value::Float(1.0),
                Value::Null,
                Value::Float(1.2),
                Value::Float(0.9),
                Value::Float(1.1),
                Value::Float(40.0),
            ],
        )]);
        assert_eq!(detect_outliers(&ds, &["WS"]).unwrap().rows, vec![5]);
    }

    #[test]
    fn precondition_errors() {
        let ds = Dataset::from_columns(vec![
            col("GHI", &[1.0, 2.0]),
            Column::new("site", vec![Value::Text("a".into()), Value::Text("b".into())]),
        ]);
        assert_eq!(detect_outliers(&ds, &[]), Err(AnalysisError::NoColumns));
        assert_eq!(
            detect_outliers(&ds, &["DNI"]),
            Err(AnalysisError::MissingColumn("DNI".into()))
        );
        assert_eq!(
            detect_outliers(&ds, &["site"]),
            Err(AnalysisError::NotNumeric("site".into()))
        );
    }

    #[test]
    fn empty_dataset_has_no_outliers() {
        let ds = Dataset::from_columns(vec![col("GHI", &[])]);
        assert!(detect_outliers(&ds, &["GHI"]).unwrap().is_empty());
    }
}
