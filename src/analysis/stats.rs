//! Descriptive statistics over dataset columns.
//!
//! Quantiles use linear interpolation between closest ranks and the standard
//! deviation is the sample (n − 1) estimate, matching the usual dataframe
//! `describe()` output.

use crate::data::model::{Column, Dataset};

/// Variance below this is treated as zero.
const EPS: f64 = 1e-12;

pub fn mean(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        return None;
    }
    Some(vals.iter().sum::<f64>() / vals.len() as f64)
}

/// Sample standard deviation. `None` for fewer than two values.
pub fn std_dev(vals: &[f64]) -> Option<f64> {
    if vals.len() < 2 {
        return None;
    }
    let m = mean(vals)?;
    let ss: f64 = vals.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (vals.len() - 1) as f64).sqrt())
}

fn sorted(vals: &[f64]) -> Vec<f64> {
    let mut s = vals.to_vec();
    s.sort_by(|a, b| a.total_cmp(b));
    s
}

/// Quantile of already sorted values, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

pub fn quantile(vals: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(vals), q)
}

pub fn median(vals: &[f64]) -> Option<f64> {
    quantile(vals, 0.5)
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// Summary row for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize(column: &Column) -> ColumnSummary {
    let vals = sorted(&column.valid_numbers());
    ColumnSummary {
        name: column.name.clone(),
        count: vals.len(),
        mean: mean(&vals),
        std: std_dev(&vals),
        min: vals.first().copied(),
        q25: quantile_sorted(&vals, 0.25),
        median: quantile_sorted(&vals, 0.5),
        q75: quantile_sorted(&vals, 0.75),
        max: vals.last().copied(),
    }
}

/// Summaries of every numeric column, in column order.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset.numeric_columns().map(summarize).collect()
}

/// Everything the EDA tab shows for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EdaSummary {
    pub rows: usize,
    pub columns: usize,
    pub describe: Vec<ColumnSummary>,
    pub missing: Vec<(String, usize)>,
    pub duplicates: usize,
}

impl EdaSummary {
    pub fn of(dataset: &Dataset) -> Self {
        EdaSummary {
            rows: dataset.len(),
            columns: dataset.width(),
            describe: describe(dataset),
            missing: dataset.missing_counts(),
            duplicates: dataset.duplicate_rows(),
        }
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over rows where both values are present. `None` when
/// fewer than two pairs exist or either side has no variance.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx < EPS || syy < EPS {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation matrix of the given columns. The diagonal is 1 for any column
/// with variance.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(columns: &[&Column]) -> CorrelationMatrix {
    let data: Vec<Vec<Option<f64>>> = columns.iter().map(|c| c.numeric_values()).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        labels: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Box plots and histograms
// ---------------------------------------------------------------------------

/// Tukey box: quartiles with whiskers at the most extreme values within
/// 1.5 × IQR of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub name: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers.
    pub fliers: Vec<f64>,
}

pub fn box_summary(name: &str, vals: &[f64]) -> Option<BoxSummary> {
    let s = sorted(vals);
    let q1 = quantile_sorted(&s, 0.25)?;
    let median = quantile_sorted(&s, 0.5)?;
    let q3 = quantile_sorted(&s, 0.75)?;
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside = s.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let lower_whisker = inside.clone().next().unwrap_or(q1);
    let upper_whisker = inside.last().unwrap_or(q3);
    let fliers = s
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxSummary {
        name: name.to_string(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        fliers,
    })
}

/// Equal-width histogram over `[min, max]`. Returns `(bin_start, width,
/// count)` per bin.
pub fn histogram(vals: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if vals.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.abs() < EPS {
        return vec![(min - 0.5, 1.0, vals.len())];
    }
    let width = range / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in vals {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, width, c))
        .collect()
}

/// Keep every k-th element so at most `max_points` remain. Order is kept and
/// the result is deterministic.
pub fn decimate<T: Clone>(items: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 || items.len() <= max_points {
        return items.to_vec();
    }
    let stride = items.len().div_ceil(max_points);
    items.iter().step_by(stride).cloned().collect()
}
