/// Chart layer: which charts apply to a dataset, and the data each one draws.
///
/// ```text
///   Dataset ──► REGISTRY (required columns → builder)
///                   │  requirement met?
///                   ▼
///              builder(&Dataset) ──► Result<ChartData, RenderError>
///                   │
///                   ▼
///              ui::plot draws Ok, ui::tabs shows Err inline
/// ```
///
/// Builders are pure, so everything except the final drawing is testable
/// without a UI.
pub mod builders;

use thiserror::Error;

use crate::analysis::outliers::AnalysisError;
use crate::analysis::stats::{BoxSummary, CorrelationMatrix};
use crate::analysis::wind::WindRose;
use crate::data::model::Dataset;
use crate::state::Tab;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single chart could not be produced. Scoped to that chart only.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("no numeric data in '{0}'")]
    NoNumericData(String),
    #[error("no parseable timestamps in '{0}'")]
    NoTimestamps(String),
    #[error("{0}")]
    InsufficientData(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub x_label: String,
    pub y_label: String,
    /// X values are seconds since the Unix epoch.
    pub time_axis: bool,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub x_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierChart {
    pub columns: Vec<String>,
    pub outlier_rows: usize,
    pub total_rows: usize,
    pub threshold: f64,
    pub boxes: Vec<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairCell {
    Histogram(Vec<Bar>),
    Scatter(Vec<[f64; 2]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairGrid {
    pub labels: Vec<String>,
    /// `cells[row][col]`: y from `labels[row]`, x from `labels[col]`.
    pub cells: Vec<Vec<PairCell>>,
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Heatmap(CorrelationMatrix),
    Lines(LineChart),
    WindRose(WindRose),
    Histogram(HistogramChart),
    Scatter(ScatterChart),
    Outliers(OutlierChart),
    PairGrid(PairGrid),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Columns a chart needs before it is attempted.
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    Always,
    All(&'static [&'static str]),
    Any(&'static [&'static str]),
}

impl Requirement {
    pub fn is_met(&self, dataset: &Dataset) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::All(cols) => dataset.has_columns(cols),
            Requirement::Any(cols) => cols.iter().any(|c| dataset.has_column(c)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    /// Upper bound on points per drawn series.
    pub max_points: usize,
}

pub type ChartBuilder = fn(&Dataset, &ChartOptions) -> Result<ChartData, RenderError>;

pub struct ChartSpec {
    pub title: &'static str,
    pub tab: Tab,
    pub requires: Requirement,
    pub build: ChartBuilder,
}

pub const IRRADIANCE: &[&str] = &["GHI", "DNI", "DHI"];
pub const KEY_VARIABLES: &[&str] = &["GHI", "DNI", "DHI", "Tamb", "RH", "WS"];
pub const MODULE_TEMPERATURES: &[&str] = &["TModA", "TModB", "Tamb"];

/// All charts in display order.
pub static REGISTRY: &[ChartSpec] = &[
    ChartSpec {
        title: "Correlation Heatmap",
        tab: Tab::Visualizations,
        requires: Requirement::Always,
        build: builders::correlation_heatmap,
    },
    ChartSpec {
        title: "Time Series Trends",
        tab: Tab::Visualizations,
        requires: Requirement::All(&["Timestamp"]),
        build: builders::time_series,
    },
    ChartSpec {
        title: "Wind Rose",
        tab: Tab::Visualizations,
        requires: Requirement::All(&["WD", "WS"]),
        build: builders::wind_rose,
    },
    ChartSpec {
        title: "Wind Direction Distribution",
        tab: Tab::Visualizations,
        requires: Requirement::All(&["WD"]),
        build: builders::wind_direction,
    },
    ChartSpec {
        title: "Outlier Detection",
        tab: Tab::Advanced,
        requires: Requirement::All(IRRADIANCE),
        build: builders::outlier_detection,
    },
    ChartSpec {
        title: "Temperature vs. Relative Humidity",
        tab: Tab::Advanced,
        requires: Requirement::All(&["Tamb", "RH"]),
        build: builders::temperature_vs_humidity,
    },
    ChartSpec {
        title: "Temperature Trends Across Modules",
        tab: Tab::Advanced,
        requires: Requirement::All(MODULE_TEMPERATURES),
        build: builders::temperature_trends,
    },
    ChartSpec {
        title: "Pair Plot of Key Variables",
        tab: Tab::Advanced,
        requires: Requirement::Any(KEY_VARIABLES),
        build: builders::pair_plot,
    },
];

/// Charts whose column requirements the dataset meets.
pub fn applicable(dataset: &Dataset) -> impl Iterator<Item = &'static ChartSpec> + '_ {
    REGISTRY.iter().filter(move |spec| spec.requires.is_met(dataset))
}

/// Result of attempting one chart.
pub struct ChartOutcome {
    pub spec: &'static ChartSpec,
    pub result: Result<ChartData, RenderError>,
}

/// Build every applicable chart. A failing chart is logged and kept as an
/// error; the others are unaffected.
pub fn build_all(dataset: &Dataset, options: &ChartOptions) -> Vec<ChartOutcome> {
    applicable(dataset)
        .map(|spec| {
            let result = (spec.build)(dataset, options);
            if let Err(e) = &result {
                log::warn!("Error plotting {}: {e}", spec.title.to_lowercase());
            }
            ChartOutcome { spec, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    fn col(name: &str, vals: &[f64]) -> Column {
        Column::new(name, vals.iter().map(|&v| Value::Float(v)).collect())
    }

    fn titles(ds: &Dataset) -> Vec<&'static str> {
        applicable(ds).map(|s| s.title).collect()
    }

    #[test]
    fn time_series_skipped_without_timestamp() {
        let ds = Dataset::from_columns(vec![col("GHI", &[1.0, 2.0]), col("DNI", &[3.0, 1.0])]);
        let t = titles(&ds);
        assert!(!t.contains(&"Time Series Trends"));
        assert!(t.contains(&"Correlation Heatmap"));
        assert!(t.contains(&"Pair Plot of Key Variables"));
    }

    #[test]
    fn wind_charts_attempted_with_wd_and_ws() {
        let ds = Dataset::from_columns(vec![
            col("WD", &[10.0, 200.0, 90.0]),
            col("WS", &[1.0, 3.0, 5.0]),
        ]);
        let outcomes = build_all(&ds, &ChartOptions { max_points: 100 });
        let attempted: Vec<&str> = outcomes.iter().map(|o| o.spec.title).collect();
        assert!(attempted.contains(&"Wind Rose"));
        assert!(attempted.contains(&"Wind Direction Distribution"));
        assert!(outcomes
            .iter()
            .filter(|o| o.spec.title.starts_with("Wind"))
            .all(|o| o.result.is_ok()));
    }

    #[test]
    fn only_wd_skips_the_rose() {
        let ds = Dataset::from_columns(vec![col("WD", &[10.0])]);
        let t = titles(&ds);
        assert!(!t.contains(&"Wind Rose"));
        assert!(t.contains(&"Wind Direction Distribution"));
    }

    #[test]
    fn one_failure_does_not_stop_the_others() {
        // A single numeric column: the heatmap fails, the pair plot succeeds.
        let ds = Dataset::from_columns(vec![col("GHI", &[1.0, 2.0, 3.0])]);
        let outcomes = build_all(&ds, &ChartOptions { max_points: 100 });

        let heatmap = outcomes.iter().find(|o| o.spec.title == "Correlation Heatmap").unwrap();
        assert!(heatmap.result.is_err());
        let pair = outcomes
            .iter()
            .find(|o| o.spec.title == "Pair Plot of Key Variables")
            .unwrap();
        assert!(pair.result.is_ok());
    }

    #[test]
    fn empty_dataset_attempts_only_unconditional_charts() {
        let outcomes = build_all(&Dataset::empty(), &ChartOptions { max_points: 100 });
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_err());
    }

    #[test]
    fn requirement_variants() {
        let ds = Dataset::from_columns(vec![col("Tamb", &[20.0])]);
        assert!(Requirement::Always.is_met(&ds));
        assert!(Requirement::Any(KEY_VARIABLES).is_met(&ds));
        assert!(!Requirement::All(MODULE_TEMPERATURES).is_met(&ds));
    }
}
