use super::{
    Bar, ChartData, ChartOptions, HistogramChart, LineChart, OutlierChart, PairCell, PairGrid,
    RenderError, ScatterChart, Series, IRRADIANCE, KEY_VARIABLES, MODULE_TEMPERATURES,
};
use crate::analysis::{outliers, stats, wind};
use crate::data::cleaner::TIMESTAMP_COLUMN;
use crate::data::loader::value_as_timestamp;
use crate::data::model::{Column, Dataset};

const TIME_SERIES_COLUMNS: &[&str] = &["GHI", "DNI", "DHI", "Tamb"];
const DIRECTION_BIN_DEG: f64 = 10.0;
const PAIR_HISTOGRAM_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

fn column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, RenderError> {
    dataset
        .column(name)
        .ok_or_else(|| RenderError::MissingColumn(name.to_string()))
}

/// Per-row numbers of a column that must hold at least one number.
fn numeric(dataset: &Dataset, name: &str) -> Result<Vec<Option<f64>>, RenderError> {
    let values = column(dataset, name)?.numeric_values();
    if values.iter().all(Option::is_none) {
        return Err(RenderError::NoNumericData(name.to_string()));
    }
    Ok(values)
}

/// Seconds since the epoch per row, or `None` when the dataset has no
/// timestamp column or none of its cells parse.
fn epoch_seconds(dataset: &Dataset) -> Option<Vec<Option<f64>>> {
    let col = dataset.column(TIMESTAMP_COLUMN)?;
    let times: Vec<Option<f64>> = col
        .values
        .iter()
        .map(|v| value_as_timestamp(v).map(|t| t.and_utc().timestamp() as f64))
        .collect();
    times.iter().any(Option::is_some).then_some(times)
}

fn paired(xs: &[Option<f64>], ys: &[Option<f64>], max_points: usize) -> Vec<[f64; 2]> {
    let points: Vec<[f64; 2]> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect();
    stats::decimate(&points, max_points)
}

fn bars(vals: &[f64], bins: usize) -> Vec<Bar> {
    stats::histogram(vals, bins)
        .into_iter()
        .map(|(start, width, count)| Bar {
            start,
            width,
            count,
        })
        .collect()
}

/// One line per named column present in the dataset, against `x`.
fn series_against(
    dataset: &Dataset,
    x: &[Option<f64>],
    names: &[&str],
    max_points: usize,
) -> Vec<Series> {
    names
        .iter()
        .filter_map(|name| {
            let ys = numeric(dataset, name).ok()?;
            Some(Series {
                name: name.to_string(),
                points: paired(x, &ys, max_points),
            })
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(dataset: &Dataset, _: &ChartOptions) -> Result<ChartData, RenderError> {
    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    if numeric.len() < 2 {
        return Err(RenderError::InsufficientData(format!(
            "correlation needs at least two numeric columns, found {}",
            numeric.len()
        )));
    }
    Ok(ChartData::Heatmap(stats::correlation_matrix(&numeric)))
}

pub fn time_series(dataset: &Dataset, options: &ChartOptions) -> Result<ChartData, RenderError> {
    column(dataset, TIMESTAMP_COLUMN)?;
    let times =
        epoch_seconds(dataset).ok_or_else(|| RenderError::NoTimestamps(TIMESTAMP_COLUMN.to_string()))?;

    let series = series_against(dataset, &times, TIME_SERIES_COLUMNS, options.max_points);
    if series.is_empty() {
        return Err(RenderError::InsufficientData(format!(
            "none of {} has data",
            TIME_SERIES_COLUMNS.join(", ")
        )));
    }

    Ok(ChartData::Lines(LineChart {
        x_label: TIMESTAMP_COLUMN.to_string(),
        y_label: "Value".to_string(),
        time_axis: true,
        series,
    }))
}

pub fn wind_rose(dataset: &Dataset, _: &ChartOptions) -> Result<ChartData, RenderError> {
    let directions = numeric(dataset, "WD")?;
    let speeds = numeric(dataset, "WS")?;
    let rose = wind::wind_rose(&directions, &speeds);
    if rose.observations == 0 {
        return Err(RenderError::InsufficientData(
            "no rows with both WD and WS".to_string(),
        ));
    }
    Ok(ChartData::WindRose(rose))
}

pub fn wind_direction(dataset: &Dataset, _: &ChartOptions) -> Result<ChartData, RenderError> {
    let directions: Vec<f64> = numeric(dataset, "WD")?.into_iter().flatten().collect();
    let bars = wind::direction_histogram(&directions, DIRECTION_BIN_DEG)
        .into_iter()
        .map(|(start, count)| Bar {
            start,
            width: DIRECTION_BIN_DEG,
            count,
        })
        .collect();
    Ok(ChartData::Histogram(HistogramChart {
        x_label: "Wind direction (°)".to_string(),
        bars,
    }))
}

pub fn outlier_detection(dataset: &Dataset, options: &ChartOptions) -> Result<ChartData, RenderError> {
    let set = outliers::detect_outliers(dataset, IRRADIANCE)?;

    let boxes = IRRADIANCE
        .iter()
        .filter_map(|name| {
            let vals = dataset.column(name)?.valid_numbers();
            let mut summary = stats::box_summary(name, &vals)?;
            summary.fliers = stats::decimate(&summary.fliers, options.max_points);
            Some(summary)
        })
        .collect::<Vec<_>>();
    if boxes.is_empty() {
        return Err(RenderError::NoNumericData(IRRADIANCE.join(", ")));
    }

    Ok(ChartData::Outliers(OutlierChart {
        columns: IRRADIANCE.iter().map(|s| s.to_string()).collect(),
        outlier_rows: set.len(),
        total_rows: dataset.len(),
        threshold: set.threshold,
        boxes,
    }))
}

pub fn temperature_vs_humidity(
    dataset: &Dataset,
    options: &ChartOptions,
) -> Result<ChartData, RenderError> {
    let rh = numeric(dataset, "RH")?;
    let tamb = numeric(dataset, "Tamb")?;
    let points = paired(&rh, &tamb, options.max_points);
    if points.is_empty() {
        return Err(RenderError::InsufficientData(
            "no rows with both RH and Tamb".to_string(),
        ));
    }
    Ok(ChartData::Scatter(ScatterChart {
        x_label: "Relative humidity (%)".to_string(),
        y_label: "Ambient temperature (°C)".to_string(),
        points,
    }))
}

/// Module and ambient temperatures over time, or over row number when the
/// dataset carries no usable timestamps.
pub fn temperature_trends(dataset: &Dataset, options: &ChartOptions) -> Result<ChartData, RenderError> {
    for name in MODULE_TEMPERATURES {
        column(dataset, name)?;
    }
    let (x, time_axis, x_label) = match epoch_seconds(dataset) {
        Some(times) => (times, true, TIMESTAMP_COLUMN.to_string()),
        None => (
            (0..dataset.len()).map(|i| Some(i as f64)).collect(),
            false,
            "Row".to_string(),
        ),
    };

    let series = series_against(dataset, &x, MODULE_TEMPERATURES, options.max_points);
    if series.is_empty() {
        return Err(RenderError::NoNumericData(MODULE_TEMPERATURES.join(", ")));
    }
    Ok(ChartData::Lines(LineChart {
        x_label,
        y_label: "Temperature (°C)".to_string(),
        time_axis,
        series,
    }))
}

pub fn pair_plot(dataset: &Dataset, options: &ChartOptions) -> Result<ChartData, RenderError> {
    let columns: Vec<(String, Vec<Option<f64>>)> = KEY_VARIABLES
        .iter()
        .filter_map(|name| Some((name.to_string(), numeric(dataset, name).ok()?)))
        .collect();
    if columns.is_empty() {
        return Err(RenderError::NoNumericData(KEY_VARIABLES.join(", ")));
    }

    let per_cell = (options.max_points / columns.len().pow(2)).max(200);
    let cells = columns
        .iter()
        .enumerate()
        .map(|(row, (_, ys))| {
            columns
                .iter()
                .enumerate()
                .map(|(col, (_, xs))| {
                    if row == col {
                        let vals: Vec<f64> = ys.iter().flatten().copied().collect();
                        PairCell::Histogram(bars(&vals, PAIR_HISTOGRAM_BINS))
                    } else {
                        PairCell::Scatter(paired(xs, ys, per_cell))
                    }
                })
                .collect()
        })
        .collect();

    Ok(ChartData::PairGrid(PairGrid {
        labels: columns.into_iter().map(|(name, _)| name).collect(),
        cells,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    const OPTS: ChartOptions = ChartOptions { max_points: 1000 };

    fn col(name: &str, vals: &[f64]) -> Column {
        Column::new(name, vals.iter().map(|&v| Value::Float(v)).collect())
    }

    fn text_col(name: &str, vals: &[&str]) -> Column {
        Column::new(name, vals.iter().map(|v| Value::Text(v.to_string())).collect())
    }

    #[test]
    fn heatmap_over_numeric_columns() {
        let ds = Dataset::from_columns(vec![
            text_col("site", &["a", "b", "c"]),
            col("GHI", &[1.0, 2.0, 3.0]),
            col("DNI", &[3.0, 2.0, 1.0]),
        ]);
        let ChartData::Heatmap(m) = correlation_heatmap(&ds, &OPTS).unwrap() else {
            panic!("expected heatmap");
        };
        assert_eq!(m.labels, vec!["GHI", "DNI"]);
        assert!((m.values[0][1].unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn time_series_from_text_timestamps() {
        let ds = Dataset::from_columns(vec![
            text_col("Timestamp", &["2021-08-09 00:01", "2021-08-09 00:02"]),
            col("GHI", &[1.0, 2.0]),
            col("Tamb", &[25.0, 25.5]),
        ]);
        let ChartData::Lines(chart) = time_series(&ds, &OPTS).unwrap() else {
            panic!("expected lines");
        };
        assert!(chart.time_axis);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["GHI", "Tamb"]);
        assert_eq!(chart.series[0].points[1][0] - chart.series[0].points[0][0], 60.0);
    }

    #[test]
    fn unparseable_timestamps_fail_the_chart() {
        let ds = Dataset::from_columns(vec![
            text_col("Timestamp", &["soon", "later"]),
            col("GHI", &[1.0, 2.0]),
        ]);
        assert_eq!(
            time_series(&ds, &OPTS),
            Err(RenderError::NoTimestamps("Timestamp".into()))
        );
    }

    #[test]
    fn wind_rose_needs_observations() {
        let ds = Dataset::from_columns(vec![
            col("WD", &[90.0, 180.0]),
            Column::new("WS", vec![Value::Null, Value::Float(2.0)]),
        ]);
        let ChartData::WindRose(rose) = wind_rose(&ds, &OPTS).unwrap() else {
            panic!("expected rose");
        };
        assert_eq!(rose.observations, 1);

        let no_speed = Dataset::from_columns(vec![
            col("WD", &[90.0]),
            Column::new("WS", vec![Value::Null]),
        ]);
        assert_eq!(
            wind_rose(&no_speed, &OPTS),
            Err(RenderError::NoNumericData("WS".into()))
        );
    }

    #[test]
    fn wind_direction_histogram_has_36_bins() {
        let ds = Dataset::from_columns(vec![col("WD", &[0.0, 5.0, 355.0])]);
        let ChartData::Histogram(h) = wind_direction(&ds, &OPTS).unwrap() else {
            panic!("expected histogram");
        };
        assert_eq!(h.bars.len(), 36);
        assert_eq!(h.bars[0].count, 2);
    }

    #[test]
    fn outlier_chart_counts_rows() {
        let ds = Dataset::from_columns(vec![
            col("GHI", &[500.0, 501.0, 499.0, 900.0, 500.0]),
            col("DNI", &[300.0, 310.0, 305.0, 298.0, 302.0]),
            col("DHI", &[100.0, 102.0, 99.0, 101.0, 98.0]),
        ]);
        let ChartData::Outliers(chart) = outlier_detection(&ds, &OPTS).unwrap() else {
            panic!("expected outliers");
        };
        assert_eq!(chart.outlier_rows, 1);
        assert_eq!(chart.total_rows, 5);
        assert_eq!(chart.boxes.len(), 3);
    }

    #[test]
    fn outlier_chart_propagates_analysis_errors() {
        let ds = Dataset::from_columns(vec![
            text_col("GHI", &["a"]),
            col("DNI", &[1.0]),
            col("DHI", &[1.0]),
        ]);
        assert!(matches!(
            outlier_detection(&ds, &OPTS),
            Err(RenderError::Analysis(_))
        ));
    }

    #[test]
    fn temperature_trends_fall_back_to_row_index() {
        let ds = Dataset::from_columns(vec![
            col("TModA", &[30.0, 31.0]),
            col("TModB", &[29.0, 30.0]),
            col("Tamb", &[25.0, 26.0]),
        ]);
        let ChartData::Lines(chart) = temperature_trends(&ds, &OPTS).unwrap() else {
            panic!("expected lines");
        };
        assert!(!chart.time_axis);
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[2].points, vec![[0.0, 25.0], [1.0, 26.0]]);
    }

    #[test]
    fn scatter_pairs_complete_rows() {
        let ds = Dataset::from_columns(vec![
            Column::new("Tamb", vec![Value::Float(20.0), Value::Null, Value::Float(22.0)]),
            col("RH", &[80.0, 70.0, 60.0]),
        ]);
        let ChartData::Scatter(s) = temperature_vs_humidity(&ds, &OPTS).unwrap() else {
            panic!("expected scatter");
        };
        assert_eq!(s.points, vec![[80.0, 20.0], [60.0, 22.0]]);
    }

    #[test]
    fn pair_plot_uses_available_columns() {
        let ds = Dataset::from_columns(vec![
            col("GHI", &[1.0, 2.0, 3.0]),
            col("WS", &[0.5, 0.7, 0.2]),
            text_col("RH", &["n/a", "n/a", "n/a"]),
        ]);
        let ChartData::PairGrid(grid) = pair_plot(&ds, &OPTS).unwrap() else {
            panic!("expected grid");
        };
        assert_eq!(grid.labels, vec!["GHI", "WS"]);
        assert!(matches!(grid.cells[0][0], PairCell::Histogram(_)));
        assert!(matches!(grid.cells[1][0], PairCell::Scatter(ref p) if p.len() == 3));
    }
}
