use chrono::DateTime;
use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Stroke, Ui};
use egui_plot::{
    Bar as PlotBar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::analysis::stats::CorrelationMatrix;
use crate::analysis::wind::{WindRose, COMPASS, SECTORS};
use crate::charts::{
    Bar, ChartData, HistogramChart, LineChart, OutlierChart, PairCell, PairGrid, ScatterChart,
};
use crate::color::{correlation_color, correlation_text_color, generate_palette, sequential_palette};

const CHART_HEIGHT: f32 = 320.0;
const HEATMAP_CELL: egui::Vec2 = egui::vec2(56.0, 26.0);
const PAIR_CELL: f32 = 150.0;
/// Angular subdivisions per rose sector so every drawn piece stays convex.
const WEDGE_STEPS: usize = 4;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Draw a prepared chart. `id` must be unique among charts on screen.
pub fn chart(ui: &mut Ui, id: &str, data: &ChartData) {
    match data {
        ChartData::Heatmap(m) => heatmap(ui, id, m),
        ChartData::Lines(c) => lines(ui, id, c),
        ChartData::WindRose(r) => wind_rose(ui, id, r),
        ChartData::Histogram(h) => histogram(ui, id, h),
        ChartData::Scatter(s) => scatter(ui, id, s),
        ChartData::Outliers(o) => outliers(ui, id, o),
        ChartData::PairGrid(g) => pair_grid(ui, id, g),
    }
}

fn format_epoch(secs: f64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn to_plot_bars(bars: &[Bar]) -> Vec<PlotBar> {
    bars.iter()
        .map(|b| PlotBar::new(b.start + b.width / 2.0, b.count as f64).width(b.width))
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, id: &str, m: &CorrelationMatrix) {
    egui::ScrollArea::horizontal().id_salt(id).show(ui, |ui: &mut Ui| {
        egui::Grid::new(format!("{id}_grid")).spacing([2.0, 2.0]).show(ui, |ui: &mut Ui| {
            ui.label("");
            for label in &m.labels {
                ui.label(RichText::new(label).strong());
            }
            ui.end_row();

            for (i, row) in m.values.iter().enumerate() {
                ui.label(RichText::new(&m.labels[i]).strong());
                for (j, r) in row.iter().enumerate() {
                    let (rect, response) = ui.allocate_exact_size(HEATMAP_CELL, Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, correlation_color(*r));
                    let text = r.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".into());
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        &text,
                        FontId::monospace(11.0),
                        correlation_text_color(*r),
                    );
                    response.on_hover_text(format!("{} × {}: {text}", m.labels[i], m.labels[j]));
                }
                ui.end_row();
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Line, scatter and histogram charts
// ---------------------------------------------------------------------------

fn lines(ui: &mut Ui, id: &str, chart: &LineChart) {
    let colors = generate_palette(chart.series.len());
    let mut plot = Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str());
    if chart.time_axis {
        plot = plot
            .x_axis_formatter(|mark, _range| format_epoch(mark.value))
            .label_formatter(|name, value| {
                format!("{name}\n{}\n{:.2}", format_epoch(value.x), value.y)
            });
    }

    plot.show(ui, |plot_ui| {
        for (series, color) in chart.series.iter().zip(colors) {
            let points = PlotPoints::from(series.points.clone());
            plot_ui.line(Line::new(points).name(&series.name).color(color).width(1.2));
        }
    });
}

fn scatter(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .show(ui, |plot_ui| {
            let points = PlotPoints::from(chart.points.clone());
            plot_ui.points(Points::new(points).radius(1.5).color(Color32::LIGHT_BLUE));
        });
}

fn histogram(ui: &mut Ui, id: &str, chart: &HistogramChart) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(to_plot_bars(&chart.bars)).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Wind rose
// ---------------------------------------------------------------------------

/// Bearing (degrees clockwise from north) and radius → plot coordinates.
fn polar(bearing_deg: f64, radius: f64) -> [f64; 2] {
    let rad = bearing_deg.to_radians();
    [radius * rad.sin(), radius * rad.cos()]
}

fn wind_rose(ui: &mut Ui, id: &str, rose: &WindRose) {
    let labels = WindRose::speed_labels();
    let colors = sequential_palette(labels.len());
    let half = WindRose::sector_width() / 2.0 * 0.9;
    let max_total = (0..SECTORS)
        .map(|s| rose.sector_total(s))
        .fold(0.0, f64::max)
        .max(1.0);

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT * 1.3)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            // Reference rings at quarters of the longest sector.
            for k in 1..=4 {
                let r = max_total * k as f64 / 4.0;
                let ring: PlotPoints = (0..=72).map(|i| polar(i as f64 * 5.0, r)).collect();
                plot_ui.line(Line::new(ring).color(Color32::from_gray(90)).width(0.5));
                plot_ui.text(
                    Text::new(PlotPoint::new(0.0, r), format!("{r:.1}%")).color(Color32::GRAY),
                );
            }

            for sector in 0..SECTORS {
                let center = WindRose::sector_center(sector);
                let mut inner = 0.0;
                for (class, &freq) in rose.frequencies[sector].iter().enumerate() {
                    if freq <= 0.0 {
                        continue;
                    }
                    let outer = inner + freq;
                    let step = 2.0 * half / WEDGE_STEPS as f64;
                    for k in 0..WEDGE_STEPS {
                        let a0 = center - half + k as f64 * step;
                        let a1 = a0 + step;
                        let quad: PlotPoints = vec![
                            polar(a0, inner),
                            polar(a0, outer),
                            polar(a1, outer),
                            polar(a1, inner),
                        ]
                        .into();
                        plot_ui.polygon(
                            Polygon::new(quad)
                                .fill_color(colors[class])
                                .stroke(Stroke::new(0.5, colors[class]))
                                .name(&labels[class]),
                        );
                    }
                    inner = outer;
                }
            }

            for (sector, label) in COMPASS.iter().enumerate().step_by(2) {
                let [x, y] = polar(WindRose::sector_center(sector), max_total * 1.12);
                plot_ui.text(Text::new(PlotPoint::new(x, y), *label));
            }
        });

    ui.label(format!("{} observations", rose.observations));
}

// ---------------------------------------------------------------------------
// Outlier boxplots
// ---------------------------------------------------------------------------

fn outliers(ui: &mut Ui, id: &str, chart: &OutlierChart) {
    ui.label(format!(
        "Number of outliers detected: {} of {} rows (modified z-score > {})",
        chart.outlier_rows, chart.total_rows, chart.threshold
    ));

    let colors = generate_palette(chart.boxes.len());
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_formatter({
            let names: Vec<String> = chart.boxes.iter().map(|b| b.name.clone()).collect();
            move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    names.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }
        })
        .show(ui, |plot_ui| {
            for (i, (b, color)) in chart.boxes.iter().zip(colors).enumerate() {
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(&b.name)
                .box_width(0.5)
                .whisker_width(0.3);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).color(color).name(&b.name));

                let fliers: PlotPoints = b.fliers.iter().map(|&v| [x, v]).collect();
                plot_ui.points(Points::new(fliers).radius(1.5).color(color).name(&b.name));
            }
        });
    ui.label(format!(
        "Boxplot of {} (Outlier Detection)",
        chart.columns.join(", ")
    ));
}

// ---------------------------------------------------------------------------
// Pair plot
// ---------------------------------------------------------------------------

fn pair_grid(ui: &mut Ui, id: &str, grid: &PairGrid) {
    egui::ScrollArea::horizontal().id_salt(id).show(ui, |ui: &mut Ui| {
        egui::Grid::new(format!("{id}_grid")).spacing([4.0, 4.0]).show(ui, |ui: &mut Ui| {
            ui.label("");
            for label in &grid.labels {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.strong(label);
                });
            }
            ui.end_row();

            for (r, row) in grid.cells.iter().enumerate() {
                ui.strong(&grid.labels[r]);
                for (c, cell) in row.iter().enumerate() {
                    Plot::new(format!("{id}_{r}_{c}"))
                        .width(PAIR_CELL)
                        .height(PAIR_CELL)
                        .show_axes(false)
                        .allow_drag(false)
                        .allow_zoom(false)
                        .allow_scroll(false)
                        .show(ui, |plot_ui| match cell {
                            PairCell::Histogram(bars) => {
                                plot_ui.bar_chart(
                                    BarChart::new(to_plot_bars(bars)).color(Color32::LIGHT_BLUE),
                                );
                            }
                            PairCell::Scatter(points) => {
                                let pts = PlotPoints::from(points.clone());
                                plot_ui.points(
                                    Points::new(pts).radius(1.0).color(Color32::LIGHT_BLUE),
                                );
                            }
                        });
                }
                ui.end_row();
            }
        });
    });
}
