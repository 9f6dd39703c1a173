use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::analysis::stats::EdaSummary;
use crate::state::{AppState, DatasetView, Tab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – tab bar and tab bodies
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.separator();
}

pub fn tab_body(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Overview => overview(ui, state),
            Tab::Eda => eda(ui, state),
            Tab::Visualizations => {
                ui.heading("Data Visualizations");
                charts(ui, state, Tab::Visualizations);
            }
            Tab::Advanced => {
                ui.heading("Advanced Analysis");
                charts(ui, state, Tab::Advanced);
            }
        });
}

fn error_label(ui: &mut Ui, msg: &str) {
    ui.label(RichText::new(msg).color(Color32::RED));
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("Overview");
    let Some(entry) = state.entry() else {
        ui.label("No datasets configured.");
        return;
    };

    ui.label(format!(
        "This dashboard provides a detailed analysis of the {} dataset. \
         Navigate to different sections to explore data insights, trends, and advanced analysis.",
        entry.name
    ));
    ui.add_space(8.0);

    egui::Grid::new("overview_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Source file");
            ui.label(entry.source_path.display().to_string());
            ui.end_row();

            ui.strong("Cleaned file");
            ui.label(entry.cleaned_path.display().to_string());
            ui.end_row();

            ui.strong("Raw shape");
            ui.label(format!("{} rows × {} columns", entry.raw.len(), entry.raw.width()));
            ui.end_row();

            if let Some(cleaned) = &entry.cleaned {
                ui.strong("Cleaned shape");
                ui.label(format!(
                    "{} rows × {} columns",
                    cleaned.dataset.len(),
                    cleaned.dataset.width()
                ));
                ui.end_row();
            }
        });

    for err in entry.errors() {
        error_label(ui, err);
    }
}

// ---------------------------------------------------------------------------
// EDA
// ---------------------------------------------------------------------------

fn eda(ui: &mut Ui, state: &AppState) {
    ui.heading("Exploratory Data Analysis");
    let Some(summary) = &state.summary else {
        error_label(ui, "The cleaned table is unavailable for this dataset.");
        return;
    };

    ui.label(format!("{} rows × {} columns", summary.rows, summary.columns));
    ui.add_space(6.0);

    ui.strong("Data Summary:");
    if summary.describe.is_empty() {
        ui.label("No numeric columns.");
    } else {
        ui.push_id("describe_table", |ui: &mut Ui| describe_table(ui, summary));
    }
    ui.add_space(6.0);

    ui.strong("Missing Values:");
    egui::Grid::new("missing_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (col, n) in &summary.missing {
                ui.label(col);
                ui.label(n.to_string());
                ui.end_row();
            }
        });
    ui.add_space(6.0);

    ui.strong("Duplicates:");
    ui.label(summary.duplicates.to_string());

    if state.view == DatasetView::Cleaned {
        if let Some(cleaned) = state.entry().and_then(|e| e.cleaned.as_ref()) {
            ui.add_space(6.0);
            ui.strong("Cleaning steps:");
            for step in cleaned.report.steps() {
                ui.label(format!("• {step}"));
            }
        }
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "NaN".to_string())
}

fn describe_table(ui: &mut Ui, summary: &EdaSummary) {
    const HEADERS: [&str; 9] = ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(TableColumn::auto().at_least(70.0), HEADERS.len())
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for s in &summary.describe {
                body.row(18.0, |mut row| {
                    let cells = [
                        s.name.clone(),
                        s.count.to_string(),
                        fmt_opt(s.mean),
                        fmt_opt(s.std),
                        fmt_opt(s.min),
                        fmt_opt(s.q25),
                        fmt_opt(s.median),
                        fmt_opt(s.q75),
                        fmt_opt(s.max),
                    ];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Chart tabs
// ---------------------------------------------------------------------------

/// Each chart gets a subheading and either its drawing or its own error.
fn charts(ui: &mut Ui, state: &AppState, tab: Tab) {
    if state.dataset().is_none() {
        error_label(ui, "The cleaned table is unavailable for this dataset.");
        return;
    }

    let mut any = false;
    for outcome in state.charts_for(tab) {
        any = true;
        ui.add_space(8.0);
        ui.heading(RichText::new(outcome.spec.title).size(16.0));
        match &outcome.result {
            Ok(data) => plot::chart(ui, outcome.spec.title, data),
            Err(e) => error_label(
                ui,
                &format!("Error plotting {}: {e}", outcome.spec.title.to_lowercase()),
            ),
        }
    }
    if !any {
        ui.label("None of the charts in this tab apply to the selected dataset.");
    }
}
