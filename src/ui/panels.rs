use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, DatasetView};

// ---------------------------------------------------------------------------
// Left side panel – dataset selection
// ---------------------------------------------------------------------------

/// Render the left panel: dataset selector, raw/cleaned toggle, errors.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select Dataset");
    ui.separator();

    if state.cache.is_empty() {
        ui.label("No datasets configured.");
        return;
    }

    // Clone what we need so we can mutate state inside the closure.
    let names = state.cache.names().to_vec();
    let current = state.selected.clone().unwrap_or_default();

    egui::ComboBox::from_id_salt("dataset_select")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &names {
                if ui.selectable_label(current == *name, name).clicked() {
                    state.select_dataset(name);
                }
            }
        });
    ui.add_space(8.0);

    ui.strong("Table");
    let mut view = state.view;
    ui.radio_value(&mut view, DatasetView::Raw, "Raw");
    ui.radio_value(&mut view, DatasetView::Cleaned, "Cleaned");
    state.set_view(view);
    ui.separator();

    let Some(entry) = state.entry() else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for err in entry.errors() {
                ui.label(RichText::new(err).color(Color32::RED));
            }

            if let Some(cleaned) = &entry.cleaned {
                egui::CollapsingHeader::new(RichText::new("Cleaning").strong())
                    .id_salt("cleaning_report")
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        for step in cleaned.report.steps() {
                            ui.label(step);
                        }
                    });
            }

            egui::CollapsingHeader::new(RichText::new("Columns").strong())
                .id_salt("column_list")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for col in &entry.raw.columns {
                        ui.label(format!("{}  ({})", col.name, col.kind()));
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the selected dataset.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let name = state.selected.as_deref().unwrap_or("no dataset");
        ui.heading(format!("Solar Farm Data Analysis Dashboard for {name}"));

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!("{} rows, {} columns", ds.len(), ds.width()));
        }

        let failed = state.charts.iter().filter(|c| c.result.is_err()).count();
        if failed > 0 {
            ui.label(RichText::new(format!("{failed} chart(s) failed")).color(Color32::RED));
        }
    });
}
