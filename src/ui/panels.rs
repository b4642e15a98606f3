use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Orientation;
use crate::error::AnalysisError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – structure and selection
// ---------------------------------------------------------------------------

/// Render the left configuration panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.separator();

    if state.table.is_none() {
        ui.label("No table loaded.");
        return;
    }

    // ---- Structure ----
    let mut has_header = state.config.has_header;
    if ui
        .checkbox(&mut has_header, "First row is a header")
        .changed()
    {
        state.set_has_header(has_header);
    }

    let mut orientation = state.config.orientation;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Series are");
        ui.radio_value(&mut orientation, Orientation::ByColumn, "columns");
        ui.radio_value(&mut orientation, Orientation::ByRow, "rows");
    });
    state.set_orientation(orientation);
    ui.separator();

    // ---- Selection ----
    let candidates = state.candidates();
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!(
            "{} of {} selected",
            state.config.selection.len(),
            candidates.len()
        ));
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    let button = egui::Button::new(RichText::new("Compute correlations").strong());
    let response = ui.add_enabled(state.can_analyze(), button);
    if response.clicked() {
        state.run_analysis();
    }
    if !state.can_analyze() {
        ui.label(RichText::new("Select at least two series.").weak());
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, label) in &candidates {
                let mut checked = state.config.selection.contains(index);
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_index(*index);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.add_enabled_ui(state.matrix.is_some(), |ui: &mut Ui| {
            ui.menu_button("Export", |ui: &mut Ui| {
                let formats = [("CSV…", "csv"), ("JSON…", "json"), ("PNG heatmap…", "png")];
                for (label, ext) in formats {
                    if ui.button(label).clicked() {
                        export_file_dialog(state, ext);
                        ui.close_menu();
                    }
                }
            });
        });

        ui.separator();

        if let (Some(table), Some(name)) = (&state.table, &state.source_name) {
            ui.label(format!("{name}: {} rows × {} columns", table.len(), table.width()));
        }

        if let Some(matrix) = &state.matrix {
            ui.separator();
            ui.label(format!("{} series correlated", matrix.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter(
            "Supported files",
            &["csv", "tsv", "txt", "json", "parquet", "pq", "xlsx", "xlsm", "xls", "ods"],
        )
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                let empty = table.is_empty();
                state.set_table(table, name);
                if empty {
                    log::warn!("{} contains no rows", path.display());
                    state.status_message = Some(AnalysisError::NoData.to_string());
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState, ext: &str) {
    let Some(matrix) = &state.matrix else {
        return;
    };
    let stem = state
        .source_name
        .as_deref()
        .and_then(|n| std::path::Path::new(n).file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());

    let file = rfd::FileDialog::new()
        .set_title("Export correlation matrix")
        .set_file_name(format!("{stem}_correlations.{ext}"))
        .add_filter(ext.to_ascii_uppercase(), &[ext])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = crate::data::export::export_file(&path, matrix, &state.config) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
