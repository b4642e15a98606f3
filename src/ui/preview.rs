use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::inference::column_letter;
use crate::state::AppState;

/// Rows shown in the raw table preview.
const PREVIEW_ROWS: usize = 200;

// ---------------------------------------------------------------------------
// Raw table preview (central panel, before analysis)
// ---------------------------------------------------------------------------

/// Show the loaded table as-is, with spreadsheet letters on top. The header
/// row, when detected, is drawn in bold.
pub fn table_preview(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a table to correlate its columns  (File → Open…)");
        });
        return;
    };

    let width = table.width();
    let has_header = state.config.has_header;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(40.0))
        .columns(Column::auto().at_least(60.0), width)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for col in 0..width {
                header.col(|ui| {
                    ui.strong(column_letter(col));
                });
            }
        })
        .body(|mut body| {
            for row_idx in 0..table.len().min(PREVIEW_ROWS) {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(RichText::new((row_idx + 1).to_string()).weak());
                    });
                    for col in 0..width {
                        let cell = table.cell(row_idx, col);
                        table_row.col(|ui| {
                            let text = RichText::new(cell.to_string());
                            if has_header && row_idx == 0 {
                                ui.label(text.strong());
                            } else {
                                ui.label(text);
                            }
                        });
                    }
                });
            }
        });

    if table.len() > PREVIEW_ROWS {
        ui.label(format!("… {} more rows", table.len() - PREVIEW_ROWS));
    }
}
