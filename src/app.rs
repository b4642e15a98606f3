use eframe::egui;

use crate::state::AppState;
use crate::ui::{heatmap, panels, preview};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TabCorrApp {
    pub state: AppState,
}

impl eframe::App for TabCorrApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: structure and selection ----
        egui::SidePanel::left("series_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: heatmap + scatter, or the raw table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.matrix.is_some() {
                heatmap::correlation_heatmap(ui, &mut self.state);
                ui.separator();
                heatmap::pair_scatter(ui, &self.state);
            } else {
                preview::table_preview(ui, &self.state);
            }
        });
    }
}
