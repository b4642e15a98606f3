use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui};
use egui_plot::{Plot, Points};

use crate::color::{diverging_color, label_color};
use crate::state::AppState;

const CELL_SIZE: f32 = 48.0;
const LABEL_WIDTH: f32 = 160.0;
const HEADER_HEIGHT: f32 = 90.0;

// ---------------------------------------------------------------------------
// Correlation heatmap (central panel, top)
// ---------------------------------------------------------------------------

/// Draw the matrix as a grid of coloured cells. Clicking an off-diagonal cell
/// focuses that pair in the scatter plot.
pub fn correlation_heatmap(ui: &mut Ui, state: &mut AppState) {
    let Some(matrix) = &state.matrix else {
        return;
    };
    let n = matrix.len();
    let mut clicked = None;

    egui::ScrollArea::both()
        .id_salt("correlation_heatmap_scroll")
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui: &mut Ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(
                    LABEL_WIDTH + n as f32 * CELL_SIZE + 8.0,
                    HEADER_HEIGHT + n as f32 * CELL_SIZE + 8.0,
                ),
                Sense::click(),
            );
            let painter = ui.painter();
            let text_color = ui.visuals().text_color();
            let origin = rect.min + egui::vec2(LABEL_WIDTH, HEADER_HEIGHT);

            for (j, name) in matrix.variables.iter().enumerate() {
                painter.text(
                    origin + egui::vec2(j as f32 * CELL_SIZE + CELL_SIZE / 2.0, -8.0),
                    Align2::CENTER_BOTTOM,
                    truncate(name, 12),
                    FontId::proportional(11.0),
                    text_color,
                );
            }

            for (i, row) in matrix.grid.iter().enumerate() {
                painter.text(
                    origin + egui::vec2(-8.0, i as f32 * CELL_SIZE + CELL_SIZE / 2.0),
                    Align2::RIGHT_CENTER,
                    truncate(&matrix.variables[i], 24),
                    FontId::proportional(11.0),
                    text_color,
                );

                for (j, &r) in row.iter().enumerate() {
                    let cell = egui::Rect::from_min_size(
                        origin + egui::vec2(j as f32 * CELL_SIZE, i as f32 * CELL_SIZE),
                        egui::vec2(CELL_SIZE, CELL_SIZE),
                    )
                    .shrink(1.0);
                    painter.rect_filled(cell, 2.0, diverging_color(r));
                    if state.focused_pair == Some((i, j)) {
                        painter.rect_stroke(
                            cell,
                            2.0,
                            Stroke::new(2.0, text_color),
                            egui::StrokeKind::Inside,
                        );
                    }
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        format!("{r:.2}"),
                        FontId::proportional(12.0),
                        label_color(r),
                    );
                }
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let offset = pos - origin;
                    if offset.x >= 0.0 && offset.y >= 0.0 {
                        let (i, j) = (
                            (offset.y / CELL_SIZE) as usize,
                            (offset.x / CELL_SIZE) as usize,
                        );
                        if i < n && j < n {
                            clicked = Some((i, j));
                        }
                    }
                }
            }
        });

    if let Some((i, j)) = clicked {
        state.focus_pair(i, j);
    }
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() > max_chars {
        let mut short: String = name.chars().take(max_chars - 1).collect();
        short.push('…');
        short
    } else {
        name.to_string()
    }
}

// ---------------------------------------------------------------------------
// Scatter plot of the focused pair (central panel, bottom)
// ---------------------------------------------------------------------------

/// Plot the valid aligned points behind the focused coefficient.
pub fn pair_scatter(ui: &mut Ui, state: &AppState) {
    let (Some((i, j)), Some(matrix)) = (state.focused_pair, &state.matrix) else {
        return;
    };
    let (x_name, y_name) = (&matrix.variables[j], &matrix.variables[i]);
    let r = matrix.get(i, j).unwrap_or(0.0);

    ui.strong(format!("{y_name} vs {x_name}   r = {r:.4}"));

    // Matrix (i, j) plots series j on x and series i on y.
    let points: Vec<[f64; 2]> = state
        .focused_points()
        .into_iter()
        .map(|[a, b]| [b, a])
        .collect();
    let label = format!("{} valid pairs", points.len());

    Plot::new("pair_scatter")
        .x_axis_label(x_name.clone())
        .y_axis_label(y_name.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .name(label)
                    .color(Color32::from_rgb(41, 121, 255))
                    .radius(3.0),
            );
        });
}
