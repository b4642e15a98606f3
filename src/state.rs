use crate::correlation::analyze;
use crate::data::inference::{candidates, default_selection, infer_header};
use crate::data::model::{AnalysisConfig, CorrelationMatrix, Orientation, RawTable, Series};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until user loads a file).
    pub table: Option<RawTable>,

    /// File name of the loaded table, for the title bar.
    pub source_name: Option<String>,

    /// Header decision, orientation and selection.
    pub config: AnalysisConfig,

    /// Series of the last successful analysis.
    pub series: Vec<Series>,

    /// Result of the last successful analysis.
    pub matrix: Option<CorrelationMatrix>,

    /// Matrix cell whose pair is shown in the scatter plot.
    pub focused_pair: Option<(usize, usize)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded table: infer the header, pick default series.
    pub fn set_table(&mut self, table: RawTable, source_name: Option<String>) {
        self.config = AnalysisConfig {
            has_header: infer_header(&table),
            orientation: Orientation::ByColumn,
            selection: Default::default(),
        };
        self.table = Some(table);
        self.source_name = source_name;
        self.status_message = None;
        self.reset_selection();
    }

    /// Override the header decision; the selection is recomputed.
    pub fn set_has_header(&mut self, has_header: bool) {
        if self.config.has_header != has_header {
            self.config.has_header = has_header;
            self.reset_selection();
        }
    }

    /// Switch orientation; the selection is recomputed.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.config.orientation != orientation {
            self.config.orientation = orientation;
            self.reset_selection();
        }
    }

    /// Discard the current selection and results, and re-run inference.
    fn reset_selection(&mut self) {
        self.clear_results();
        self.config.selection = match &self.table {
            Some(table) => {
                default_selection(table, self.config.has_header, self.config.orientation)
            }
            None => Default::default(),
        };
        log::debug!(
            "default selection by {} (header: {}): {:?}",
            self.config.orientation,
            self.config.has_header,
            self.config.selection
        );
    }

    fn clear_results(&mut self) {
        self.series.clear();
        self.matrix = None;
        self.focused_pair = None;
    }

    /// Selectable indices with their display labels.
    pub fn candidates(&self) -> Vec<(usize, String)> {
        self.table
            .as_ref()
            .map(|t| candidates(t, self.config.has_header, self.config.orientation))
            .unwrap_or_default()
    }

    /// Toggle a single index in the selection.
    ///
    /// Any selection change discards the previous results: the matrix always
    /// belongs to `self.config` as it is now.
    pub fn toggle_index(&mut self, index: usize) {
        self.clear_results();
        if !self.config.selection.remove(&index) {
            self.config.selection.insert(index);
        }
    }

    /// Select every candidate.
    pub fn select_all(&mut self) {
        self.clear_results();
        self.config.selection = self.candidates().into_iter().map(|(i, _)| i).collect();
    }

    /// Deselect everything.
    pub fn select_none(&mut self) {
        self.clear_results();
        self.config.selection.clear();
    }

    /// Whether enough series are selected to run an analysis.
    pub fn can_analyze(&self) -> bool {
        self.table.is_some() && self.config.selection.len() >= 2
    }

    /// Recompute series and matrix from scratch for the current configuration.
    pub fn run_analysis(&mut self) {
        self.clear_results();
        let Some(table) = &self.table else {
            self.status_message = Some("Load a table first.".to_string());
            return;
        };

        match analyze(table, &self.config) {
            Ok((series, matrix)) => {
                self.focused_pair = (matrix.len() >= 2).then_some((0, 1));
                self.series = series;
                self.matrix = Some(matrix);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("analysis failed: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Focus a matrix cell for the scatter plot. Diagonal cells are ignored.
    pub fn focus_pair(&mut self, i: usize, j: usize) {
        if i != j && i < self.series.len() && j < self.series.len() {
            self.focused_pair = Some((i, j));
        }
    }

    /// Valid aligned points of the focused pair, as (x, y).
    pub fn focused_points(&self) -> Vec<[f64; 2]> {
        let Some((i, j)) = self.focused_pair else {
            return Vec::new();
        };
        let (Some(a), Some(b)) = (self.series.get(i), self.series.get(j)) else {
            return Vec::new();
        };
        a.values
            .iter()
            .zip(&b.values)
            .filter_map(|(x, y)| Some([x.finite()?, y.finite()?]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_table(
            RawTable::new(vec![
                vec![t("Month"), t("Sales"), t("Visitors"), t("Notes")],
                vec![t("Jan"), n(100.0), n(10.0), t("cold")],
                vec![t("Feb"), n(200.0), n(20.0)],
                vec![t("Mar"), n(300.0), n(40.0), t("warm")],
            ]),
            Some("sales.csv".into()),
        );
        state
    }

    #[test]
    fn loading_infers_header_and_selection() {
        let state = loaded();
        assert!(state.config.has_header);
        assert_eq!(state.config.selection.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(state.can_analyze());
    }

    #[test]
    fn header_override_resets_selection() {
        let mut state = loaded();
        state.select_none();
        state.set_has_header(false);
        // Header row now counts as data: 3 of 4 sampled cells are numeric.
        assert_eq!(state.config.selection.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(state.candidates()[0].1, "A");
    }

    #[test]
    fn orientation_change_resets_selection() {
        let mut state = loaded();
        state.run_analysis();
        assert!(state.matrix.is_some());
        state.set_orientation(Orientation::ByRow);
        assert!(state.matrix.is_none());
        // Rows: Jan has 2/3 numeric, Feb 2/2, Mar 2/3.
        assert_eq!(state.config.selection.len(), 3);
    }

    #[test]
    fn select_all_and_none() {
        let mut state = loaded();
        state.select_all();
        assert_eq!(state.config.selection.len(), 4);
        state.select_none();
        assert!(!state.can_analyze());
        state.toggle_index(1);
        state.toggle_index(2);
        state.toggle_index(2);
        assert_eq!(state.config.selection.len(), 1);
    }

    #[test]
    fn selection_change_discards_stale_results() {
        let mut state = loaded();
        state.run_analysis();
        assert_eq!(state.matrix.as_ref().map(|m| m.len()), Some(2));

        state.toggle_index(0);
        assert!(state.matrix.is_none());
        assert!(state.series.is_empty());
        assert!(state.focused_pair.is_none());

        state.run_analysis();
        assert!(state.matrix.is_some());
        state.select_all();
        assert!(state.matrix.is_none());

        state.run_analysis();
        state.select_none();
        assert!(state.matrix.is_none());
    }

    #[test]
    fn single_selection_reports_status_without_matrix() {
        let mut state = loaded();
        state.select_none();
        state.toggle_index(1);
        state.run_analysis();
        assert!(state.matrix.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn analysis_focuses_first_pair() {
        let mut state = loaded();
        state.run_analysis();
        assert_eq!(state.focused_pair, Some((0, 1)));
        let points = state.focused_points();
        assert_eq!(points, vec![[100.0, 10.0], [200.0, 20.0], [300.0, 40.0]]);
        state.focus_pair(1, 1);
        assert_eq!(state.focused_pair, Some((0, 1)));
    }
}
