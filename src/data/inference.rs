use std::collections::BTreeSet;

use super::coerce::coerce;
use super::model::{Cell, Orientation, RawTable, Value};

/// How many data rows (or cells, for row orientation) are sampled when
/// deciding whether a series is numeric.
pub const SAMPLE_ROWS: usize = 20;

/// A series is selected by default when strictly more than this share of its
/// sampled cells is finite.
pub const NUMERIC_DENSITY_THRESHOLD: f64 = 0.3;

// ---------------------------------------------------------------------------
// Header detection
// ---------------------------------------------------------------------------

/// Decide whether row 0 holds labels rather than data.
///
/// Only row 0 is inspected. Non-numeric text counts as string-like, numbers
/// and numeric text as number-like, missing cells are ignored. The row is a
/// header when it has at least one string-like cell and string-like cells are
/// not outnumbered.
pub fn infer_header(table: &RawTable) -> bool {
    let Some(first) = table.rows.first() else {
        return false;
    };

    let mut strings = 0usize;
    let mut numbers = 0usize;
    for cell in first {
        match cell {
            Cell::Number(_) => numbers += 1,
            Cell::Text(_) => match coerce(cell) {
                Value::Number(_) => numbers += 1,
                Value::NotANumber => strings += 1,
            },
            Cell::Empty | Cell::Bool(_) => {}
        }
    }

    let has_header = strings > 0 && strings >= numbers;
    log::debug!("header inference: {strings} string-like, {numbers} number-like → {has_header}");
    has_header
}

// ---------------------------------------------------------------------------
// Default selection
// ---------------------------------------------------------------------------

/// Indices that look numeric enough to be selected by default.
///
/// Column orientation yields column indices, row orientation yields indices
/// into the data rows (header excluded).
pub fn default_selection(
    table: &RawTable,
    has_header: bool,
    orientation: Orientation,
) -> BTreeSet<usize> {
    let data = table.data_rows(has_header);
    match orientation {
        Orientation::ByColumn => {
            let sample = &data[..data.len().min(SAMPLE_ROWS)];
            (0..table.width())
                .filter(|&col| {
                    let finite = sample
                        .iter()
                        .filter(|row| cell_is_finite(row.get(col)))
                        .count();
                    is_numeric_enough(finite, sample.len())
                })
                .collect()
        }
        Orientation::ByRow => data
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                if row.len() <= 1 {
                    return false;
                }
                let cells = &row[1..row.len().min(SAMPLE_ROWS + 1)];
                let finite = cells.iter().filter(|c| cell_is_finite(Some(*c))).count();
                is_numeric_enough(finite, cells.len())
            })
            .map(|(i, _)| i)
            .collect(),
    }
}

fn cell_is_finite(cell: Option<&Cell>) -> bool {
    cell.is_some_and(|c| coerce(c).is_finite())
}

fn is_numeric_enough(finite: usize, sampled: usize) -> bool {
    sampled > 0 && finite as f64 > sampled as f64 * NUMERIC_DENSITY_THRESHOLD
}

// ---------------------------------------------------------------------------
// Display labels
// ---------------------------------------------------------------------------

/// Spreadsheet-style column letters: A..Z, then AA, AB, ...
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Label for a column: the header cell's text, or its letter.
pub fn column_label(table: &RawTable, has_header: bool, col: usize) -> String {
    if has_header {
        if let Some(text) = table.cell(0, col).label_text() {
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    column_letter(col)
}

/// Label for a data row: its first cell's text, or "Row N" counted from the
/// top of the source table.
pub fn row_label(table: &RawTable, has_header: bool, data_row: usize) -> String {
    let absolute = data_row + usize::from(has_header);
    table
        .cell(absolute, 0)
        .label_text()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Row {}", absolute + 1))
}

/// Every index that can be selected under `orientation`, with its label.
pub fn candidates(
    table: &RawTable,
    has_header: bool,
    orientation: Orientation,
) -> Vec<(usize, String)> {
    match orientation {
        Orientation::ByColumn => (0..table.width())
            .map(|col| (col, column_label(table, has_header, col)))
            .collect(),
        Orientation::ByRow => (0..table.data_rows(has_header).len())
            .map(|row| (row, row_label(table, has_header, row)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn one_row(row: Vec<Cell>) -> RawTable {
        RawTable::new(vec![row])
    }

    #[test]
    fn all_text_first_row_is_header() {
        let table = one_row(vec![t("Revenue"), t("Users"), t("Region")]);
        assert!(infer_header(&table));
    }

    #[test]
    fn all_numeric_first_row_is_not_header() {
        let table = one_row(vec![n(10.0), n(20.0), n(30.0)]);
        assert!(!infer_header(&table));
    }

    #[test]
    fn numeric_majority_is_not_header() {
        let table = one_row(vec![t("A"), n(5.0), n(10.0)]);
        assert!(!infer_header(&table));
    }

    #[test]
    fn tie_and_numeric_text_count_as_header_rules_say() {
        // S = 1, N = 1 (numeric text counts as a number)
        assert!(infer_header(&one_row(vec![t("Year"), t("2020")])));
        // Missing cells are ignored entirely.
        assert!(infer_header(&one_row(vec![Cell::Empty, t("x"), Cell::Empty])));
        assert!(!infer_header(&one_row(vec![Cell::Empty, Cell::Empty])));
        assert!(!infer_header(&RawTable::default()));
    }

    #[test]
    fn column_selection_skips_label_columns() {
        let table = RawTable::new(vec![
            vec![t("Month"), t("Sales"), t("Visitors")],
            vec![t("Jan"), n(100.0), n(10.0)],
            vec![t("Feb"), n(200.0), n(20.0)],
            vec![t("Mar"), n(300.0), n(40.0)],
        ]);
        let sel = default_selection(&table, true, Orientation::ByColumn);
        assert_eq!(sel.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn column_threshold_is_strictly_above_thirty_percent() {
        // 10 data rows, column 0 has 3 finite cells (30%) and column 1 has 4.
        let rows = (0..10)
            .map(|i| {
                let a = if i < 3 { n(i as f64) } else { t("-") };
                let b = if i < 4 { n(i as f64) } else { Cell::Empty };
                vec![a, b]
            })
            .collect();
        let sel = default_selection(&RawTable::new(rows), false, Orientation::ByColumn);
        assert_eq!(sel.into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn column_sampling_stops_after_twenty_rows() {
        // Numbers only appear after row 20: the sample never sees them.
        let rows = (0..40)
            .map(|i| if i < 20 { vec![t("x")] } else { vec![n(1.0)] })
            .collect();
        let sel = default_selection(&RawTable::new(rows), false, Orientation::ByColumn);
        assert!(sel.is_empty());
    }

    #[test]
    fn header_only_table_selects_nothing() {
        let table = one_row(vec![t("a"), t("b")]);
        assert!(default_selection(&table, true, Orientation::ByColumn).is_empty());
    }

    #[test]
    fn row_selection_ignores_label_cell() {
        let table = RawTable::new(vec![
            vec![t("metric"), t("Q1"), t("Q2"), t("Q3")],
            vec![t("revenue"), n(1.0), n(2.0), n(3.0)],
            vec![t("notes"), t("ok"), t("late"), t("ok")],
            vec![t("lonely")],
            vec![t("cost"), n(4.0), Cell::Empty, n(6.0)],
        ]);
        let sel = default_selection(&table, true, Orientation::ByRow);
        assert_eq!(sel.into_iter().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn labels_fall_back_when_header_cell_missing() {
        let table = RawTable::new(vec![
            vec![t("Name"), Cell::Empty, n(2024.0)],
            vec![Cell::Empty, n(1.0), n(2.0)],
        ]);
        assert_eq!(column_label(&table, true, 0), "Name");
        assert_eq!(column_label(&table, true, 1), "B");
        assert_eq!(column_label(&table, true, 2), "2024");
        assert_eq!(column_label(&table, false, 0), "A");
        assert_eq!(row_label(&table, true, 0), "Row 2");
        assert_eq!(row_label(&table, false, 0), "Name");
    }

    #[test]
    fn candidates_follow_orientation() {
        let table = RawTable::new(vec![
            vec![t("id"), t("x")],
            vec![t("r1"), n(1.0), n(2.0)],
        ]);
        let cols = candidates(&table, true, Orientation::ByColumn);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[2].1, "C");
        let rows = candidates(&table, true, Orientation::ByRow);
        assert_eq!(rows, vec![(0, "r1".to_string())]);
    }
}
