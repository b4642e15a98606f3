use super::coerce::coerce;
use super::inference::{column_label, row_label};
use super::model::{AnalysisConfig, Orientation, RawTable, Series, Value};
use crate::error::AnalysisError;

/// A series needs this many finite values to take part in the matrix.
pub const MIN_FINITE_VALUES: usize = 2;

/// Extract one aligned series per selected index, in ascending index order.
///
/// Non-numeric cells become [`Value::NotANumber`] in place so position `i`
/// refers to the same source row (or column) in every series. Series with
/// fewer than [`MIN_FINITE_VALUES`] finite values are dropped; if fewer than
/// two survive, the run fails with [`AnalysisError::InsufficientSeries`].
pub fn extract_series(
    table: &RawTable,
    config: &AnalysisConfig,
) -> Result<Vec<Series>, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::NoData);
    }
    if config.selection.len() < 2 {
        return Err(AnalysisError::InsufficientSelection {
            selected: config.selection.len(),
        });
    }

    let all: Vec<Series> = match config.orientation {
        Orientation::ByColumn => config
            .selection
            .iter()
            .map(|&col| column_series(table, config.has_header, col))
            .collect(),
        Orientation::ByRow => config
            .selection
            .iter()
            .map(|&row| row_series(table, config.has_header, row))
            .collect(),
    };

    let (kept, dropped): (Vec<Series>, Vec<Series>) = all
        .into_iter()
        .partition(|s| s.finite_count() >= MIN_FINITE_VALUES);

    for s in &dropped {
        log::warn!(
            "dropping series '{}': {} finite value(s)",
            s.name,
            s.finite_count()
        );
    }

    if kept.len() < 2 {
        return Err(AnalysisError::InsufficientSeries {
            usable: kept.len(),
            dropped: dropped.into_iter().map(|s| s.name).collect(),
        });
    }

    log::info!(
        "extracted {} series by {} ({} dropped)",
        kept.len(),
        config.orientation,
        dropped.len()
    );
    Ok(kept)
}

fn column_series(table: &RawTable, has_header: bool, col: usize) -> Series {
    let values = table
        .data_rows(has_header)
        .iter()
        .map(|row| row.get(col).map_or(Value::NotANumber, coerce))
        .collect();
    Series {
        name: column_label(table, has_header, col),
        values,
    }
}

/// Row series skip the label cell and are padded to the table width so they
/// all share one length.
fn row_series(table: &RawTable, has_header: bool, data_row: usize) -> Series {
    let len = table.width().saturating_sub(1);
    let cells = table
        .data_rows(has_header)
        .get(data_row)
        .map(|row| row.get(1..).unwrap_or_default())
        .unwrap_or_default();

    let mut values: Vec<Value> = cells.iter().map(coerce).collect();
    values.resize(len, Value::NotANumber);

    Series {
        name: row_label(table, has_header, data_row),
        values,
    }
}
