use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::util::display::array_value_to_string;
use arrow::util::pretty::pretty_format_batches;
use calamine::{Data, Range, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-separated, rows may be ragged
/// * `.tsv`          – tab-separated
/// * `.json`         – array of arrays, or array of records
/// * `.parquet`      – field names become the first row
/// * `.xlsx` / `.xls` / `.ods` – first worksheet, cells at their sheet positions
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => read_delimited(open(path)?, b',')?,
        "tsv" | "tab" => read_delimited(open(path)?, b'\t')?,
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Decoded {} rows (widest {}) from {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Every record becomes a row; nothing is treated as a header here.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell).collect());
    }
    Ok(RawTable::new(rows))
}

fn guess_cell(s: &str) -> Cell {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        if v.is_finite() {
            return Cell::Number(v);
        }
    }
    Cell::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two layouts are accepted:
///
/// ```json
/// [["Month", "Sales"], ["Jan", 100]]
/// ```
///
/// or records, whose first object's keys become the first row:
///
/// ```json
/// [{ "Month": "Jan", "Sales": 100 }, { "Month": "Feb", "Sales": 200 }]
/// ```
pub fn parse_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let Some(first) = records.first() else {
        return Ok(RawTable::default());
    };

    if let Some(obj) = first.as_object() {
        let keys: Vec<String> = obj.keys().cloned().collect();
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(keys.iter().map(|k| Cell::Text(k.clone())).collect());
        for (i, rec) in records.iter().enumerate() {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            rows.push(
                keys.iter()
                    .map(|k| obj.get(k).map_or(Cell::Empty, json_to_cell))
                    .collect(),
            );
        }
        return Ok(RawTable::new(rows));
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_array()
                .with_context(|| format!("Row {i} is not a JSON array"))
                .map(|cells| cells.iter().map(json_to_cell).collect())
        })
        .collect::<Result<Vec<Vec<Cell>>>>()?;
    Ok(RawTable::new(rows))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Empty,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map_or_else(|| Cell::Text(n.to_string()), Cell::Number),
        JsonValue::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an `.xlsx` / `.xls` / `.ods` workbook.
fn load_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;
    Ok(range_to_table(&range))
}

/// Convert a sheet range to a table, keeping absolute positions: a range
/// that starts at C3 gets two empty rows and two empty leading cells per row.
pub fn range_to_table(range: &Range<Data>) -> RawTable {
    let Some((start_row, start_col)) = range.start() else {
        return RawTable::default();
    };
    let lead = vec![Cell::Empty; start_col as usize];

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for sheet_row in range.rows() {
        let mut row = lead.clone();
        row.extend(sheet_row.iter().map(sheet_to_cell));
        // Trailing blanks are missing cells, not data.
        while row.last().is_some_and(|c| matches!(c, Cell::Empty)) {
            row.pop();
        }
        rows.push(row);
    }
    RawTable::new(rows)
}

fn sheet_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates stay numeric as their serial day number.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file as a table: one header row of field names followed by
/// one row per record.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = open(path)?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let header: Vec<Cell> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Cell::Text(f.name().clone()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = vec![header];
    for (batch_no, batch_result) in reader.enumerate() {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch_no == 0 && log::log_enabled!(log::Level::Debug) {
            let head = batch.slice(0, batch.num_rows().min(5));
            if let Ok(preview) = pretty_format_batches(&[head]) {
                log::debug!("first parquet batch:\n{preview}");
            }
        }

        let columns = batch
            .columns()
            .iter()
            .map(column_cells)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(RawTable::new(rows))
}

/// Decode one Arrow column into cells.
///
/// Every numeric type (all integer widths, floats, decimals) is cast to
/// `Float64`; strings and booleans keep their type; anything else is rendered
/// with Arrow's display formatting.
fn column_cells(col: &ArrayRef) -> Result<Vec<Cell>> {
    let data_type = col.data_type();

    if data_type.is_numeric() {
        let floats = cast(col, &DataType::Float64)
            .with_context(|| format!("casting {data_type} column to Float64"))?;
        let floats = floats.as_primitive::<Float64Type>();
        return Ok(floats
            .iter()
            .map(|v| v.map_or(Cell::Empty, Cell::Number))
            .collect());
    }

    match data_type {
        DataType::Utf8 => Ok(text_cells(col.as_string::<i32>().iter())),
        DataType::LargeUtf8 => Ok(text_cells(col.as_string::<i64>().iter())),
        DataType::Boolean => Ok(col
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Cell::Empty, Cell::Bool))
            .collect()),
        _ => (0..col.len())
            .map(|row| {
                if col.is_null(row) {
                    return Ok(Cell::Empty);
                }
                array_value_to_string(col, row)
                    .map(Cell::Text)
                    .with_context(|| format!("formatting {data_type} value"))
            })
            .collect(),
    }
}

fn text_cells<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<Cell> {
    values
        .map(|v| v.map_or(Cell::Empty, |s| Cell::Text(s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_rows_are_ragged_and_typed() {
        let input = "Month,Sales,Visitors\nJan,100,10\nFeb,,20,extra\nMar,3e2\n";
        let table = read_delimited(input.as_bytes(), b',').unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[0][0], Cell::Text("Month".into()));
        assert_eq!(table.rows[1][1], Cell::Number(100.0));
        assert_eq!(table.rows[2][1], Cell::Empty);
        assert_eq!(table.rows[2].len(), 4);
        assert_eq!(table.rows[3], vec![Cell::Text("Mar".into()), Cell::Number(300.0)]);
        assert_eq!(table.width(), 4);
    }

    #[test]
    fn tab_delimiter() {
        let table = read_delimited("a\tb\n1\t2\n".as_bytes(), b'\t').unwrap();
        assert_eq!(table.rows[1], vec![Cell::Number(1.0), Cell::Number(2.0)]);
    }

    #[test]
    fn json_array_of_arrays() {
        let table = parse_json(r#"[["x", "y"], [1, null], [2.5, true]]"#).unwrap();
        assert_eq!(table.rows[1], vec![Cell::Number(1.0), Cell::Empty]);
        assert_eq!(table.rows[2], vec![Cell::Number(2.5), Cell::Bool(true)]);
    }

    #[test]
    fn json_records_get_a_key_row() {
        let table = parse_json(r#"[{"a": 1, "b": "x"}, {"a": 2}]"#).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0], vec![Cell::Text("a".into()), Cell::Text("b".into())]);
        assert_eq!(table.rows[2], vec![Cell::Number(2.0), Cell::Empty]);
    }

    #[test]
    fn json_rejects_non_array_root() {
        assert!(parse_json(r#"{"a": 1}"#).is_err());
        assert!(parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn parquet_integer_columns_load_as_numbers() {
        use std::sync::Arc;

        use arrow::array::{Date32Array, Int16Array, StringArray, UInt32Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Month", DataType::Utf8, false),
            Field::new("Sales", DataType::Int16, true),
            Field::new("Visitors", DataType::UInt32, false),
            Field::new("Day", DataType::Date32, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Jan", "Feb", "Mar"])),
            Arc::new(Int16Array::from(vec![Some(100), None, Some(300)])),
            Arc::new(UInt32Array::from(vec![10, 20, 40])),
            Arc::new(Date32Array::from(vec![0, 1, 2])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let path = std::env::temp_dir().join(format!(
            "tabcorr_loader_{}.parquet",
            std::process::id()
        ));
        let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None)
            .unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path);
        std::fs::remove_file(&path).ok();
        let table = table.unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[0][1], Cell::Text("Sales".into()));
        assert_eq!(table.rows[1][1], Cell::Number(100.0));
        assert_eq!(table.rows[2][1], Cell::Empty);
        assert_eq!(table.rows[3][2], Cell::Number(40.0));
        assert_eq!(table.rows[1][0], Cell::Text("Jan".into()));
        assert_eq!(table.rows[1][3], Cell::Text("1970-01-01".into()));
    }

    #[test]
    fn sheet_range_keeps_absolute_positions() {
        // Used range B2:C3.
        let mut range: Range<Data> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("Sales".into()));
        range.set_value((1, 2), Data::String("Visitors".into()));
        range.set_value((2, 1), Data::Int(100));
        range.set_value((2, 2), Data::Float(10.5));

        let table = range_to_table(&range);
        assert_eq!(table.len(), 3);
        assert!(table.rows[0].is_empty());
        assert_eq!(table.cell(1, 0), &Cell::Empty);
        assert_eq!(table.cell(1, 1), &Cell::Text("Sales".into()));
        assert_eq!(table.cell(2, 1), &Cell::Number(100.0));
        assert_eq!(table.cell(2, 2), &Cell::Number(10.5));
    }

    #[test]
    fn sheet_cells_map_to_cell_kinds() {
        assert_eq!(sheet_to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(sheet_to_cell(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(
            sheet_to_cell(&Data::DateTimeIso("2024-01-01".into())),
            Cell::Text("2024-01-01".into())
        );
        assert!(matches!(
            sheet_to_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Text(_)
        ));
        assert!(Range::<Data>::empty().start().is_none());
        assert!(range_to_table(&Range::<Data>::empty()).is_empty());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = load_file(Path::new("table.xyz")).unwrap_err();
        assert!(err.to_string().contains(".xyz"));
    }
}
