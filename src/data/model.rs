use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell – a single decoded value of the raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the table decoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Decoders may surface booleans; coercion treats them as non-numeric.
    Bool(bool),
}

impl Cell {
    /// Textual form used for labels. `None` for empty cells.
    pub fn label_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – ragged rows of cells
// ---------------------------------------------------------------------------

static EMPTY_CELL: Cell = Cell::Empty;

/// The decoded table. Rows may have differing lengths; a cell past the end
/// of its row is missing, not zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        RawTable { rows }
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell lookup that treats out-of-range positions as missing.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Rows that carry data (everything after the header, if any).
    pub fn data_rows(&self, has_header: bool) -> &[Vec<Cell>] {
        let skip = usize::from(has_header).min(self.rows.len());
        &self.rows[skip..]
    }
}

// ---------------------------------------------------------------------------
// Value – the outcome of coercing a cell
// ---------------------------------------------------------------------------

/// A coerced cell: a number (possibly non-finite) or an explicit marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    NotANumber,
}

impl Value {
    /// The number, only when it is finite.
    pub fn finite(self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }

    pub fn is_finite(self) -> bool {
        self.finite().is_some()
    }
}

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Whether a series runs down a column or across a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    ByColumn,
    /// The first cell of each row is its label.
    ByRow,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::ByColumn => write!(f, "columns"),
            Orientation::ByRow => write!(f, "rows"),
        }
    }
}

/// Everything the user can adjust before an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub has_header: bool,
    pub orientation: Orientation,
    /// Column indices (by column) or data-row indices (by row).
    pub selection: BTreeSet<usize>,
}

// ---------------------------------------------------------------------------
// Series & CorrelationMatrix – derived results
// ---------------------------------------------------------------------------

/// One named, position-aligned numeric sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Value>,
}

impl Series {
    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

/// Symmetric n×n matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<String>,
    pub grid: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.grid.get(i).and_then(|row| row.get(j)).copied()
    }
}
