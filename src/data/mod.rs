/// Data layer: decoding, structure inference, series extraction, export.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode file → RawTable (ragged rows of cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ inference  │  header row? which columns/rows look numeric?
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  series   │  selection → aligned named series (via coerce)
///   └──────────┘
///        │
///        ▼
///   correlation::build_matrix ──► export (csv / json / png)
/// ```

pub mod coerce;
pub mod export;
pub mod inference;
pub mod loader;
pub mod model;
pub mod series;
