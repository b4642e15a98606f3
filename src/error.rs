use thiserror::Error;

/// Table- and selection-level failures of an analysis run.
///
/// Degenerate pairs (too few aligned points, zero variance) are not errors:
/// the correlation engine resolves them to 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("the table contains no data")]
    NoData,

    #[error("select at least two series to correlate ({selected} selected)")]
    InsufficientSelection { selected: usize },

    #[error(
        "only {usable} selected series have at least two numeric values; \
         not enough numeric data in: {}",
        .dropped.join(", ")
    )]
    InsufficientSeries { usable: usize, dropped: Vec<String> },
}
