use rayon::prelude::*;

use crate::data::model::{AnalysisConfig, CorrelationMatrix, RawTable, Series, Value};
use crate::data::series::extract_series;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Pairwise coefficient
// ---------------------------------------------------------------------------

/// Pearson coefficient of two position-aligned sequences.
///
/// Positions where either side is missing (past the end of the shorter
/// sequence) or not finite are skipped. Returns `None` when fewer than two
/// valid pairs remain. Zero variance on either side yields `Some(0.0)`.
pub fn pearson(a: &[Value], b: &[Value]) -> Option<f64> {
    let len = a.len().max(b.len());

    let mut k = 0usize;
    let (mut sum_a, mut sum_b, mut sum_ab, mut sum_a2, mut sum_b2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    // First valid pair, and whether each side ever differs from it.
    let mut first: Option<(f64, f64)> = None;
    let (mut a_varies, mut b_varies) = (false, false);
    for i in 0..len {
        let (Some(x), Some(y)) = (
            a.get(i).and_then(|v| v.finite()),
            b.get(i).and_then(|v| v.finite()),
        ) else {
            continue;
        };
        let (x0, y0) = *first.get_or_insert((x, y));
        a_varies |= x != x0;
        b_varies |= y != y0;
        k += 1;
        sum_a += x;
        sum_b += y;
        sum_ab += x * y;
        sum_a2 += x * x;
        sum_b2 += y * y;
    }

    if k < 2 {
        return None;
    }

    // Exactly constant input: the sums below would leave rounding residue
    // (0.1 repeated gives a variance around 1e-17, not 0).
    if !a_varies || !b_varies {
        return Some(0.0);
    }

    let n = k as f64;
    let numerator = n * sum_ab - sum_a * sum_b;
    let denominator = ((n * sum_a2 - sum_a * sum_a) * (n * sum_b2 - sum_b * sum_b)).sqrt();
    if denominator == 0.0 {
        return Some(0.0);
    }

    let r = numerator / denominator;
    // Cancellation can push the variance product slightly negative (NaN) or
    // the ratio a hair past ±1.
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        Some(0.0)
    }
}

// ---------------------------------------------------------------------------
// Matrix assembly
// ---------------------------------------------------------------------------

/// Build the symmetric matrix over `series`, in input order.
///
/// The diagonal is fixed at 1. Each row of the upper triangle is computed in
/// parallel and mirrored into the lower triangle; undefined pairs become 0.
pub fn build_matrix(series: &[Series]) -> CorrelationMatrix {
    let n = series.len();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i + 1..n)
                .map(|j| pearson(&series[i].values, &series[j].values).unwrap_or(0.0))
                .collect()
        })
        .collect();

    let mut grid = vec![vec![0.0; n]; n];
    for (i, row) in upper.iter().enumerate() {
        grid[i][i] = 1.0;
        for (offset, &r) in row.iter().enumerate() {
            let j = i + 1 + offset;
            grid[i][j] = r;
            grid[j][i] = r;
        }
    }

    CorrelationMatrix {
        variables: series.iter().map(|s| s.name.clone()).collect(),
        grid,
    }
}

/// Run one full analysis: extract the selected series, then correlate them.
pub fn analyze(
    table: &RawTable,
    config: &AnalysisConfig,
) -> Result<(Vec<Series>, CorrelationMatrix), AnalysisError> {
    let series = extract_series(table, config)?;
    let matrix = build_matrix(&series);
    log::info!("built {n}×{n} correlation matrix", n = matrix.len());
    Ok((series, matrix))
}
