use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::{Rgb, RgbImage};
use serde::Serialize;

use super::model::{AnalysisConfig, CorrelationMatrix};
use crate::color::diverging_rgb;

/// Side length of one heatmap cell in exported images, in pixels.
pub const PNG_CELL_SIZE: u32 = 32;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Export a matrix to a file.  Dispatch by extension (`csv`, `json`, `png`).
pub fn export_file(path: &Path, matrix: &CorrelationMatrix, config: &AnalysisConfig) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::create(path).context("creating CSV file")?;
            write_csv(file, matrix)?;
        }
        "json" => {
            let file = std::fs::File::create(path).context("creating JSON file")?;
            write_json(file, matrix, config)?;
        }
        "png" => render_png(matrix)
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?,
        other => bail!("Unsupported export extension: .{other}"),
    }

    log::info!("Exported {}×{} matrix to {}", matrix.len(), matrix.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Square table: a blank corner, variable names across, one row per variable.
pub fn write_csv<W: Write>(writer: W, matrix: &CorrelationMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(std::iter::once("").chain(matrix.variables.iter().map(String::as_str)))?;
    for (name, row) in matrix.variables.iter().zip(&matrix.grid) {
        let values: Vec<String> = row.iter().map(|r| r.to_string()).collect();
        wtr.write_record(std::iter::once(name.as_str()).chain(values.iter().map(String::as_str)))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonExport<'a> {
    config: &'a AnalysisConfig,
    matrix: &'a CorrelationMatrix,
}

/// Matrix together with the configuration that produced it.
pub fn write_json<W: Write>(
    writer: W,
    matrix: &CorrelationMatrix,
    config: &AnalysisConfig,
) -> Result<()> {
    serde_json::to_writer_pretty(writer, &JsonExport { config, matrix })
        .context("serializing matrix to JSON")
}

// ---------------------------------------------------------------------------
// PNG heatmap
// ---------------------------------------------------------------------------

/// Rasterise the matrix, one square per coefficient, with a 1px gap.
pub fn render_png(matrix: &CorrelationMatrix) -> RgbImage {
    let n = matrix.len() as u32;
    let side = (n * PNG_CELL_SIZE).max(1);
    RgbImage::from_fn(side, side, |x, y| {
        let (i, j) = ((y / PNG_CELL_SIZE) as usize, (x / PNG_CELL_SIZE) as usize);
        let last = PNG_CELL_SIZE - 1;
        let on_gap = x % PNG_CELL_SIZE == last || y % PNG_CELL_SIZE == last;
        match matrix.get(i, j) {
            Some(r) if !on_gap => Rgb(diverging_rgb(r)),
            _ => Rgb([255, 255, 255]),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::Orientation;

    fn sample() -> CorrelationMatrix {
        CorrelationMatrix {
            variables: vec!["Sales".into(), "Visitors".into()],
            grid: vec![vec![1.0, -0.5], vec![-0.5, 1.0]],
        }
    }

    #[test]
    fn csv_is_square_with_names() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![",Sales,Visitors", "Sales,1,-0.5", "Visitors,-0.5,1"]);
    }

    #[test]
    fn json_carries_config() {
        let config = AnalysisConfig {
            has_header: true,
            orientation: Orientation::ByColumn,
            selection: BTreeSet::from([1, 2]),
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &sample(), &config).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["config"]["has_header"], true);
        assert_eq!(parsed["config"]["selection"], serde_json::json!([1, 2]));
        assert_eq!(parsed["matrix"]["variables"][1], "Visitors");
        assert_eq!(parsed["matrix"]["grid"][0][1], -0.5);
    }

    #[test]
    fn png_has_one_square_per_coefficient() {
        let img = render_png(&sample());
        assert_eq!(img.dimensions(), (2 * PNG_CELL_SIZE, 2 * PNG_CELL_SIZE));
        assert_eq!(img.get_pixel(0, 0).0, diverging_rgb(1.0));
        assert_eq!(img.get_pixel(PNG_CELL_SIZE, 0).0, diverging_rgb(-0.5));
        assert_eq!(img.get_pixel(PNG_CELL_SIZE - 1, 0).0, [255, 255, 255]);
    }
}
