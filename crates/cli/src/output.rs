//! Surface serialization: JSON document and long-form grid table.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use serde_json::{json, Value};
use std::fs::File;
use std::path::Path;
use surfit::sampler::is_invalid;
use surfit::slices::Slice;
use surfit::surface::SurfaceResult;

fn cell(v: f64) -> Option<f64> {
    (!is_invalid(v)).then_some(v)
}

fn slice_json(s: &Slice) -> Value {
    json!({
        "label": s.label,
        "fixed": s.fixed,
        "axis": s.axis,
        "heights": s.heights.iter().map(|&v| cell(v)).collect::<Vec<_>>(),
    })
}

/// Grid, value range, contours, local-frame coefficients and slices.
/// Masked cells are `null`. `contours` carries `start/end/size`; the explicit
/// `contour_levels` list is `null` when it would exceed `surfit::sampler::MAX_CONTOUR_LEVELS`.
pub fn surface_json(result: &SurfaceResult) -> Value {
    let s = &result.surface;
    let z: Vec<Vec<Option<f64>>> = s
        .grid
        .z
        .iter()
        .map(|row| row.iter().map(|&v| cell(v)).collect())
        .collect();
    let (valid_min, valid_max) = s.valid_range().unzip();
    let contours = s.contour_spec();
    json!({
        "x_vals": s.grid.x_vals,
        "y_vals": s.grid.y_vals,
        "z": z,
        "valid_min": valid_min,
        "valid_max": valid_max,
        "contours": contours.map(|c| json!({"start": c.start, "end": c.end, "size": c.step})),
        "contour_levels": contours.and_then(|c| c.levels()),
        "non_finite_cells": s.grid.non_finite,
        "degree": s.polynomial.degree(),
        "coefficients": s.polynomial.coefficients(),
        "origin": [s.origin.x, s.origin.y],
        "x_slices": result.slices.x_slices.iter().map(slice_json).collect::<Vec<_>>(),
        "y_slices": result.slices.y_slices.iter().map(slice_json).collect::<Vec<_>>(),
    })
}

/// One row per grid cell: `x`, `y` in the source frame, `z` null when masked.
pub fn grid_frame(result: &SurfaceResult) -> PolarsResult<DataFrame> {
    let s = &result.surface;
    let cells = s.grid.x_vals.len() * s.grid.y_vals.len();
    let mut xs = Vec::with_capacity(cells);
    let mut ys = Vec::with_capacity(cells);
    let mut zs = Vec::with_capacity(cells);
    for (row, &y) in s.grid.z.iter().zip(&s.grid.y_vals) {
        for (&v, &x) in row.iter().zip(&s.grid.x_vals) {
            xs.push(s.origin.x + x);
            ys.push(s.origin.y + y);
            zs.push(cell(v));
        }
    }
    df!("x" => xs, "y" => ys, "z" => zs)
}

/// On-disk format of the grid table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridFormat {
    Csv,
    Parquet,
}

impl GridFormat {
    /// Pick the format from the file extension (`.csv` or `.parquet`, any case).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(GridFormat::Csv),
            Some("parquet") => Ok(GridFormat::Parquet),
            _ => bail!("grid table must end in .csv or .parquet: {}", path.display()),
        }
    }
}

/// Write `grid_frame` to `path` in `format`.
pub fn write_grid_table(result: &SurfaceResult, path: &Path, format: GridFormat) -> Result<()> {
    let mut df = grid_frame(result)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match format {
        GridFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
        GridFormat::Parquet => {
            ParquetWriter::new(file).finish(&mut df)?;
        }
    }
    tracing::info!(rows = df.height(), path = %path.display(), "grid table written");
    Ok(())
}
