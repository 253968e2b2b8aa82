//! Fixed-axis cross-sections of a sampled grid.

use crate::sampler::Grid;

/// Grid-line positions (as fractions of `steps`) that get a slice.
pub const SLICE_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// One cross-section: `heights[k]` belongs to `axis[k]`. Masked cells stay NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice {
    /// Display label naming the fixed coordinate, e.g. `y = -12`.
    pub label: String,
    /// Value of the fixed coordinate.
    pub fixed: f64,
    pub axis: Vec<f64>,
    pub heights: Vec<f64>,
}

/// `x_slices` run along x at fixed rows; `y_slices` run along y at fixed columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliceSet {
    pub x_slices: Vec<Slice>,
    pub y_slices: Vec<Slice>,
}

/// `floor(steps * f)` for each of `SLICE_FRACTIONS`.
pub fn slice_indices(steps: usize) -> [usize; 3] {
    SLICE_FRACTIONS.map(|f| (steps as f64 * f).floor() as usize)
}

fn label(axis: &str, v: f64) -> String {
    // f64::round rounds half away from zero; `+ 0.0` keeps "-0" out of labels.
    format!("{axis} = {}", v.round() + 0.0)
}

/// Three row slices and three column slices at the quarter positions.
pub fn extract_slices(grid: &Grid) -> SliceSet {
    let rows = grid.y_vals.len();
    let cols = grid.x_vals.len();
    if rows == 0 || cols == 0 {
        return SliceSet::default();
    }
    let x_slices = slice_indices(rows)
        .into_iter()
        .map(|j| Slice {
            label: label("y", grid.y_vals[j]),
            fixed: grid.y_vals[j],
            axis: grid.x_vals.clone(),
            heights: grid.z[j].clone(),
        })
        .collect();
    let y_slices = slice_indices(cols)
        .into_iter()
        .map(|i| Slice {
            label: label("x", grid.x_vals[i]),
            fixed: grid.x_vals[i],
            axis: grid.y_vals.clone(),
            heights: grid.z.iter().map(|row| row[i]).collect(),
        })
        .collect();
    SliceSet { x_slices, y_slices }
}
