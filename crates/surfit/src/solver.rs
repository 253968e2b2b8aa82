//! Least-squares fit of bivariate polynomial coefficients.
//!
//! Model
//! - Design matrix `A` (one row per point, one column per monomial in
//!   `basis` order), target `b` (the point heights).
//! - Default backend: normal equations `(AᵀA) c = Aᵀb`, solved through an
//!   explicit Gauss–Jordan inverse of `AᵀA`.
//! - `Qr` factors `A` directly and can replace the default without changing
//!   any caller contract.
//!
//! Limitations
//! - `AᵀA` squares the condition number of `A`. Near-duplicate points, high
//!   degrees, or wide coordinate ranges lose precision quickly. Nothing here
//!   mitigates that; recentering the coordinates (see `surface`) helps.
//! - No regularization. Under-determined input (`points < terms`) reports
//!   `SingularSystem`; the "at least 3 points" floor is the caller's check.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::basis::{evaluate_row_into, term_count, Polynomial2};
use crate::points::Point;

/// Fit failures. All are explicit; a returned polynomial is always finite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FitError {
    /// The system matrix has no usable pivot within `SolverCfg::pivot_eps`.
    SingularSystem,
    /// A point coordinate is NaN or infinite.
    NonFiniteInput { index: usize },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::SingularSystem => write!(f, "fit failed: degenerate data (singular system)"),
            FitError::NonFiniteInput { index } => {
                write!(f, "fit failed: point {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for FitError {}

/// Solver tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverCfg {
    /// A pivot must satisfy `|p| > pivot_eps`.
    pub pivot_eps: f64,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self { pivot_eps: 1e-12 }
    }
}

/// Backend that solves `min ||A c - b||` for `c`.
pub trait LeastSquaresSolver {
    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, FitError>;
}

/// Normal equations with an explicit Gauss–Jordan inverse.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussJordan {
    pub cfg: SolverCfg,
}

impl LeastSquaresSolver for GaussJordan {
    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, FitError> {
        let at = a.transpose();
        let ata = &at * a;
        let atb = &at * b;
        let inv = invert_gauss_jordan(&ata, self.cfg.pivot_eps).ok_or(FitError::SingularSystem)?;
        Ok(inv * atb)
    }
}

/// Householder QR on the design matrix itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct Qr {
    pub cfg: SolverCfg,
}

impl LeastSquaresSolver for Qr {
    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, FitError> {
        if a.nrows() < a.ncols() {
            return Err(FitError::SingularSystem);
        }
        let qr = a.clone().qr();
        let r = qr.r();
        if r.diagonal().iter().any(|d| !(d.abs() > self.cfg.pivot_eps)) {
            return Err(FitError::SingularSystem);
        }
        let qtb = qr.q().transpose() * b;
        r.solve_upper_triangular(&qtb)
            .ok_or(FitError::SingularSystem)
    }
}

/// Inverse of a square matrix by Gauss–Jordan elimination.
///
/// Pivoting: when `|m[i,i]| <= eps`, the row below with the largest `|m[r,i]|`
/// is swapped in. Returns `None` if the pivot is still `<= eps` (or NaN).
pub fn invert_gauss_jordan(m: &DMatrix<f64>, eps: f64) -> Option<DMatrix<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }
    let mut a = m.clone();
    let mut inv = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        if !(a[(i, i)].abs() > eps) {
            let best = (i + 1..n).max_by(|&r, &s| a[(r, i)].abs().total_cmp(&a[(s, i)].abs()));
            if let Some(r) = best {
                if a[(r, i)].abs() > a[(i, i)].abs() {
                    a.swap_rows(i, r);
                    inv.swap_rows(i, r);
                }
            }
        }
        let pivot = a[(i, i)];
        if !(pivot.abs() > eps) {
            return None;
        }
        let inv_pivot = 1.0 / pivot;
        a.row_mut(i).scale_mut(inv_pivot);
        inv.row_mut(i).scale_mut(inv_pivot);
        for r in 0..n {
            if r == i {
                continue;
            }
            let factor = a[(r, i)];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                a[(r, c)] -= factor * a[(i, c)];
                inv[(r, c)] -= factor * inv[(i, c)];
            }
        }
    }
    Some(inv)
}

/// Design matrix and target vector for `points` at `degree`.
pub fn design_matrix(points: &[Point], degree: usize) -> (DMatrix<f64>, DVector<f64>) {
    let n = term_count(degree);
    let mut a = DMatrix::<f64>::zeros(points.len(), n);
    let mut row = Vec::with_capacity(n);
    for (r, p) in points.iter().enumerate() {
        evaluate_row_into(p.x, p.y, degree, &mut row);
        for (c, v) in row.iter().enumerate() {
            a[(r, c)] = *v;
        }
    }
    let b = DVector::from_iterator(points.len(), points.iter().map(|p| p.z));
    (a, b)
}

/// Fit with the default Gauss–Jordan backend.
pub fn fit(points: &[Point], degree: usize) -> Result<Polynomial2, FitError> {
    fit_with(points, degree, &GaussJordan::default())
}

/// Fit `z ≈ Σ c_k x^i y^j` over `points` with the given backend.
pub fn fit_with<S: LeastSquaresSolver + ?Sized>(
    points: &[Point],
    degree: usize,
    solver: &S,
) -> Result<Polynomial2, FitError> {
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(FitError::NonFiniteInput { index });
    }
    let (a, b) = design_matrix(points, degree);
    let c = solver.solve(&a, &b)?;
    if c.iter().any(|v| !v.is_finite()) {
        return Err(FitError::SingularSystem);
    }
    debug!(
        degree,
        terms = c.len(),
        points = points.len(),
        "polynomial fit"
    );
    Polynomial2::new(degree, c.iter().copied().collect()).map_err(|_| FitError::SingularSystem)
}

/// Signed residuals `z - p(x, y)`, one per point.
pub fn residuals(points: &[Point], poly: &Polynomial2) -> Vec<f64> {
    points.iter().map(|p| p.z - poly.eval(p.x, p.y)).collect()
}

/// Root-mean-square residual; `None` for an empty point list.
pub fn rms_residual(points: &[Point], poly: &Polynomial2) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let ss: f64 = residuals(points, poly).iter().map(|r| r * r).sum();
    Some((ss / points.len() as f64).sqrt())
}
