//! Regular-grid sampling of a fitted polynomial.
//!
//! Frames
//! - A `Domain` carries an `origin` and axis ranges in the *local* frame
//!   (coordinates relative to `origin`). The polynomial is evaluated in the
//!   local frame; the mask is queried at `origin + local`, i.e. in the frame
//!   the points were digitized in.
//! - The recentered variant puts `origin` at a circle center and samples
//!   `[-R, R]²`; the raw variant keeps `origin = 0` and samples the point
//!   bounding box.
//!
//! Grid layout
//! - `z[j][i]` is the height at `(x_vals[i], y_vals[j])`; masked cells hold
//!   `INVALID` (NaN).
//! - Cells inside the mask whose value overflows to NaN or ±inf are stored as
//!   `INVALID` too, and counted in `Grid::non_finite` so they can be told
//!   apart from masked ones.

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::basis::{BasisError, Polynomial2};
use crate::points::Point;
use crate::region::Region;

/// Marker for masked-out cells.
pub const INVALID: f64 = f64::NAN;

#[inline]
pub fn is_invalid(v: f64) -> bool {
    v.is_nan()
}

/// Axis-aligned sampling window with a frame origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub origin: Vector2<f64>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Domain {
    /// `[-half_width, half_width]²` around `center`.
    pub fn recentered(center: Vector2<f64>, half_width: f64) -> Self {
        Self {
            origin: center,
            x_range: (-half_width, half_width),
            y_range: (-half_width, half_width),
        }
    }

    /// Square window centered on the bounding box of `points`, half width
    /// `min(span_x, span_y) / 2`. `None` for an empty slice.
    pub fn centered_on(points: &[Point]) -> Option<Self> {
        let (lo, hi) = bounds(points)?;
        let center = (lo + hi) * 0.5;
        let half = (hi.x - lo.x).min(hi.y - lo.y) * 0.5;
        Some(Self::recentered(center, half))
    }

    /// Raw bounding box of `points` (origin at zero). `None` for an empty slice.
    pub fn bounding_box(points: &[Point]) -> Option<Self> {
        let (lo, hi) = bounds(points)?;
        Some(Self {
            origin: Vector2::zeros(),
            x_range: (lo.x, hi.x),
            y_range: (lo.y, hi.y),
        })
    }

    /// Zero-width or non-finite along either axis.
    pub fn is_degenerate(&self) -> bool {
        let ok = |(a, b): (f64, f64)| a.is_finite() && b.is_finite() && b > a;
        !(ok(self.x_range) && ok(self.y_range))
    }
}

fn bounds(points: &[Point]) -> Option<(Vector2<f64>, Vector2<f64>)> {
    let first = points.first()?.xy();
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (
            Vector2::new(lo.x.min(p.x), lo.y.min(p.y)),
            Vector2::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// `steps` evenly spaced values from `lo` to `hi`, both inclusive.
pub fn axis_values(lo: f64, hi: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (steps - 1) as f64;
            (0..steps).map(|i| lo + i as f64 * step).collect()
        }
    }
}

/// Upper bound on the number of levels `ContourSpec::levels` materializes.
pub const MAX_CONTOUR_LEVELS: usize = 1024;

/// Evenly stepped contour levels `start, start + step, ..., end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourSpec {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl ContourSpec {
    /// Integer levels from `floor(lo)` to `ceil(hi)`; `None` unless both are finite and `lo <= hi`.
    pub fn unit_steps(lo: f64, hi: f64) -> Option<Self> {
        (lo.is_finite() && hi.is_finite() && lo <= hi).then(|| Self {
            start: lo.floor(),
            end: hi.ceil(),
            step: 1.0,
        })
    }

    /// Number of levels, saturating at `usize::MAX`.
    pub fn count(&self) -> usize {
        ((self.end - self.start) / self.step).floor() as usize + 1
    }

    /// The explicit level list, or `None` above `MAX_CONTOUR_LEVELS`.
    pub fn levels(&self) -> Option<Vec<f64>> {
        let n = self.count();
        (n <= MAX_CONTOUR_LEVELS).then(|| {
            (0..n)
                .map(|k| self.start + k as f64 * self.step)
                .collect()
        })
    }
}

/// Sampled height field.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub x_vals: Vec<f64>,
    pub y_vals: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    /// `(min, max)` over valid cells; `None` when every cell is masked.
    pub valid_range: Option<(f64, f64)>,
    /// In-mask cells whose value was not finite (stored as `INVALID`).
    pub non_finite: usize,
}

impl Grid {
    pub fn valid_count(&self) -> usize {
        self.z
            .iter()
            .flat_map(|row| row.iter())
            .filter(|v| !is_invalid(**v))
            .count()
    }

    /// Masked plus non-finite cells.
    pub fn invalid_count(&self) -> usize {
        self.x_vals.len() * self.y_vals.len() - self.valid_count()
    }

    /// Cells outside the region.
    pub fn masked_count(&self) -> usize {
        self.invalid_count() - self.non_finite
    }

    /// Unit-step contours over the valid range; `None` when there is no valid cell.
    pub fn contour_spec(&self) -> Option<ContourSpec> {
        let (lo, hi) = self.valid_range?;
        ContourSpec::unit_steps(lo, hi)
    }
}

/// Evaluate `poly` on a `steps × steps` grid over `domain`, masked by `region`.
pub fn sample<R: Region + ?Sized>(
    poly: &Polynomial2,
    region: &R,
    domain: &Domain,
    steps: usize,
) -> Grid {
    let x_vals = axis_values(domain.x_range.0, domain.x_range.1, steps);
    let y_vals = axis_values(domain.y_range.0, domain.y_range.1, steps);
    let mut range: Option<(f64, f64)> = None;
    let mut non_finite = 0;
    let mut z = Vec::with_capacity(y_vals.len());
    for &y in &y_vals {
        let mut row = Vec::with_capacity(x_vals.len());
        for &x in &x_vals {
            if !region.contains(domain.origin.x + x, domain.origin.y + y) {
                row.push(INVALID);
                continue;
            }
            let v = poly.eval(x, y);
            if !v.is_finite() {
                non_finite += 1;
                row.push(INVALID);
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
            row.push(v);
        }
        z.push(row);
    }
    if non_finite > 0 {
        warn!(non_finite, "surface overflowed inside the region");
    }
    let grid = Grid {
        x_vals,
        y_vals,
        z,
        valid_range: range,
        non_finite,
    };
    debug!(
        steps,
        valid = grid.valid_count(),
        range = ?grid.valid_range,
        "sampled surface"
    );
    grid
}

/// `sample` for a bare coefficient vector; fails when its length does not match `degree`.
pub fn sample_coefficients<R: Region + ?Sized>(
    coefficients: &[f64],
    degree: usize,
    region: &R,
    domain: &Domain,
    steps: usize,
) -> Result<Grid, BasisError> {
    let poly = Polynomial2::new(degree, coefficients.to_vec())?;
    Ok(sample(&poly, region, domain, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Circle, ConvexHull, DualCircle, Unbounded};

    #[test]
    fn axis_values_include_both_ends() {
        let v = axis_values(-1.0, 1.0, 5);
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(axis_values(3.0, 9.0, 1), vec![3.0]);
        assert!(axis_values(0.0, 1.0, 0).is_empty());
        let w = axis_values(-10.0, 10.0, 303);
        assert_eq!(w.len(), 303);
        assert!((w[302] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn flat_surface_over_covering_region() {
        let poly = Polynomial2::constant(3, 7.0);
        let domain = Domain::recentered(Vector2::new(5.0, 5.0), 2.0);
        // circle of radius 3 covers the whole 4x4 square (half diagonal ~2.83)
        let region = Circle::new(5.0, 5.0, 3.0);
        let grid = sample(&poly, &region, &domain, 30);
        assert_eq!(grid.invalid_count(), 0);
        assert_eq!(grid.valid_range, Some((7.0, 7.0)));
        assert_eq!(grid.contour_spec().and_then(|c| c.levels()), Some(vec![7.0]));
    }

    #[test]
    fn mask_is_queried_in_source_frame() {
        let poly = Polynomial2::constant(0, 1.0);
        let domain = Domain::recentered(Vector2::new(100.0, 50.0), 10.0);
        let region = DualCircle {
            first: Some(Circle::new(100.0, 50.0, 10.0)),
            ..Default::default()
        };
        let grid = sample(&poly, &region, &domain, 21);
        // center cell valid, corners outside the inscribed circle
        assert!(!is_invalid(grid.z[10][10]));
        assert!(is_invalid(grid.z[0][0]));
        assert!(is_invalid(grid.z[20][20]));
        // edge midpoints sit exactly on the circle
        assert!(!is_invalid(grid.z[10][0]));
        assert!(!is_invalid(grid.z[0][10]));
    }

    #[test]
    fn grid_rows_follow_y() {
        // z = y
        let poly = Polynomial2::new(1, vec![0.0, 1.0, 0.0]).unwrap();
        let domain = Domain {
            origin: Vector2::zeros(),
            x_range: (0.0, 2.0),
            y_range: (10.0, 12.0),
        };
        let grid = sample(&poly, &Unbounded, &domain, 3);
        assert_eq!(grid.z[2], vec![12.0, 12.0, 12.0]);
        assert_eq!(grid.valid_range, Some((10.0, 12.0)));
        let spec = grid.contour_spec().unwrap();
        assert_eq!((spec.start, spec.end, spec.step), (10.0, 12.0, 1.0));
        assert_eq!(spec.levels(), Some(vec![10.0, 11.0, 12.0]));
    }

    #[test]
    fn fully_masked_grid_has_no_range() {
        let poly = Polynomial2::constant(1, 3.0);
        let domain = Domain::recentered(Vector2::zeros(), 1.0);
        let region = Circle::new(50.0, 50.0, 1.0);
        let grid = sample(&poly, &region, &domain, 10);
        assert_eq!(grid.valid_count(), 0);
        assert_eq!(grid.invalid_count(), 100);
        assert_eq!(grid.valid_range, None);
        assert_eq!(grid.contour_spec(), None);
        assert_eq!(grid.masked_count(), 100);
    }

    #[test]
    fn hull_masked_bounding_box() {
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(0.0, 4.0, 0.0),
        ];
        let domain = Domain::bounding_box(&pts).unwrap();
        assert_eq!(domain.x_range, (0.0, 4.0));
        let hull = ConvexHull::from_points(&pts);
        let grid = sample(&Polynomial2::constant(2, 1.0), &hull, &domain, 5);
        // lower-left triangle (i + j <= 4) is valid
        for j in 0..5 {
            for i in 0..5 {
                assert_eq!(!is_invalid(grid.z[j][i]), i + j <= 4, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn coefficient_length_mismatch_is_rejected() {
        let domain = Domain::recentered(Vector2::zeros(), 1.0);
        let err = sample_coefficients(&[1.0, 2.0], 2, &Unbounded, &domain, 4).unwrap_err();
        assert!(matches!(err, BasisError::InvalidArgument { expected: 6, .. }));
        assert!(sample_coefficients(&[1.0], 0, &Unbounded, &domain, 4).is_ok());
    }

    #[test]
    fn domains_from_points() {
        let pts = vec![Point::new(0.0, 0.0, 0.0), Point::new(10.0, 4.0, 0.0)];
        let d = Domain::centered_on(&pts).unwrap();
        assert_eq!(d.origin, Vector2::new(5.0, 2.0));
        assert_eq!(d.x_range, (-2.0, 2.0));
        assert!(Domain::centered_on(&[]).is_none());
        let flat = vec![Point::new(1.0, 0.0, 0.0), Point::new(1.0, 5.0, 0.0)];
        assert!(Domain::bounding_box(&flat).unwrap().is_degenerate());
    }

    #[test]
    fn wide_range_keeps_contours_as_a_spec() {
        // z = 1e4 x over [-1e4, 1e4]: a valid range of 2e8
        let poly = Polynomial2::new(1, vec![0.0, 0.0, 1e4]).unwrap();
        let domain = Domain::recentered(Vector2::zeros(), 1e4);
        let grid = sample(&poly, &Unbounded, &domain, 5);
        let spec = grid.contour_spec().unwrap();
        assert_eq!((spec.start, spec.end), (-1e8, 1e8));
        assert_eq!(spec.count(), 200_000_001);
        assert_eq!(spec.levels(), None);
        let edge = ContourSpec::unit_steps(0.5, MAX_CONTOUR_LEVELS as f64 - 1.5).unwrap();
        assert_eq!(edge.levels().map(|l| l.len()), Some(MAX_CONTOUR_LEVELS));
        assert!(ContourSpec::unit_steps(f64::NEG_INFINITY, 0.0).is_none());
    }

    #[test]
    fn overflow_inside_region_is_counted_apart_from_mask() {
        // 1e300 x^5 overflows at x = 50
        let mut coeffs = vec![0.0; 21];
        coeffs[crate::basis::term_index(5, 0, 5).unwrap()] = 1e300;
        let poly = Polynomial2::new(5, coeffs).unwrap();
        let domain = Domain {
            origin: Vector2::zeros(),
            x_range: (0.0, 100.0),
            y_range: (0.0, 1.0),
        };
        let region = Circle::new(0.0, 0.0, 50.0);
        let grid = sample(&poly, &region, &domain, 3);
        // only (50, 0) is both on the rim and overflowing; x = 100 is masked
        assert!(grid.non_finite > 0);
        assert!(is_invalid(grid.z[0][1]));
        assert_eq!(grid.valid_range, Some((0.0, 0.0)));
        assert_eq!(grid.masked_count() + grid.non_finite + grid.valid_count(), 9);
        assert_eq!(grid.non_finite, 1);
    }
}
