//! One fit request end to end: points in, sampled surface and slices out.
//!
//! Steps
//! 1. Reject fewer than `MIN_POINTS` points.
//! 2. Resolve the sampling `Domain` (its origin is the fit frame).
//! 3. Shift points into the fit frame and fit the polynomial.
//! 4. Optionally zero coefficients 1 and 2 (tilt removal).
//! 5. Build the mask, sample the grid, cut the slices.
//!
//! Each call recomputes everything from the snapshot it was given.

use std::fmt;

use nalgebra::Vector2;
use tracing::debug;

use crate::basis::{BasisError, Polynomial2};
use crate::points::Point;
use crate::region::{Circle, ConvexHull, DualCircle, Region, SingleCirclePolicy, Unbounded};
use crate::sampler::{sample, ContourSpec, Domain, Grid};
use crate::slices::{extract_slices, SliceSet};
use crate::solver::{fit_with, FitError, GaussJordan, LeastSquaresSolver, Qr, SolverCfg};

/// Smallest point count for which a surface is attempted.
pub const MIN_POINTS: usize = 3;
/// Grid resolution of the circle-recentered preset.
pub const CIRCLE_STEPS: usize = 303;
/// Grid resolution of the hull-masked preset.
pub const HULL_STEPS: usize = 30;

/// Errors from `build_surface`.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceError {
    /// Fewer than `MIN_POINTS` points.
    InsufficientData { found: usize },
    /// The sampling window has zero or non-finite extent.
    EmptyDomain,
    Fit(FitError),
    Basis(BasisError),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::InsufficientData { found } => write!(
                f,
                "too few points for a surface: {found} (need at least {MIN_POINTS})"
            ),
            SurfaceError::EmptyDomain => write!(f, "sampling domain has no extent"),
            SurfaceError::Fit(e) => write!(f, "{e}"),
            SurfaceError::Basis(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SurfaceError::Fit(e) => Some(e),
            SurfaceError::Basis(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FitError> for SurfaceError {
    fn from(e: FitError) -> Self {
        SurfaceError::Fit(e)
    }
}

impl From<BasisError> for SurfaceError {
    fn from(e: BasisError) -> Self {
        SurfaceError::Basis(e)
    }
}

/// Which mask the sampled grid uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegionSpec {
    Circles {
        first: Option<Circle>,
        second: Option<Circle>,
        policy: SingleCirclePolicy,
    },
    /// Convex hull of the request's points.
    ConvexHull,
    Unbounded,
}

/// How the sampling window (and fit frame) is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DomainSpec {
    /// `[-R, R]²` around the circle's center with `R` its radius; without a
    /// circle, around the bounding-box center with `R = min(span)/2`.
    Recentered { circle: Option<Circle> },
    /// Raw bounding box of the points, no shift.
    BoundingBox,
}

/// Backend for the coefficient solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverKind {
    #[default]
    GaussJordan,
    Qr,
}

/// Everything a fit request needs besides the points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRequest {
    pub degree: usize,
    pub region: RegionSpec,
    pub domain: DomainSpec,
    /// Samples per axis, both ends included.
    pub steps: usize,
    /// Apply `Polynomial2::without_tilt` before sampling.
    pub remove_tilt: bool,
    pub solver: SolverKind,
    pub solver_cfg: SolverCfg,
}

impl SurfaceRequest {
    /// Recentered on `first`, masked by the circle pair, tilt removed, 303 steps.
    pub fn circle_recentered(degree: usize, first: Option<Circle>, second: Option<Circle>) -> Self {
        Self {
            degree,
            region: RegionSpec::Circles {
                first,
                second,
                policy: SingleCirclePolicy::default(),
            },
            domain: DomainSpec::Recentered { circle: first },
            steps: CIRCLE_STEPS,
            remove_tilt: true,
            solver: SolverKind::default(),
            solver_cfg: SolverCfg::default(),
        }
    }

    /// Raw coordinates, masked by the point hull, tilt kept, 30 steps.
    pub fn hull_masked(degree: usize) -> Self {
        Self {
            degree,
            region: RegionSpec::ConvexHull,
            domain: DomainSpec::BoundingBox,
            steps: HULL_STEPS,
            remove_tilt: false,
            solver: SolverKind::default(),
            solver_cfg: SolverCfg::default(),
        }
    }
}

/// Fitted polynomial plus its sampled grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub grid: Grid,
    /// Evaluated in the local frame (relative to `origin`).
    pub polynomial: Polynomial2,
    pub origin: Vector2<f64>,
}

impl Surface {
    #[inline]
    pub fn valid_range(&self) -> Option<(f64, f64)> {
        self.grid.valid_range
    }

    /// `false` when every cell is masked: nothing to draw.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.grid.valid_range.is_some()
    }

    #[inline]
    pub fn contour_spec(&self) -> Option<ContourSpec> {
        self.grid.contour_spec()
    }

    /// Height at a location given in the source frame.
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        self.polynomial.eval(x - self.origin.x, y - self.origin.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceResult {
    pub surface: Surface,
    pub slices: SliceSet,
}

fn resolve_domain(points: &[Point], spec: DomainSpec) -> Result<Domain, SurfaceError> {
    let domain = match spec {
        DomainSpec::Recentered { circle: Some(c) } => Some(Domain::recentered(c.center, c.radius)),
        DomainSpec::Recentered { circle: None } => Domain::centered_on(points),
        DomainSpec::BoundingBox => Domain::bounding_box(points),
    };
    domain
        .filter(|d| !d.is_degenerate())
        .ok_or(SurfaceError::EmptyDomain)
}

fn build_region(points: &[Point], spec: RegionSpec) -> Box<dyn Region> {
    match spec {
        RegionSpec::Circles {
            first,
            second,
            policy,
        } => Box::new(DualCircle {
            first,
            second,
            policy,
        }),
        RegionSpec::ConvexHull => Box::new(ConvexHull::from_points(points)),
        RegionSpec::Unbounded => Box::new(Unbounded),
    }
}

fn solver_for(kind: SolverKind, cfg: SolverCfg) -> Box<dyn LeastSquaresSolver> {
    match kind {
        SolverKind::GaussJordan => Box::new(GaussJordan { cfg }),
        SolverKind::Qr => Box::new(Qr { cfg }),
    }
}

fn sample_request(
    points: &[Point],
    request: &SurfaceRequest,
    polynomial: Polynomial2,
    domain: Domain,
) -> SurfaceResult {
    let region = build_region(points, request.region);
    let grid = sample(&polynomial, region.as_ref(), &domain, request.steps);
    let slices = extract_slices(&grid);
    SurfaceResult {
        surface: Surface {
            grid,
            polynomial,
            origin: domain.origin,
        },
        slices,
    }
}

/// Run one request against a snapshot of points.
pub fn build_surface(
    points: &[Point],
    request: &SurfaceRequest,
) -> Result<SurfaceResult, SurfaceError> {
    if points.len() < MIN_POINTS {
        return Err(SurfaceError::InsufficientData {
            found: points.len(),
        });
    }
    let domain = resolve_domain(points, request.domain)?;
    let local: Vec<Point> = points.iter().map(|p| p.shifted(domain.origin)).collect();
    let solver = solver_for(request.solver, request.solver_cfg);
    let mut polynomial = fit_with(&local, request.degree, solver.as_ref())?;
    if request.remove_tilt {
        polynomial = polynomial.without_tilt();
    }
    let result = sample_request(points, request, polynomial, domain);
    debug!(
        points = points.len(),
        degree = request.degree,
        steps = request.steps,
        invalid = result.surface.grid.invalid_count(),
        "surface built"
    );
    Ok(result)
}

/// Sample a stored coefficient vector under `request` without refitting.
///
/// `coefficients` must be in the local frame of the request's domain and match
/// `request.degree`; `points` only feed the domain and hull. Tilt removal is
/// applied as for a fresh fit.
pub fn resample(
    points: &[Point],
    request: &SurfaceRequest,
    coefficients: &[f64],
) -> Result<SurfaceResult, SurfaceError> {
    let mut polynomial = Polynomial2::new(request.degree, coefficients.to_vec())?;
    if request.remove_tilt {
        polynomial = polynomial.without_tilt();
    }
    let domain = resolve_domain(points, request.domain)?;
    Ok(sample_request(points, request, polynomial, domain))
}
