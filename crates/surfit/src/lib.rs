//! Surface reconstruction from digitized specimen points.
//!
//! Pipeline
//! - `basis`: monomial terms `x^i y^j` (`i + j <= degree`) and their evaluation.
//! - `solver`: least-squares fit of the monomial coefficients (normal equations).
//! - `region`: validity masks for the fitted surface (circle pair, convex hull).
//! - `sampler`: regular-grid sampling with masked (invalid) cells.
//! - `slices`: fixed-axis cross-sections of a sampled grid.
//! - `surface`: one request in, one surface plus slices out.
//!
//! Around the engine
//! - `points`: points grouped into strips, strip densification.
//! - `pointfile`: flat text import/export of point lists.
//! - `synth`: seeded synthetic scatter for tests and benches.
//!
//! Every call is a pure function of its inputs. Nothing is cached between
//! requests, so independent requests can run on separate threads.

pub mod basis;
pub mod pointfile;
pub mod points;
pub mod region;
pub mod sampler;
pub mod slices;
pub mod solver;
pub mod surface;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::basis::{enumerate_terms, evaluate, evaluate_row, term_count, Polynomial2};
    pub use crate::pointfile::{export_points, import_points, ImportReport};
    pub use crate::points::{interpolate_strip, Point, Strip, StripId, StripSet};
    pub use crate::region::{
        Circle, ConvexHull, DualCircle, Region, SingleCirclePolicy, Unbounded,
    };
    pub use crate::sampler::{sample, ContourSpec, Domain, Grid};
    pub use crate::slices::{extract_slices, Slice, SliceSet};
    pub use crate::solver::{fit, fit_with, FitError, GaussJordan, LeastSquaresSolver, Qr};
    pub use crate::surface::{
        build_surface, DomainSpec, RegionSpec, SolverKind, Surface, SurfaceError,
        SurfaceRequest, SurfaceResult,
    };
    pub use nalgebra::Vector2 as Vec2;
}
