//! Validity masks for a fitted surface.
//!
//! Every mask answers one question, `contains(x, y)`, in the coordinates the
//! points were digitized in. The sampler never needs to know which mask it
//! holds.
//!
//! - `DualCircle`: intersection of up to two circles (boundary inclusive).
//! - `ConvexHull`: gift-wrapped hull of the input points (boundary inclusive).
//! - `Unbounded`: everything is valid.

mod circle;
mod hull;

pub use circle::{Circle, DualCircle, SingleCirclePolicy};
pub use hull::{convex_hull, point_in_polygon, ConvexHull};

/// Membership test for the fitting domain.
pub trait Region {
    fn contains(&self, x: f64, y: f64) -> bool;
}

/// Mask that accepts every location.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Region for Unbounded {
    #[inline]
    fn contains(&self, _x: f64, _y: f64) -> bool {
        true
    }
}

impl<R: Region + ?Sized> Region for &R {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        (**self).contains(x, y)
    }
}

impl<R: Region + ?Sized> Region for Box<R> {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        (**self).contains(x, y)
    }
}

#[cfg(test)]
mod tests;
