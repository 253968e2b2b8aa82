//! Convex hull by gift wrapping, and polygon membership by ray crossing.

use std::collections::HashSet;

use nalgebra::Vector2;

use super::Region;
use crate::points::Point;

/// Absolute distance under which a location counts as lying on a hull edge.
const BOUNDARY_EPS: f64 = 1e-9;

/// Orientation of `b` relative to the directed line `o → a` (> 0: left turn).
#[inline]
fn cross(o: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let oa = a - o;
    let ob = b - o;
    oa.x * ob.y - oa.y * ob.x
}

/// Exact duplicates removed (first occurrence kept), non-finite points dropped.
fn distinct_finite(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    let mut seen = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        // +0.0 folds -0.0 onto 0.0
        .filter(|p| seen.insert(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())))
        .copied()
        .collect()
}

/// Counter-clockwise convex hull via Jarvis march.
///
/// - Starts at the leftmost point (first occurrence on ties).
/// - Next vertex: the candidate with no other point strictly to its right;
///   among collinear candidates, the one farthest from the current vertex.
///   Collinear boundary points are therefore not hull vertices.
/// - Fewer than 3 distinct points are returned as-is (degenerate hull).
pub fn convex_hull(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    let pts = distinct_finite(points);
    let n = pts.len();
    if n < 3 {
        return pts;
    }
    let mut start = 0;
    for (i, p) in pts.iter().enumerate() {
        if p.x < pts[start].x {
            start = i;
        }
    }
    let mut hull = Vec::new();
    let mut current = start;
    loop {
        hull.push(pts[current]);
        let mut next = if current == 0 { 1 } else { 0 };
        for i in 0..n {
            if i == current || i == next {
                continue;
            }
            let turn = cross(pts[current], pts[next], pts[i]);
            let farther = (pts[i] - pts[current]).norm_squared()
                > (pts[next] - pts[current]).norm_squared();
            if turn < 0.0 || (turn == 0.0 && farther) {
                next = i;
            }
        }
        current = next;
        if current == start || hull.len() >= n {
            break;
        }
    }
    hull
}

fn on_segment(a: Vector2<f64>, b: Vector2<f64>, p: Vector2<f64>) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return ap.norm() <= BOUNDARY_EPS;
    }
    let t = ab.dot(&ap);
    if t < 0.0 || t > len2 {
        return false;
    }
    cross(a, b, p).abs() / len2.sqrt() <= BOUNDARY_EPS
}

/// Is `(x, y)` inside `polygon` or on its boundary?
///
/// Interior by horizontal-ray crossing parity over the closed edge loop;
/// boundary points are accepted explicitly. Degenerate polygons (one or two
/// vertices) contain only their own points or segment.
pub fn point_in_polygon(polygon: &[Vector2<f64>], x: f64, y: f64) -> bool {
    let p = Vector2::new(x, y);
    let n = polygon.len();
    if n == 0 {
        return false;
    }
    if n == 1 {
        return (polygon[0] - p).norm() <= BOUNDARY_EPS;
    }
    let mut j = n - 1;
    for i in 0..n {
        if on_segment(polygon[j], polygon[i], p) {
            return true;
        }
        j = i;
    }
    if n == 2 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Hull of a point set, used as a mask.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Vector2<f64>>,
}

impl ConvexHull {
    pub fn from_xy(points: &[Vector2<f64>]) -> Self {
        Self {
            vertices: convex_hull(points),
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let xy: Vec<_> = points.iter().map(Point::xy).collect();
        Self::from_xy(&xy)
    }

    /// Hull vertices in counter-clockwise order.
    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    /// Fewer than three vertices: a point, a segment, or nothing.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Shoelace area (zero for degenerate hulls).
    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let n = self.vertices.len();
        let twice: f64 = (0..n)
            .map(|k| {
                let (a, b) = (self.vertices[k], self.vertices[(k + 1) % n]);
                a.x * b.y - a.y * b.x
            })
            .sum();
        0.5 * twice.abs()
    }
}

impl Region for ConvexHull {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        point_in_polygon(&self.vertices, x, y)
    }
}
