//! Digitized points and their grouping into strips.
//!
//! The engine itself only consumes a flat `&[Point]`; strips are a caller-side
//! grouping (one measurement transect each) that survives import/export.

use nalgebra::Vector2;

/// A digitized measurement: position `(x, y)` and the fitted quantity `z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn xy(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Same point expressed relative to `origin` (height unchanged).
    #[inline]
    pub fn shifted(&self, origin: Vector2<f64>) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y, self.z)
    }
}

/// Caller-assigned strip identifier; opaque to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StripId(pub i64);

/// First id handed out by `StripSet::next_id` on an empty set.
pub const FIRST_STRIP_ID: StripId = StripId(-15);

/// An ordered run of points sharing one strip id.
#[derive(Clone, Debug, PartialEq)]
pub struct Strip {
    pub id: StripId,
    pub points: Vec<Point>,
}

impl Strip {
    pub fn new(id: StripId) -> Self {
        Self {
            id,
            points: Vec::new(),
        }
    }
}

/// Strips in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StripSet {
    pub strips: Vec<Strip>,
}

impl StripSet {
    pub fn get(&self, id: StripId) -> Option<&Strip> {
        self.strips.iter().find(|s| s.id == id)
    }

    /// Append `point` to strip `id`, creating the strip at the end if new.
    pub fn push(&mut self, id: StripId, point: Point) {
        match self.strips.iter_mut().find(|s| s.id == id) {
            Some(strip) => strip.points.push(point),
            None => self.strips.push(Strip {
                id,
                points: vec![point],
            }),
        }
    }

    /// Smallest unused id above every existing one (`FIRST_STRIP_ID` when empty).
    pub fn next_id(&self) -> StripId {
        self.strips
            .iter()
            .map(|s| s.id)
            .max()
            .map_or(FIRST_STRIP_ID, |StripId(v)| StripId(v + 1))
    }

    /// All points, strip by strip.
    pub fn flatten(&self) -> Vec<Point> {
        self.strips
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .collect()
    }

    /// Total point count.
    pub fn len(&self) -> usize {
        self.strips.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(point, strip)` pairs in flatten order.
    pub fn iter_tagged(&self) -> impl Iterator<Item = (Point, StripId)> + '_ {
        self.strips
            .iter()
            .flat_map(|s| s.points.iter().map(move |p| (*p, s.id)))
    }
}

/// Default spacing (in image pixels) for `interpolate_strip`.
pub const DEFAULT_SPACING: f64 = 5.0;

/// Densify a strip by inserting evenly spaced points between neighbours.
///
/// For each consecutive pair at distance `d`, `n = max(1, floor(d / spacing))`
/// and the `n - 1` interior points at `t = k/n` are inserted, each coordinate
/// rounded to the nearest integer. Returns the new strip and the number of
/// inserted points. Strips with fewer than two points come back unchanged.
pub fn interpolate_strip(strip: &Strip, spacing: f64) -> (Strip, usize) {
    if strip.points.len() < 2 || !(spacing > 0.0) {
        return (strip.clone(), 0);
    }
    let mut points = Vec::with_capacity(strip.points.len());
    let mut added = 0;
    for pair in strip.points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        points.push(p1);
        let dist = (p2.xy() - p1.xy()).norm();
        let n = ((dist / spacing).floor() as usize).max(1);
        for k in 1..n {
            let t = k as f64 / n as f64;
            points.push(Point::new(
                (p1.x + (p2.x - p1.x) * t).round(),
                (p1.y + (p2.y - p1.y) * t).round(),
                (p1.z + (p2.z - p1.z) * t).round(),
            ));
            added += 1;
        }
    }
    if let Some(last) = strip.points.last() {
        points.push(*last);
    }
    (
        Strip {
            id: strip.id,
            points,
        },
        added,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_groups_by_id_in_first_seen_order() {
        let mut set = StripSet::default();
        set.push(StripId(3), Point::new(0.0, 0.0, 1.0));
        set.push(StripId(-1), Point::new(1.0, 0.0, 1.0));
        set.push(StripId(3), Point::new(2.0, 0.0, 1.0));
        assert_eq!(set.strips.len(), 2);
        assert_eq!(set.strips[0].id, StripId(3));
        assert_eq!(set.strips[0].points.len(), 2);
        assert_eq!(set.len(), 3);
        let flat = set.flatten();
        assert_eq!(flat[1].x, 2.0);
        assert_eq!(flat[2].x, 1.0);
    }

    #[test]
    fn next_id_starts_at_minus_fifteen() {
        let mut set = StripSet::default();
        assert_eq!(set.next_id(), FIRST_STRIP_ID);
        set.push(FIRST_STRIP_ID, Point::new(0.0, 0.0, 0.0));
        assert_eq!(set.next_id(), StripId(-14));
    }

    #[test]
    fn interpolation_inserts_rounded_points() {
        let strip = Strip {
            id: StripId(1),
            points: vec![Point::new(0.0, 0.0, 0.0), Point::new(20.0, 0.0, 10.0)],
        };
        let (dense, added) = interpolate_strip(&strip, 5.0);
        // n = 4 -> 3 interior points
        assert_eq!(added, 3);
        let xs: Vec<f64> = dense.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        // 2.5 and 7.5 round away from zero
        let zs: Vec<f64> = dense.points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.0, 3.0, 5.0, 8.0, 10.0]);
    }

    #[test]
    fn short_segments_and_short_strips_unchanged() {
        let strip = Strip {
            id: StripId(0),
            points: vec![Point::new(0.0, 0.0, 0.0), Point::new(3.0, 4.0, 0.0)],
        };
        // dist 5 -> n = 1, nothing inserted
        let (dense, added) = interpolate_strip(&strip, 5.0);
        assert_eq!(added, 0);
        assert_eq!(dense, strip);

        let single = Strip {
            id: StripId(0),
            points: vec![Point::new(1.0, 1.0, 1.0)],
        };
        assert_eq!(interpolate_strip(&single, 5.0), (single.clone(), 0));
    }
}
