use nalgebra::Vector2;

use super::Region;

/// Closed disc `|p - center| <= radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vector2<f64>,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            center: Vector2::new(cx, cy),
            radius,
        }
    }
}

impl Region for Circle {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// What a lone circle (its partner undefined) means for the domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SingleCirclePolicy {
    /// The defined circle alone bounds the domain.
    #[default]
    Constrain,
    /// Only a complete pair constrains; a lone circle is ignored.
    Unconstrained,
}

/// Intersection of two optional circles.
///
/// Both defined: inside both. Neither defined: everything. One defined: see
/// `SingleCirclePolicy`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DualCircle {
    pub first: Option<Circle>,
    pub second: Option<Circle>,
    pub policy: SingleCirclePolicy,
}

impl DualCircle {
    pub fn pair(first: Circle, second: Circle) -> Self {
        Self {
            first: Some(first),
            second: Some(second),
            policy: SingleCirclePolicy::default(),
        }
    }
}

impl Region for DualCircle {
    fn contains(&self, x: f64, y: f64) -> bool {
        match (&self.first, &self.second) {
            (Some(a), Some(b)) => a.contains(x, y) && b.contains(x, y),
            (Some(c), None) | (None, Some(c)) => match self.policy {
                SingleCirclePolicy::Constrain => c.contains(x, y),
                SingleCirclePolicy::Unconstrained => true,
            },
            (None, None) => true,
        }
    }
}
