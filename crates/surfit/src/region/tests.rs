use super::*;
use nalgebra::{vector, Vector2};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn square_with_center() -> Vec<Vector2<f64>> {
    vec![
        vector![0.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 2.0],
        vector![0.0, 2.0],
        vector![1.0, 1.0],
    ]
}

fn signed_area(poly: &[Vector2<f64>]) -> f64 {
    let n = poly.len();
    0.5 * (0..n)
        .map(|k| poly[k].x * poly[(k + 1) % n].y - poly[k].y * poly[(k + 1) % n].x)
        .sum::<f64>()
}

#[test]
fn circle_boundary_is_inside() {
    let c = Circle::new(1.0, -2.0, 3.0);
    assert!(c.contains(4.0, -2.0));
    assert!(c.contains(1.0, 1.0));
    assert!(c.contains(1.0, -2.0));
    assert!(!c.contains(4.0 + 1e-9, -2.0));
}

#[test]
fn dual_circle_is_intersection() {
    let m = DualCircle::pair(Circle::new(0.0, 0.0, 2.0), Circle::new(2.0, 0.0, 2.0));
    assert!(m.contains(1.0, 0.0));
    assert!(!m.contains(-1.0, 0.0));
    assert!(!m.contains(3.0, 0.0));
}

#[test]
fn lone_circle_follows_policy() {
    let c = Circle::new(0.0, 0.0, 1.0);
    let constrain = DualCircle {
        first: None,
        second: Some(c),
        policy: SingleCirclePolicy::Constrain,
    };
    assert!(constrain.contains(0.5, 0.5));
    assert!(!constrain.contains(5.0, 0.0));
    let open = DualCircle {
        policy: SingleCirclePolicy::Unconstrained,
        ..constrain
    };
    assert!(open.contains(5.0, 0.0));
    assert!(DualCircle::default().contains(1e6, -1e6));
}

#[test]
fn hull_drops_interior_point() {
    let hull = convex_hull(&square_with_center());
    assert_eq!(
        hull,
        vec![
            vector![0.0, 0.0],
            vector![2.0, 0.0],
            vector![2.0, 2.0],
            vector![0.0, 2.0]
        ]
    );
    assert!(signed_area(&hull) > 0.0, "expected counter-clockwise winding");
}

#[test]
fn hull_membership() {
    let hull = ConvexHull::from_xy(&square_with_center());
    assert!(hull.contains(1.0, 1.0));
    assert!(!hull.contains(3.0, 1.0));
    assert!(!hull.contains(1.0, -0.5));
    // edges and corners count as inside
    assert!(hull.contains(2.0, 1.0));
    assert!(hull.contains(1.0, 0.0));
    assert!(hull.contains(0.0, 2.0));
    assert!((hull.area() - 4.0).abs() < 1e-12);
}

#[test]
fn hull_skips_collinear_and_duplicate_points() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 0.0],
    ];
    let hull = convex_hull(&pts);
    assert_eq!(hull.len(), 3);
    assert!(!hull.contains(&vector![1.0, 0.0]));
}

#[test]
fn degenerate_inputs_return_points() {
    assert!(convex_hull(&[]).is_empty());
    let two = vec![vector![0.0, 0.0], vector![4.0, 0.0], vector![0.0, 0.0]];
    let hull = ConvexHull::from_xy(&two);
    assert!(hull.is_degenerate());
    assert_eq!(hull.vertices().len(), 2);
    assert!(hull.contains(2.0, 0.0));
    assert!(!hull.contains(2.0, 1.0));
    // collinear triple collapses to its end points
    let line = vec![vector![0.0, 0.0], vector![1.0, 1.0], vector![2.0, 2.0]];
    let h = convex_hull(&line);
    assert_eq!(h, vec![vector![0.0, 0.0], vector![2.0, 2.0]]);
}

#[test]
fn leftmost_tie_uses_first_occurrence() {
    let pts = vec![
        vector![0.0, 3.0],
        vector![0.0, 0.0],
        vector![3.0, 0.0],
        vector![3.0, 3.0],
    ];
    assert_eq!(convex_hull(&pts)[0], vector![0.0, 3.0]);
}

#[test]
fn region_is_object_safe() {
    let masks: Vec<Box<dyn Region>> = vec![
        Box::new(Unbounded),
        Box::new(Circle::new(0.0, 0.0, 1.0)),
        Box::new(ConvexHull::from_xy(&square_with_center())),
    ];
    assert!(masks.iter().all(|m| m.contains(0.5, 0.5)));
}

proptest! {
    #[test]
    fn hull_contains_every_input(seed in 0u64..500, n in 3usize..40) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pts: Vec<Vector2<f64>> = (0..n)
            .map(|_| vector![rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)])
            .collect();
        let hull = ConvexHull::from_xy(&pts);
        for p in &pts {
            prop_assert!(hull.contains(p.x, p.y), "lost {:?}", p);
        }
        // no hull vertex lies strictly to the right of any edge
        let v = hull.vertices();
        if v.len() >= 3 {
            for k in 0..v.len() {
                let (a, b) = (v[k], v[(k + 1) % v.len()]);
                for p in &pts {
                    let c = (b - a).x * (p - a).y - (b - a).y * (p - a).x;
                    prop_assert!(c >= -1e-9);
                }
            }
        }
    }
}
