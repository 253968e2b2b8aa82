//! Seeded synthetic scatter for tests, benches and demos.
//!
//! Points are drawn uniformly from a square around `center`; heights come
//! from a known polynomial evaluated relative to `center`, plus bounded
//! uniform noise. The same `(cfg, seed)` always yields the same points.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::basis::Polynomial2;
use crate::points::Point;

/// Scatter configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScatterCfg {
    pub count: usize,
    pub center: Vector2<f64>,
    /// Points land in `center ± half_width` on both axes.
    pub half_width: f64,
    /// Noise amplitude: heights get `u ∈ [-noise, noise]` added. Zero for exact data.
    pub noise: f64,
}

impl Default for ScatterCfg {
    fn default() -> Self {
        Self {
            count: 200,
            center: Vector2::zeros(),
            half_width: 1.0,
            noise: 0.0,
        }
    }
}

/// Draw `cfg.count` points whose heights follow `surface` (in center-relative coordinates).
pub fn scatter(cfg: &ScatterCfg, surface: &Polynomial2, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hw = cfg.half_width.abs().max(f64::MIN_POSITIVE);
    let noise = cfg.noise.abs();
    (0..cfg.count)
        .map(|_| {
            let dx = rng.gen_range(-hw..=hw);
            let dy = rng.gen_range(-hw..=hw);
            let u = if noise > 0.0 {
                rng.gen_range(-noise..=noise)
            } else {
                0.0
            };
            Point::new(
                cfg.center.x + dx,
                cfg.center.y + dy,
                surface.eval(dx, dy) + u,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_is_reproducible_and_bounded() {
        let poly = Polynomial2::new(1, vec![1.0, 2.0, 3.0]).unwrap();
        let cfg = ScatterCfg {
            count: 50,
            center: Vector2::new(10.0, -5.0),
            half_width: 2.0,
            noise: 0.0,
        };
        let a = scatter(&cfg, &poly, 99);
        let b = scatter(&cfg, &poly, 99);
        assert_eq!(a, b);
        assert_ne!(a, scatter(&cfg, &poly, 100));
        for p in &a {
            assert!((p.x - 10.0).abs() <= 2.0 && (p.y + 5.0).abs() <= 2.0);
            let (dx, dy) = (p.x - 10.0, p.y + 5.0);
            assert!((p.z - (1.0 + 2.0 * dy + 3.0 * dx)).abs() < 1e-9);
        }
    }

    #[test]
    fn noise_stays_in_band() {
        let flat = Polynomial2::constant(0, 5.0);
        let cfg = ScatterCfg {
            noise: 0.1,
            ..Default::default()
        };
        for p in scatter(&cfg, &flat, 1) {
            assert!((p.z - 5.0).abs() <= 0.1 + 1e-12);
        }
    }
}
