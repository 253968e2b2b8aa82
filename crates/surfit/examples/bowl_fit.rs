//! Fit a noisy bowl and print the surface summary and slice labels.
//!
//! Usage:
//!   cargo run -p surfit --example bowl_fit -- [degree]

use surfit::prelude::*;
use surfit::synth::{scatter, ScatterCfg};

fn main() {
    let degree: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let truth = Polynomial2::new(2, vec![12.0, 0.0, 0.002, 0.0, 0.0, 0.002]).unwrap();
    let cfg = ScatterCfg {
        count: 400,
        center: Vec2::new(320.0, 240.0),
        half_width: 90.0,
        noise: 0.3,
    };
    let points = scatter(&cfg, &truth, 2025);
    let rim = Circle::new(320.0, 240.0, 90.0);
    let request = SurfaceRequest::circle_recentered(degree, Some(rim), None);
    match build_surface(&points, &request) {
        Ok(res) => {
            let s = &res.surface;
            println!("degree {degree}: coefficients {:?}", s.polynomial.coefficients());
            println!(
                "valid range {:?}, {} masked cells, contours {:?}",
                s.valid_range(),
                s.grid.masked_count(),
                s.contour_spec()
            );
            for sl in res.slices.x_slices.iter().chain(&res.slices.y_slices) {
                println!("slice {}", sl.label);
            }
        }
        Err(e) => eprintln!("{e}"),
    }
}
