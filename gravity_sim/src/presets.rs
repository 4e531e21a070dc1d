//! Ready-made initial conditions
//!
//! Random layouts are drawn from a seeded [`StdRng`], so the same seed always
//! yields the same system.

use std::f64::consts::{PI, TAU};

use common::{Body, System};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Central mass of the ring preset
pub const SATURN_MASS: f64 = 18666666.666666668;

/// Central mass of the Kepler regression orbit
pub const KEPLER_MASS: f64 = 1.0e5;

/// Fixed central mass with a unit mass on a circular orbit of radius 1 (G = 1)
pub fn kepler(central_mass: f64, dt: f64) -> System {
    let g = 1.0;
    System::new(g, dt)
        .with_body(Body::new("Sun", central_mass).fixed())
        .with_body(
            Body::new("Planet", 1.0)
                .at(DVec3::new(0.0, 1.0, 0.0))
                .moving(DVec3::new((g * central_mass).sqrt(), 0.0, 0.0)),
        )
}

/// A heavy planet with two thin rings of `per_ring` particles each
///
/// Inner ring at radius 1 ± 0.1, outer ring at 1.3 ± 0.1, every particle on
/// a circular orbit in the xy-plane. Ring mass totals 1 per ring.
pub fn saturn_rings(per_ring: usize, seed: u64, dt: f64) -> System {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut system = System::new(1.0, dt).with_body(Body::new("Saturn", SATURN_MASS));
    let mass = 1.0 / per_ring.max(1) as f64;

    for (prefix, radius) in [("B", 1.0), ("BB", 1.3)] {
        for i in 0..per_ring {
            let alpha = TAU * rng.gen::<f64>();
            let r = radius + rng.gen::<f64>() * 0.2 - 0.1;
            let position = DVec3::new(r * alpha.cos(), r * alpha.sin(), 0.0);

            let speed = (SATURN_MASS / r).sqrt();
            let velocity = DVec3::new(-position.y / r, position.x / r, 0.0) * speed;

            system
                .bodies
                .push(Body::new(&format!("{prefix}{i}"), mass).at(position).moving(velocity));
        }
    }
    system
}

/// Repulsive (G = -1) cluster: four core bodies inside a shell of `count`
/// unit masses at radius 1 ± 0.1, everything initially at rest
pub fn shell(count: usize, seed: u64, dt: f64) -> System {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut system = System::new(-1.0, dt)
        .with_body(Body::new("C1", 10.0))
        .with_body(Body::new("C2", 1.0).at(DVec3::new(0.0, 0.1, 0.0)))
        .with_body(Body::new("C3", 1.0).at(DVec3::new(0.1, 0.0, 0.0)))
        .with_body(Body::new("C4", 1.0).at(DVec3::new(0.0, 0.0, 0.1)));

    for i in 0..count {
        let theta = PI * rng.gen::<f64>();
        let phi = TAU * rng.gen::<f64>();
        let r = 1.0 + rng.gen::<f64>() * 0.2 - 0.1;
        let position = DVec3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        );
        system.bodies.push(Body::new(&format!("B{i}"), 1.0).at(position));
    }
    system
}
