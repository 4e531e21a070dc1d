//! Direct-summation Newtonian gravity

use common::Body;
use glam::DVec3;

/// Pairwise gravitational acceleration with optional Plummer softening
///
/// `softening = 0` gives the bare inverse-square law. A pair whose softened
/// separation is exactly zero is skipped instead of producing NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub g: f64,
    pub softening: f64,
}

impl Gravity {
    pub fn new(g: f64) -> Self {
        Self { g, softening: 0.0 }
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    /// Write the net acceleration of every body into `out`
    ///
    /// Fixed bodies receive zero but still pull on everyone else. Returns the
    /// number of coincident pairs that were skipped.
    pub fn accelerations(&self, bodies: &[Body], out: &mut [DVec3]) -> usize {
        debug_assert_eq!(bodies.len(), out.len());
        out.iter_mut().for_each(|a| *a = DVec3::ZERO);

        let eps2 = self.softening * self.softening;
        let mut singular = 0;

        // Each unordered pair once; i feels +r, j feels -r
        for i in 0..bodies.len() {
            let bi = &bodies[i];
            for j in (i + 1)..bodies.len() {
                let bj = &bodies[j];
                if bi.fixed && bj.fixed {
                    continue;
                }

                let r = bj.position - bi.position;
                let d2 = r.length_squared() + eps2;
                if d2 == 0.0 {
                    singular += 1;
                    continue;
                }

                let inv_d = d2.sqrt().recip();
                let coef = self.g * inv_d * inv_d * inv_d;

                if !bi.fixed {
                    out[i] += coef * bj.mass * r;
                }
                if !bj.fixed {
                    out[j] -= coef * bi.mass * r;
                }
            }
        }
        singular
    }
}
