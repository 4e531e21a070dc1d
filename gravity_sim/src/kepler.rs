//! Built-in Kepler-orbit regression
//!
//! A unit mass circles a fixed central mass at radius 1. The worst radial
//! deviation over 100 steps is measured at three time steps a decade apart;
//! the ratios between them must show the integrator's order of convergence.

use common::Method;

use crate::error::EngineError;
use crate::integrator::Simulation;
use crate::presets::{kepler, KEPLER_MASS};

pub const KEPLER_STEPS: usize = 100;

pub const DT_LADDER: [f64; 3] = [1e-3, 1e-4, 1e-5];

/// Worst `| |r| - 1 |` of the orbiting body over [`KEPLER_STEPS`] steps
pub fn kepler_error(method: Method, dt: f64) -> Result<f64, EngineError> {
    let mut sim = Simulation::new(kepler(KEPLER_MASS, dt), method)?;
    let mut max_err: f64 = 0.0;
    for _ in 0..KEPLER_STEPS {
        sim.step()?;
        let r = sim.system().bodies[1].position.length();
        max_err = max_err.max((r - 1.0).abs());
    }
    Ok(max_err)
}

/// Minimum error reduction when dt shrinks by 10x and by 100x
pub fn convergence_ratios(method: Method) -> (f64, f64) {
    match method {
        Method::Euler => (10.0, 100.0),
        Method::Verlet => (97.0, 10000.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// Error at dt/10 did not shrink enough
    FirstRatio,
    /// Error at dt/100 did not shrink enough
    SecondRatio,
}

impl Verdict {
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Passed => 0,
            Verdict::FirstRatio => 1,
            Verdict::SecondRatio => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelfTestReport {
    pub method: Method,
    pub errors: [f64; 3],
    pub verdict: Verdict,
}

impl SelfTestReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

pub fn self_test(method: Method) -> Result<SelfTestReport, EngineError> {
    let mut errors = [0.0; 3];
    for (err, dt) in errors.iter_mut().zip(DT_LADDER) {
        *err = kepler_error(method, dt)?;
    }

    let (first, second) = convergence_ratios(method);
    let verdict = if errors[0] / first < errors[1] {
        Verdict::FirstRatio
    } else if errors[0] / second < errors[2] {
        Verdict::SecondRatio
    } else {
        Verdict::Passed
    };

    Ok(SelfTestReport {
        method,
        errors,
        verdict,
    })
}
