//! Fixed-step time integrators and the simulation lifecycle
//!
//! Two interchangeable strategies operate on a [`System`] through
//! [`Gravity`]:
//! - [`ExplicitEuler`]: `v += dt a`, then `r += dt v` with the same step's
//!   acceleration. First order, energy drifts without bound.
//! - [`VelocityVerlet`]: keeps the previous step's acceleration, so it needs
//!   one force evaluation (the seed) before its first step. Second order and
//!   symplectic.
//!
//! Fixed bodies are never moved by either strategy.

use common::{Method, System};
use glam::DVec3;
use log::{debug, warn};

use crate::error::EngineError;
use crate::forces::Gravity;

/// A stepping strategy; returns the number of singular pairs it skipped
pub trait Integrator {
    fn method(&self) -> Method;

    /// Whether [`Integrator::seed`] must run before the first step
    fn needs_seed(&self) -> bool;

    fn seed(&mut self, system: &mut System, gravity: &Gravity) -> usize;

    fn step(&mut self, system: &mut System, gravity: &Gravity) -> usize;
}

pub fn integrator_for(method: Method) -> Box<dyn Integrator> {
    match method {
        Method::Euler => Box::new(ExplicitEuler::default()),
        Method::Verlet => Box::new(VelocityVerlet::default()),
    }
}

/// Evaluate gravity into `scratch`, then copy into each body's acceleration
fn evaluate_into_bodies(system: &mut System, gravity: &Gravity, scratch: &mut Vec<DVec3>) -> usize {
    scratch.resize(system.len(), DVec3::ZERO);
    let singular = gravity.accelerations(&system.bodies, scratch);
    for (body, a) in system.bodies.iter_mut().zip(scratch.iter()) {
        body.acceleration = *a;
    }
    singular
}

#[derive(Debug, Default)]
pub struct ExplicitEuler {
    scratch: Vec<DVec3>,
}

impl Integrator for ExplicitEuler {
    fn method(&self) -> Method {
        Method::Euler
    }

    fn needs_seed(&self) -> bool {
        false
    }

    fn seed(&mut self, _system: &mut System, _gravity: &Gravity) -> usize {
        0
    }

    fn step(&mut self, system: &mut System, gravity: &Gravity) -> usize {
        let dt = system.dt;
        let singular = evaluate_into_bodies(system, gravity, &mut self.scratch);

        for body in system.bodies.iter_mut().filter(|b| !b.fixed) {
            body.velocity += dt * body.acceleration;
            body.position += dt * body.velocity;
        }

        system.steps += 1;
        singular
    }
}

#[derive(Debug, Default)]
pub struct VelocityVerlet {
    /// a(t + dt), evaluated at the drifted positions
    a_next: Vec<DVec3>,
}

impl Integrator for VelocityVerlet {
    fn method(&self) -> Method {
        Method::Verlet
    }

    fn needs_seed(&self) -> bool {
        true
    }

    fn seed(&mut self, system: &mut System, gravity: &Gravity) -> usize {
        evaluate_into_bodies(system, gravity, &mut self.a_next)
    }

    fn step(&mut self, system: &mut System, gravity: &Gravity) -> usize {
        let dt = system.dt;
        let half_dt = 0.5 * dt;

        // r(t + dt) = r + v dt + a dt^2 / 2, with the old acceleration
        for body in system.bodies.iter_mut().filter(|b| !b.fixed) {
            body.position += body.velocity * dt + body.acceleration * (half_dt * dt);
        }

        self.a_next.resize(system.len(), DVec3::ZERO);
        let singular = gravity.accelerations(&system.bodies, &mut self.a_next);

        // v(t + dt) = v + dt (a + a_next) / 2, then a = a_next
        for (body, a_next) in system.bodies.iter_mut().zip(self.a_next.iter()) {
            if body.fixed {
                continue;
            }
            body.velocity += half_dt * (body.acceleration + *a_next);
            body.acceleration = *a_next;
        }

        system.steps += 1;
        singular
    }
}

/// Lifecycle of one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// Verlet only: initial acceleration evaluated
    Seeded,
    Stepping,
    Terminated,
}

/// An owned system advanced by one integrator
pub struct Simulation {
    system: System,
    gravity: Gravity,
    integrator: Box<dyn Integrator>,
    phase: Phase,
    singular_pairs: u64,
}

impl Simulation {
    pub fn new(system: System, method: Method) -> Result<Self, EngineError> {
        if !(system.dt.is_finite() && system.dt > 0.0) {
            return Err(EngineError::InvalidTimeStep(system.dt));
        }
        let gravity = Gravity::new(system.g);
        Ok(Self {
            system,
            gravity,
            integrator: integrator_for(method),
            phase: Phase::Uninitialized,
            singular_pairs: 0,
        })
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.gravity = self.gravity.with_softening(softening);
        self
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn into_system(self) -> System {
        self.system
    }

    pub fn method(&self) -> Method {
        self.integrator.method()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Coincident pairs skipped by the force evaluator so far
    pub fn singular_pairs(&self) -> u64 {
        self.singular_pairs
    }

    /// Advance by one time step, seeding first if the integrator needs it
    pub fn step(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::Terminated => return Err(EngineError::Terminated),
            Phase::Uninitialized if self.integrator.needs_seed() => {
                let singular = self.integrator.seed(&mut self.system, &self.gravity);
                self.record_singular(singular);
                self.phase = Phase::Seeded;
                debug!("{} seeded with {} bodies", self.method(), self.system.len());
            }
            _ => {}
        }

        let singular = self.integrator.step(&mut self.system, &self.gravity);
        self.record_singular(singular);
        self.phase = Phase::Stepping;
        Ok(())
    }

    pub fn terminate(&mut self) {
        if self.phase != Phase::Terminated {
            debug!("{} terminated at t = {}", self.method(), self.system.t());
        }
        self.phase = Phase::Terminated;
    }

    /// Emit the initial state, then `floor(t_end / dt)` steps, each followed by
    /// a call to `emit`. Terminates the simulation when done.
    pub fn run<F>(&mut self, t_end: f64, mut emit: F) -> Result<u64, EngineError>
    where
        F: FnMut(&System) -> std::io::Result<()>,
    {
        if self.phase == Phase::Terminated {
            return Err(EngineError::Terminated);
        }

        let steps = steps_for(t_end, self.system.dt);
        debug!("running {} for {} steps (T = {}, dt = {})", self.method(), steps, t_end, self.system.dt);

        emit(&self.system)?;
        for _ in 0..steps {
            self.step()?;
            emit(&self.system)?;
        }

        self.terminate();
        Ok(steps)
    }

    fn record_singular(&mut self, singular: usize) {
        if singular == 0 {
            return;
        }
        if self.singular_pairs == 0 {
            warn!(
                "coincident bodies at t = {}: {} pair(s) skipped, further occurrences are only counted",
                self.system.t(),
                singular
            );
        }
        self.singular_pairs += singular as u64;
    }
}

/// Number of whole steps that fit in `t_end`
pub fn steps_for(t_end: f64, dt: f64) -> u64 {
    let steps = t_end / dt;
    if steps.is_finite() && steps > 0.0 {
        steps as u64
    } else {
        0
    }
}
