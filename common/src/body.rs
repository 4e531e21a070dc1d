//! Point-mass bodies and the simulated system that owns them

use glam::DVec3;

/// Longest body name accepted in input files and declaration lines
pub const MAX_NAME_LEN: usize = 15;

/// A point mass with mutable kinematic state
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    pub mass: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Scratch acceleration owned by the integrator
    pub acceleration: DVec3,
    /// Fixed bodies attract others but never move
    pub fixed: bool,
}

impl Body {
    pub fn new(name: &str, mass: f64) -> Self {
        Self {
            name: name.to_string(),
            mass,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            fixed: false,
        }
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

/// The full set of bodies plus the constants that drive their motion
///
/// Body order is stable: it defines the column order of the trajectory
/// stream. Elapsed time is derived from the step counter so that the clock
/// stays monotonic without accumulating rounding error.
#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>,
    pub g: f64,
    pub dt: f64,
    pub steps: u64,
}

impl System {
    pub fn new(g: f64, dt: f64) -> Self {
        Self {
            bodies: Vec::new(),
            g,
            dt,
            steps: 0,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    /// Elapsed simulated time
    pub fn t(&self) -> f64 {
        self.steps as f64 * self.dt
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    pub fn total_momentum(&self) -> DVec3 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    pub fn center_of_mass(&self) -> DVec3 {
        let total_mass = self.total_mass();
        if total_mass > 0.0 {
            self.bodies.iter().map(|b| b.position * b.mass).sum::<DVec3>() / total_mass
        } else {
            DVec3::ZERO
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Pairwise potential energy `-G m_i m_j / r_ij`, skipping coincident pairs
    pub fn potential_energy(&self) -> f64 {
        let mut energy = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            for bj in &self.bodies[i + 1..] {
                let r = bi.position.distance(bj.position);
                if r > 0.0 {
                    energy -= self.g * bi.mass * bj.mass / r;
                }
            }
        }
        energy
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

/// Position and velocity of one body at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: DVec3,
    pub velocity: DVec3,
}

/// One time-stamped snapshot of every body, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub t: f64,
    pub states: Vec<BodyState>,
}

impl Frame {
    pub fn capture(t: f64, bodies: &[Body]) -> Self {
        Self {
            t,
            states: bodies
                .iter()
                .map(|b| BodyState {
                    position: b.position,
                    velocity: b.velocity,
                })
                .collect(),
        }
    }

    pub fn of(system: &System) -> Self {
        Self::capture(system.t(), &system.bodies)
    }
}
