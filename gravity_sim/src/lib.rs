//! N-body gravitational engine
//!
//! Loads a system file, integrates it with explicit Euler or velocity
//! Verlet, and streams every step through the line protocol defined in
//! [`common`]:
//!
//! - **forces**: direct O(N²) Newtonian gravity
//! - **integrator**: stepping strategies and the simulation lifecycle
//! - **input**: system file loader and writer
//! - **presets**: reproducible initial conditions
//! - **kepler**: built-in convergence regression
//! - **cli**: shared front-end of the engine binaries

pub mod error;
pub mod forces;
pub mod integrator;
pub mod input;
pub mod presets;
pub mod kepler;
pub mod cli;

pub use error::{EngineError, FormatError, InputError};
pub use forces::Gravity;
pub use integrator::{ExplicitEuler, Integrator, Phase, Simulation, VelocityVerlet};
pub use kepler::{kepler_error, self_test, SelfTestReport, Verdict};
