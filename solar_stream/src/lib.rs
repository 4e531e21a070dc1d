//! Consumer side of the n-body trajectory stream
//!
//! [`Supervisor`] runs an engine binary as a child process and drains its
//! stdout at the consumer's pace: after each decoded frame it stays
//! suspended until [`Supervisor::resume`] is called.

pub mod error;
pub mod launcher;
pub mod reader;
pub mod supervisor;

pub use error::SupervisorError;
pub use launcher::{BinaryLauncher, EngineLauncher, SpawnParams};
pub use supervisor::{FrameSink, Status, Supervisor};
