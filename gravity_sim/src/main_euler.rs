//! Explicit Euler engine
//!
//! `euler --input system.txt [--dt 0.01] [--T 10] [--softening 0] [--test]`

use std::process::ExitCode;

use common::Method;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    gravity_sim::cli::run(Method::Euler)
}
