//! Command line front-end shared by the `euler` and `verlet` binaries
//!
//! Usage mistakes are not fatal: they print the usage line and exit 0.
//! Unreadable input files exit 1, self-test failures exit 1 or 2.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use common::{FrameEncoder, Method};
use log::info;

use crate::input;
use crate::integrator::Simulation;
use crate::kepler::{self_test, Verdict};

#[derive(Parser, Debug)]
#[command(about = "Integrate an n-body system and stream its trajectory on stdout")]
pub struct EngineArgs {
    /// System file: 'G N' header, then 'name r0 r1 r2 v0 v1 v2 mass [fixed]' per body
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Time step [default: 0.01 for euler, 0.0001 for verlet]
    #[arg(long)]
    pub dt: Option<f64>,

    /// Total simulated time
    #[arg(long = "T", default_value_t = 10.0)]
    pub t_end: f64,

    /// Plummer softening length, 0 keeps the bare inverse-square law
    #[arg(long, default_value_t = 0.0)]
    pub softening: f64,

    /// Run the built-in Kepler-orbit regression and exit
    #[arg(long)]
    pub test: bool,
}

/// Parse the process arguments and run the engine for `method`
pub fn run(method: Method) -> Result<ExitCode> {
    match EngineArgs::try_parse() {
        Ok(args) => execute(method, args),
        Err(err) => {
            err.print()?;
            if err.use_stderr() {
                print_usage(method);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

pub fn execute(method: Method, args: EngineArgs) -> Result<ExitCode> {
    if args.test {
        return run_self_test(method);
    }

    let Some(path) = args.input else {
        print_usage(method);
        return Ok(ExitCode::SUCCESS);
    };

    let dt = args.dt.unwrap_or(method.default_dt());
    let system = input::load(&path, dt)?;
    let mut sim = Simulation::new(system, method)
        .context("invalid run parameters")?
        .with_softening(args.softening);

    let mut encoder = FrameEncoder::new(BufWriter::new(io::stdout().lock()));
    let streamed = encoder
        .write_header(sim.system())
        .map_err(Into::into)
        .and_then(|_| sim.run(args.t_end, |sys| encoder.write_frame(sys)))
        .and_then(|steps| {
            encoder.flush()?;
            Ok(steps)
        });

    match streamed {
        Ok(steps) => {
            info!("{method}: {steps} steps streamed");
            Ok(ExitCode::SUCCESS)
        }
        Err(crate::EngineError::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
            info!("{method}: consumer closed the stream at t = {}", sim.system().t());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(err).context("trajectory streaming failed"),
    }
}

fn run_self_test(method: Method) -> Result<ExitCode> {
    let report = self_test(method)?;
    let [e1, e2, e3] = report.errors;

    let mut out = io::stdout().lock();
    writeln!(out, "{e1:.6} {e2:.6} {e3:.6}")?;
    match report.verdict {
        Verdict::Passed => writeln!(out, "Ok")?,
        Verdict::FirstRatio => writeln!(out, "Error1 {:.6}", e1 / e2)?,
        Verdict::SecondRatio => writeln!(out, "Error2 {:.6}", e1 / e3)?,
    }
    Ok(ExitCode::from(report.verdict.exit_code()))
}

fn print_usage(method: Method) {
    let usage = EngineArgs::command()
        .bin_name(method.binary_name())
        .render_usage();
    println!("{usage}");
}
