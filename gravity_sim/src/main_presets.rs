//! Write a preset system in the input-file format
//!
//! `gravity_presets saturn --per-ring 999 --seed 3 > saturn.txt`

use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::Method;
use gravity_sim::input::write_system;
use gravity_sim::presets::{self, KEPLER_MASS};

#[derive(Parser, Debug)]
#[command(about = "Generate initial conditions for the n-body engines")]
struct Args {
    #[command(subcommand)]
    preset: Preset,
}

#[derive(Subcommand, Debug)]
enum Preset {
    /// Fixed star and one planet on a circular orbit
    Kepler {
        #[arg(long, default_value_t = KEPLER_MASS)]
        mass: f64,
    },
    /// Heavy planet with two particle rings
    Saturn {
        #[arg(long, default_value_t = 999)]
        per_ring: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Repulsive core surrounded by a particle shell
    Shell {
        #[arg(long, default_value_t = 999)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // dt is not part of the file format
    let dt = Method::Verlet.default_dt();
    let system = match args.preset {
        Preset::Kepler { mass } => presets::kepler(mass, dt),
        Preset::Saturn { per_ring, seed } => presets::saturn_rings(per_ring, seed, dt),
        Preset::Shell { count, seed } => presets::shell(count, seed, dt),
    };

    let mut out = BufWriter::new(io::stdout().lock());
    write_system(&system, &mut out)?;
    out.flush()?;
    Ok(())
}
