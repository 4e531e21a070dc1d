//! Headless stream consumer: runs an engine and prints one line per frame at
//! a fixed tick

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use common::{format_sci, Frame, Method};
use solar_stream::{BinaryLauncher, FrameSink, SpawnParams, Status, Supervisor};

#[derive(Debug, Parser)]
#[command(name = "solar_stream", about = "Consume an n-body engine's trajectory stream")]
struct Args {
    /// Integration method, selects the engine binary
    #[arg(long, default_value_t = Method::Verlet)]
    method: Method,

    /// System description handed to the engine
    #[arg(long)]
    input: PathBuf,

    /// Time step, method default when omitted
    #[arg(long)]
    dt: Option<f64>,

    /// Total simulated time
    #[arg(long = "T")]
    t_end: Option<f64>,

    /// Directory holding the engine binaries, defaults to this executable's
    #[arg(long)]
    bin_dir: Option<PathBuf>,

    /// Display tick in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

/// Prints `t x0 y0 z0 x1 ...` for every frame
struct Printer<W: Write> {
    out: W,
    frames: u64,
    error: Option<io::Error>,
}

impl<W: Write> FrameSink for Printer<W> {
    fn on_frame(&mut self, frame: &Frame) {
        self.frames += 1;
        let mut line = format_sci(frame.t);
        for state in &frame.states {
            for value in state.position.to_array() {
                line.push(' ');
                line.push_str(&format_sci(value));
            }
        }
        if let Err(err) = writeln!(self.out, "{line}") {
            self.error.get_or_insert(err);
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let launcher = match args.bin_dir {
        Some(dir) => BinaryLauncher::new(dir),
        None => BinaryLauncher::beside_current_exe().context("cannot locate engine binaries")?,
    };
    let mut params = SpawnParams::new(args.method, args.input);
    if let Some(dt) = args.dt {
        params = params.with_dt(dt);
    }
    if let Some(t_end) = args.t_end {
        params = params.with_t_end(t_end);
    }

    let mut supervisor = Supervisor::new(launcher);
    supervisor.start(params).context("cannot start engine")?;

    let tick = Duration::from_millis(args.tick_ms);
    let mut printer = Printer {
        out: io::stdout().lock(),
        frames: 0,
        error: None,
    };
    let mut announced = false;

    loop {
        let started = Instant::now();
        match supervisor.wait(tick, &mut printer) {
            Status::Reading => continue,
            Status::Suspended => {
                if !announced {
                    let names: Vec<&str> =
                        supervisor.catalog().iter().map(|b| b.name.as_str()).collect();
                    log::info!("streaming {} bodies: {}", names.len(), names.join(" "));
                    announced = true;
                }
                if let Some(err) = printer.error.take() {
                    if err.kind() == io::ErrorKind::BrokenPipe {
                        break;
                    }
                    return Err(err).context("cannot write frame");
                }
                if args.frames.is_some_and(|limit| printer.frames >= limit) {
                    break;
                }
                thread::sleep(tick.saturating_sub(started.elapsed()));
                supervisor.resume();
            }
            Status::Finished | Status::Stopped => break,
            Status::Failed => match supervisor.exit_status() {
                Some(exit) => bail!("engine failed ({exit})"),
                None => bail!("engine output could not be read"),
            },
        }
    }

    printer.out.flush().ok();
    supervisor.stop();
    Ok(ExitCode::SUCCESS)
}
