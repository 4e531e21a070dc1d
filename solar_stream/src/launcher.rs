//! Building the engine command line from spawn parameters

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use common::Method;

/// Everything that determines one engine run; changing any of it restarts
/// the engine
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnParams {
    pub method: Method,
    pub input: PathBuf,
    pub dt: f64,
    /// Total simulated time, engine default when `None`
    pub t_end: Option<f64>,
}

impl SpawnParams {
    pub fn new(method: Method, input: impl Into<PathBuf>) -> Self {
        Self {
            method,
            input: input.into(),
            dt: method.default_dt(),
            t_end: None,
        }
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_t_end(mut self, t_end: f64) -> Self {
        self.t_end = Some(t_end);
        self
    }

    /// Engine flags: `--input <path> --dt <dt> [--T <t_end>]`
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            "--input".to_string(),
            self.input.display().to_string(),
            "--dt".to_string(),
            self.dt.to_string(),
        ];
        if let Some(t_end) = self.t_end {
            args.push("--T".to_string());
            args.push(t_end.to_string());
        }
        args
    }
}

/// Turns spawn parameters into a ready-to-spawn command
///
/// The supervisor takes care of the stdio wiring.
pub trait EngineLauncher {
    fn command(&self, params: &SpawnParams) -> Command;
}

/// Launches the `euler` / `verlet` binaries from one directory
#[derive(Debug, Clone)]
pub struct BinaryLauncher {
    pub bin_dir: PathBuf,
}

impl BinaryLauncher {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    /// Engines installed next to the running executable
    pub fn beside_current_exe() -> io::Result<Self> {
        let exe = env::current_exe()?;
        let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(dir))
    }

    pub fn program(&self, method: Method) -> PathBuf {
        self.bin_dir
            .join(method.binary_name())
            .with_extension(env::consts::EXE_EXTENSION)
    }
}

impl EngineLauncher for BinaryLauncher {
    fn command(&self, params: &SpawnParams) -> Command {
        let mut command = Command::new(self.program(params.method));
        command.args(params.engine_args());
        command
    }
}
