//! Time-integration method selection shared by the engine and its supervisor

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Stepping strategy, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// First-order, non-symplectic
    Euler,
    /// Second-order velocity Verlet, symplectic
    Verlet,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown integration method '{0}' (expected 'euler' or 'verlet')")]
pub struct ParseMethodError(pub String);

impl Method {
    pub const ALL: [Method; 2] = [Method::Euler, Method::Verlet];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Euler => "euler",
            Method::Verlet => "verlet",
        }
    }

    /// Time step used when `--dt` is not given
    pub fn default_dt(self) -> f64 {
        match self {
            Method::Euler => 0.01,
            Method::Verlet => 0.0001,
        }
    }

    /// File name of the engine binary that implements this method
    pub fn binary_name(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" => Ok(Method::Euler),
            "verlet" => Ok(Method::Verlet),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}
