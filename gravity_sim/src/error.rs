//! Error types for the engine library

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("simulation already terminated")]
    Terminated,

    #[error("failed to write trajectory: {0}")]
    Io(#[from] io::Error),
}

/// Fatal problems with a system input file; the file is never half-loaded
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open file '{}': {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse file '{}': {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// What is wrong with the contents of an input file
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("missing or malformed header (expected 'G N')")]
    Header,

    #[error("invalid gravitational constant '{0}'")]
    InvalidConstant(String),

    #[error("invalid body count '{0}'")]
    InvalidCount(String),

    #[error("expected {expected} bodies, found {found}")]
    MissingBodies { expected: usize, found: usize },

    #[error("line {line}: expected 8 or 9 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: name '{name}' is longer than {} characters", common::MAX_NAME_LEN)]
    NameTooLong { line: usize, name: String },

    #[error("line {line}: duplicate body name '{name}'")]
    DuplicateName { line: usize, name: String },

    #[error("line {line}: mass must be positive, got {mass}")]
    NonPositiveMass { line: usize, mass: f64 },

    #[error("line {line}: invalid fixed flag '{token}' (expected 'fixed', '1' or '0')")]
    InvalidFlag { line: usize, token: String },
}
