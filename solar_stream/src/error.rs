//! Error types for the process supervisor

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("engine process has no stdout pipe")]
    NoStdout,

    #[error("failed to start the line reader: {0}")]
    Reader(#[source] io::Error),

    #[error("no engine parameters configured")]
    NoParams,
}
