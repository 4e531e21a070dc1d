//! Lifecycle of one engine child process
//!
//! The supervisor spawns the engine, pumps its stdout through a [`Decoder`]
//! one line at a time and parks after every data line until the caller
//! resumes it. Catalog and status are only touched from [`Supervisor::poll`]
//! and [`Supervisor::wait`], on the caller's thread.

use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use common::{Body, Decoded, Decoder, Frame, Method};
use log::{debug, info, warn};

use crate::error::SupervisorError;
use crate::launcher::{BinaryLauncher, EngineLauncher, SpawnParams};
use crate::reader::{Completion, LineReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No child process
    Stopped,
    /// One line read is in flight
    Reading,
    /// A frame was delivered; waiting for [`Supervisor::resume`]
    Suspended,
    /// The engine closed its stdout and exited successfully
    Finished,
    /// Reading the engine's stdout failed, or the engine exited unsuccessfully
    Failed,
}

/// Receives every fully decoded frame
pub trait FrameSink {
    fn on_frame(&mut self, frame: &Frame);
}

impl<F: FnMut(&Frame)> FrameSink for F {
    fn on_frame(&mut self, frame: &Frame) {
        self(frame)
    }
}

pub struct Supervisor<L: EngineLauncher = BinaryLauncher> {
    launcher: L,
    params: Option<SpawnParams>,
    child: Option<Child>,
    reader: Option<LineReader>,
    decoder: Decoder,
    generation: u64,
    status: Status,
    exit: Option<ExitStatus>,
}

impl<L: EngineLauncher> Supervisor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            params: None,
            child: None,
            reader: None,
            decoder: Decoder::new(),
            generation: 0,
            status: Status::Stopped,
            exit: None,
        }
    }

    /// Stop whatever is running and spawn a fresh engine with `params`
    ///
    /// On error the supervisor is left stopped with no child behind.
    pub fn start(&mut self, params: SpawnParams) -> Result<(), SupervisorError> {
        self.stop();
        self.exit = None;

        let mut command = self.launcher.command(&params);
        command.stdin(Stdio::null()).stdout(Stdio::piped());
        let program = command.get_program().to_string_lossy().into_owned();
        self.params = Some(params);

        let mut child = command
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: program.clone(),
                source,
            })?;
        let Some(stdout) = child.stdout.take() else {
            reap(&mut child);
            return Err(SupervisorError::NoStdout);
        };

        self.generation += 1;
        let mut reader = match LineReader::spawn(stdout, self.generation) {
            Ok(reader) => reader,
            Err(err) => {
                reap(&mut child);
                return Err(SupervisorError::Reader(err));
            }
        };
        info!("started {} (pid {}, generation {})", program, child.id(), self.generation);

        reader.request();
        self.child = Some(child);
        self.reader = Some(reader);
        self.status = Status::Reading;
        Ok(())
    }

    /// Start again with the current parameters
    pub fn restart(&mut self) -> Result<(), SupervisorError> {
        let params = self.params.clone().ok_or(SupervisorError::NoParams)?;
        self.start(params)
    }

    /// Restart only if `params` differ from the running ones, or nothing is
    /// running. Returns whether a new engine was started.
    pub fn set_params(&mut self, params: SpawnParams) -> Result<bool, SupervisorError> {
        if self.status != Status::Stopped && self.params.as_ref() == Some(&params) {
            return Ok(false);
        }
        self.start(params)?;
        Ok(true)
    }

    pub fn set_method(&mut self, method: Method) -> Result<bool, SupervisorError> {
        self.update(|params| params.method = method)
    }

    pub fn set_input(&mut self, input: impl Into<PathBuf>) -> Result<bool, SupervisorError> {
        let input = input.into();
        self.update(|params| params.input = input)
    }

    pub fn set_dt(&mut self, dt: f64) -> Result<bool, SupervisorError> {
        self.update(|params| params.dt = dt)
    }

    pub fn set_t_end(&mut self, t_end: Option<f64>) -> Result<bool, SupervisorError> {
        self.update(|params| params.t_end = t_end)
    }

    fn update(&mut self, edit: impl FnOnce(&mut SpawnParams)) -> Result<bool, SupervisorError> {
        let mut params = self.params.clone().ok_or(SupervisorError::NoParams)?;
        edit(&mut params);
        self.set_params(params)
    }

    /// Cancel the pending read, kill and reap the child, forget the catalog.
    /// Does nothing when already stopped.
    pub fn stop(&mut self) {
        if self.status == Status::Stopped && self.child.is_none() && self.reader.is_none() {
            return;
        }
        // Dropping the reader disconnects its channels, a late completion
        // has nowhere to land
        self.reader = None;
        if let Some(mut child) = self.child.take() {
            reap(&mut child);
        }
        self.decoder.reset();
        self.status = Status::Stopped;
        debug!("supervisor stopped (generation {})", self.generation);
    }

    /// Handle completions that already arrived, without blocking
    pub fn poll<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Status {
        while self.status == Status::Reading {
            let Some(completion) = self.reader.as_mut().and_then(LineReader::try_complete) else {
                break;
            };
            self.complete(completion, sink);
        }
        self.status
    }

    /// Block for up to `timeout` while the supervisor is reading
    pub fn wait<S: FrameSink + ?Sized>(&mut self, timeout: Duration, sink: &mut S) -> Status {
        let deadline = Instant::now() + timeout;
        while self.status == Status::Reading {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            let Some(completion) = self.reader.as_mut().and_then(|r| r.wait(left)) else {
                break;
            };
            self.complete(completion, sink);
        }
        self.status
    }

    /// Re-arm exactly one read after a delivered frame
    pub fn resume(&mut self) -> bool {
        if self.status != Status::Suspended {
            return false;
        }
        self.status = Status::Reading;
        self.request_line();
        true
    }

    fn request_line(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            reader.request();
        }
    }

    fn complete<S: FrameSink + ?Sized>(&mut self, completion: Completion, sink: &mut S) {
        if completion.generation != self.generation {
            debug!("dropping completion from generation {}", completion.generation);
            return;
        }
        match completion.line {
            Ok(Some(line)) => match self.decoder.feed(&line) {
                Decoded::Frame(update) => {
                    if !update.complete {
                        debug!("partial frame at t = {}", update.t);
                    }
                    self.status = Status::Suspended;
                    sink.on_frame(&self.decoder.frame());
                }
                _ => self.request_line(),
            },
            Ok(None) => self.collect_exit(),
            Err(err) => {
                warn!("reading engine output failed: {err}");
                self.status = Status::Failed;
            }
        }
    }

    /// The engine closed its stdout; reap it and judge the run by its exit
    /// status
    fn collect_exit(&mut self) {
        let Some(mut child) = self.child.take() else {
            self.status = Status::Finished;
            return;
        };
        match child.wait() {
            Ok(exit) if exit.success() => {
                info!("engine finished ({exit})");
                self.status = Status::Finished;
                self.exit = Some(exit);
            }
            Ok(exit) => {
                warn!("engine failed ({exit})");
                self.status = Status::Failed;
                self.exit = Some(exit);
            }
            Err(err) => {
                warn!("cannot collect engine exit status: {err}");
                self.status = Status::Failed;
            }
        }
    }

    pub fn params(&self) -> Option<&SpawnParams> {
        self.params.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Exit status of the last engine that ran to the end of its output
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit
    }

    pub fn is_suspended(&self) -> bool {
        self.status == Status::Suspended
    }

    /// True while a line read is outstanding
    pub fn in_flight(&self) -> bool {
        self.reader.as_ref().is_some_and(LineReader::in_flight)
    }

    pub fn child_id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Bodies declared by the running engine, holding the latest frame
    pub fn catalog(&self) -> &[Body] {
        self.decoder.catalog()
    }

    /// Latest decoded frame, once data has started
    pub fn latest(&self) -> Option<Frame> {
        (self.decoder.frames_decoded() > 0).then(|| self.decoder.frame())
    }

    pub fn frames_decoded(&self) -> u64 {
        self.decoder.frames_decoded()
    }

    /// Incremented on every spawn
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<L: EngineLauncher> Drop for Supervisor<L> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Kill the child if it still runs and collect its exit status
fn reap(child: &mut Child) {
    let pid = child.id();
    if let Err(err) = child.kill() {
        debug!("kill pid {pid}: {err}");
    }
    match child.wait() {
        Ok(exit) => info!("engine pid {pid} stopped ({exit})"),
        Err(err) => warn!("waiting for engine pid {pid}: {err}"),
    }
}
