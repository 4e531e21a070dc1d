//! One-at-a-time asynchronous line reads from a child's stdout
//!
//! A dedicated thread owns the pipe and performs exactly one `read_line` per
//! request, posting the result back as a [`Completion`]. The caller polls for
//! completions without blocking, so all state it guards stays on the caller's
//! thread.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use log::debug;

/// Outcome of one read request; `Ok(None)` is end of stream
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub line: io::Result<Option<String>>,
}

pub struct LineReader {
    generation: u64,
    requests: Sender<()>,
    completions: Receiver<Completion>,
    in_flight: bool,
}

impl LineReader {
    /// Start the reader thread; `generation` tags every completion it posts
    pub fn spawn<R>(source: R, generation: u64) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (requests, request_rx) = mpsc::channel::<()>();
        let (completion_tx, completions) = mpsc::channel();

        thread::Builder::new()
            .name(format!("engine-reader-{generation}"))
            .spawn(move || {
                let mut reader = BufReader::new(source);
                while request_rx.recv().is_ok() {
                    let line = read_one(&mut reader);
                    let last = !matches!(line, Ok(Some(_)));
                    if completion_tx.send(Completion { generation, line }).is_err() || last {
                        break;
                    }
                }
                debug!("reader {generation} exiting");
            })?;

        Ok(Self {
            generation,
            requests,
            completions,
            in_flight: false,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Arm one read. Returns false, doing nothing, while a read is outstanding.
    pub fn request(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        // A dead thread shows up as a disconnected completion channel
        let _ = self.requests.send(());
        self.in_flight = true;
        true
    }

    /// Take the outstanding read's completion if it has arrived
    pub fn try_complete(&mut self) -> Option<Completion> {
        if !self.in_flight {
            return None;
        }
        match self.completions.try_recv() {
            Ok(completion) => Some(self.finish(completion)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.closed()),
        }
    }

    /// Like [`LineReader::try_complete`], but block for up to `timeout`
    pub fn wait(&mut self, timeout: Duration) -> Option<Completion> {
        if !self.in_flight {
            return None;
        }
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(self.finish(completion)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.closed()),
        }
    }

    fn finish(&mut self, completion: Completion) -> Completion {
        self.in_flight = false;
        completion
    }

    fn closed(&mut self) -> Completion {
        self.finish(Completion {
            generation: self.generation,
            line: Ok(None),
        })
    }
}

fn read_one<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r').len();
    line.truncate(trimmed);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PATIENCE: Duration = Duration::from_secs(5);

    #[test]
    fn reads_only_when_asked() {
        let mut reader = LineReader::spawn(Cursor::new("one\ntwo\r\n"), 7).unwrap();
        assert!(reader.wait(Duration::from_millis(20)).is_none());

        assert!(reader.request());
        assert!(!reader.request(), "second request while one is in flight");
        let first = reader.wait(PATIENCE).unwrap();
        assert_eq!(first.generation, 7);
        assert_eq!(first.line.unwrap().as_deref(), Some("one"));
        assert!(!reader.in_flight());

        reader.request();
        assert_eq!(reader.wait(PATIENCE).unwrap().line.unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn end_of_stream_completes_with_none() {
        let mut reader = LineReader::spawn(Cursor::new("last"), 1).unwrap();
        reader.request();
        assert_eq!(reader.wait(PATIENCE).unwrap().line.unwrap().as_deref(), Some("last"));
        reader.request();
        assert!(reader.wait(PATIENCE).unwrap().line.unwrap().is_none());
        // the thread is gone, later requests still resolve to end of stream
        reader.request();
        assert!(reader.wait(PATIENCE).unwrap().line.unwrap().is_none());
    }
}
