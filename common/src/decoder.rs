//! Consumer side of the trajectory stream
//!
//! The decoder owns the consumer's body catalog. Declarations append bodies
//! until the first data line arrives; from then on each data line overwrites
//! positions and velocities in place, so only the latest frame is retained.

use glam::DVec3;
use log::{debug, warn};

use crate::body::{Body, Frame};
use crate::protocol::{classify, Line, Malformed, FIELDS_PER_BODY};

/// Result of applying one data line to the catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub t: f64,
    /// Number of numeric fields written into the catalog
    pub fields_applied: usize,
    /// Every declared body received all six fields
    pub complete: bool,
}

/// What a single fed line did to the decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded {
    Header,
    Declared { index: usize },
    Frame(FrameUpdate),
    Skipped(Malformed),
}

#[derive(Debug, Default)]
pub struct Decoder {
    catalog: Vec<Body>,
    streaming: bool,
    t: f64,
    frames: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every declared body and return to the declaration phase
    pub fn reset(&mut self) {
        self.catalog.clear();
        self.streaming = false;
        self.t = 0.0;
        self.frames = 0;
    }

    pub fn catalog(&self) -> &[Body] {
        &self.catalog
    }

    /// Time stamp of the latest data line
    pub fn t(&self) -> f64 {
        self.t
    }

    /// True once a line that is neither header nor declaration closed the
    /// declaration phase
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames
    }

    /// Snapshot of the latest decoded state
    pub fn frame(&self) -> Frame {
        Frame::capture(self.t, &self.catalog)
    }

    pub fn feed(&mut self, line: &str) -> Decoded {
        match classify(line) {
            Line::Header => Decoded::Header,
            Line::Declaration { .. } if self.streaming => {
                warn!("ignoring {}", Malformed::LateDeclaration);
                Decoded::Skipped(Malformed::LateDeclaration)
            }
            Line::Declaration { name, mass } => {
                debug!("declared body #{} '{}' (m = {})", self.catalog.len(), name, mass);
                self.catalog.push(Body::new(name, mass));
                Decoded::Declared {
                    index: self.catalog.len() - 1,
                }
            }
            Line::Data { t, fields } => Decoded::Frame(self.apply(t, fields)),
            Line::Malformed(reason) => {
                // only `#` lines keep the declaration phase open
                if reason != Malformed::Declaration {
                    self.streaming = true;
                }
                warn!("skipping protocol line: {reason}");
                Decoded::Skipped(reason)
            }
        }
    }

    /// Fill position and velocity body by body; stop at the first missing or
    /// unparsable field and leave everything after it untouched
    fn apply(&mut self, t: f64, fields: &str) -> FrameUpdate {
        self.streaming = true;
        self.t = t;
        self.frames += 1;

        let mut tokens = fields.split_whitespace();
        let mut applied = 0;
        'bodies: for body in &mut self.catalog {
            for slot in 0..FIELDS_PER_BODY {
                let Some(value) = tokens.next().and_then(|tok| tok.parse::<f64>().ok()) else {
                    break 'bodies;
                };
                write_slot(body, slot, value);
                applied += 1;
            }
        }

        let expected = self.catalog.len() * FIELDS_PER_BODY;
        if applied < expected {
            warn!("short data line at t = {t}: {applied} of {expected} fields");
        }
        FrameUpdate {
            t,
            fields_applied: applied,
            complete: applied == expected,
        }
    }
}

fn write_slot(body: &mut Body, slot: usize, value: f64) {
    let target: &mut DVec3 = if slot < 3 {
        &mut body.position
    } else {
        &mut body.velocity
    };
    target[slot % 3] = value;
}
