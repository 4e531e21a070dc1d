//! Producer side of the trajectory stream

use std::io::{self, Write};

use crate::body::{Body, System};
use crate::protocol::format_sci;

/// Column names: `t` then `r{i},{k}` and `v{i},{k}` for every body
pub fn header_line(bodies: usize) -> String {
    let mut line = String::from("t");
    for i in 0..bodies {
        for prefix in ['r', 'v'] {
            for k in 0..3 {
                line.push_str(&format!(" {prefix}{i},{k}"));
            }
        }
    }
    line
}

pub fn declaration_line(body: &Body) -> String {
    format!("# {} {}", body.name, format_sci(body.mass))
}

pub fn data_line(t: f64, bodies: &[Body]) -> String {
    let mut line = format_sci(t);
    for body in bodies {
        for value in body.position.to_array().into_iter().chain(body.velocity.to_array()) {
            line.push(' ');
            line.push_str(&format_sci(value));
        }
    }
    line
}

/// Writes the header block once, then one data line per frame
pub struct FrameEncoder<W: Write> {
    out: W,
    declared: Option<usize>,
}

impl<W: Write> FrameEncoder<W> {
    pub fn new(out: W) -> Self {
        Self { out, declared: None }
    }

    /// Column names followed by one `# name mass` line per body
    pub fn write_header(&mut self, system: &System) -> io::Result<()> {
        writeln!(self.out, "{}", header_line(system.len()))?;
        for body in &system.bodies {
            writeln!(self.out, "{}", declaration_line(body))?;
        }
        self.declared = Some(system.len());
        Ok(())
    }

    pub fn write_frame(&mut self, system: &System) -> io::Result<()> {
        match self.declared {
            Some(n) if n == system.len() => {}
            Some(n) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("frame carries {} bodies but {n} were declared", system.len()),
                ))
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "frame written before the header",
                ))
            }
        }
        writeln!(self.out, "{}", data_line(system.t(), &system.bodies))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
