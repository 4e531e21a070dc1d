//! System input files
//!
//! ```text
//! G N
//! name1 r0 r1 r2 v0 v1 v2 mass [fixed]
//! ...
//! nameN r0 r1 r2 v0 v1 v2 mass [fixed]
//! ```
//!
//! `G` and `N` may also sit on two separate lines. Anything after the N-th
//! body record is ignored, which lets generators append display hints.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use common::{Body, System, MAX_NAME_LEN};
use glam::DVec3;
use log::info;

use crate::error::{FormatError, InputError};

/// Read and validate a system file, combining it with the run's time step
pub fn load(path: &Path, dt: f64) -> Result<System, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let system = parse(&text, dt).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loaded {} bodies from {} (G = {})", system.len(), path.display(), system.g);
    Ok(system)
}

pub fn parse(text: &str, dt: f64) -> Result<System, FormatError> {
    // (1-based line number, content) of every non-blank line
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let mut header: Vec<&str> = Vec::with_capacity(2);
    while header.len() < 2 {
        let (_, line) = lines.next().ok_or(FormatError::Header)?;
        header.extend(line.split_whitespace());
    }
    if header.len() != 2 {
        return Err(FormatError::Header);
    }

    let g: f64 = header[0]
        .parse()
        .map_err(|_| FormatError::InvalidConstant(header[0].to_string()))?;
    let count: usize = header[1]
        .parse()
        .map_err(|_| FormatError::InvalidCount(header[1].to_string()))?;

    let mut system = System::new(g, dt);
    let mut names = HashSet::new();
    for found in 0..count {
        let (line_no, line) = lines.next().ok_or(FormatError::MissingBodies {
            expected: count,
            found,
        })?;
        let body = parse_body(line_no, line)?;
        if !names.insert(body.name.clone()) {
            return Err(FormatError::DuplicateName {
                line: line_no,
                name: body.name,
            });
        }
        system.bodies.push(body);
    }

    Ok(system)
}

fn parse_body(line: usize, text: &str) -> Result<Body, FormatError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if !(8..=9).contains(&fields.len()) {
        return Err(FormatError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let name = fields[0];
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FormatError::NameTooLong {
            line,
            name: name.to_string(),
        });
    }

    let mut numbers = [0.0_f64; 7];
    for (slot, token) in numbers.iter_mut().zip(&fields[1..8]) {
        *slot = token.parse().map_err(|_| FormatError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;
    }

    let mass = numbers[6];
    if !(mass.is_finite() && mass > 0.0) {
        return Err(FormatError::NonPositiveMass { line, mass });
    }

    let fixed = match fields.get(8) {
        None | Some(&"0") => false,
        Some(&"fixed") | Some(&"1") => true,
        Some(token) => {
            return Err(FormatError::InvalidFlag {
                line,
                token: token.to_string(),
            })
        }
    };

    let mut body = Body::new(name, mass)
        .at(DVec3::new(numbers[0], numbers[1], numbers[2]))
        .moving(DVec3::new(numbers[3], numbers[4], numbers[5]));
    body.fixed = fixed;
    Ok(body)
}

/// Serialize a system in the input format; values round-trip exactly
pub fn write_system<W: Write>(system: &System, mut out: W) -> io::Result<()> {
    writeln!(out, "{} {}", system.g, system.len())?;
    for b in &system.bodies {
        write!(
            out,
            "{} {} {} {} {} {} {} {}",
            b.name,
            b.position.x,
            b.position.y,
            b.position.z,
            b.velocity.x,
            b.velocity.y,
            b.velocity.z,
            b.mass
        )?;
        if b.fixed {
            write!(out, " fixed")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
