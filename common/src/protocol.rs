//! Line protocol spoken on the engine's standard output
//!
//! ```text
//! t r0,0 r0,1 r0,2 v0,0 v0,1 v0,2 r1,0 ...      column names
//! # Sun 1.000000e+05                            one declaration per body
//! # Planet 1.000000e+00
//! 0.000000e+00 0.000000e+00 ... 3.162278e+02    one data line per step
//! ```
//!
//! Every incoming line is classified into a [`Line`] before anything acts on
//! it, so malformed input is an explicit branch rather than a fallthrough.

use std::fmt;

/// Fractional digits written for every floating point field
pub const SCI_DIGITS: usize = 6;

/// Number of data fields carried per body: position then velocity
pub const FIELDS_PER_BODY: usize = 6;

/// Format a value the way C's `%e` does: `-1.234560e-07`, `nan`, `inf`
pub fn format_sci(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{:.*e}", SCI_DIGITS, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

/// Why a line could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    Empty,
    /// `#` line without a name and a numeric mass
    Declaration,
    /// Declaration seen after the first data line
    LateDeclaration,
    /// Data line whose leading time field is not a number
    Time,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Malformed::Empty => "empty line",
            Malformed::Declaration => "declaration without name and mass",
            Malformed::LateDeclaration => "declaration after the first data line",
            Malformed::Time => "data line with unparsable time field",
        };
        f.write_str(reason)
    }
}

/// A classified protocol line
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    /// Column names, carries no state
    Header,
    Declaration { name: &'a str, mass: f64 },
    /// `fields` is everything after the time token, still unparsed
    Data { t: f64, fields: &'a str },
    Malformed(Malformed),
}

/// Classify a line by its first character
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.chars().next() {
        None => Line::Malformed(Malformed::Empty),
        Some('t') => Line::Header,
        Some('#') => parse_declaration(&line[1..]),
        Some(_) => parse_data(line),
    }
}

fn parse_declaration(rest: &str) -> Line<'_> {
    let mut tokens = rest.split_whitespace();
    let name = tokens.next();
    let mass = tokens.next().and_then(|tok| tok.parse::<f64>().ok());
    match (name, mass) {
        (Some(name), Some(mass)) => Line::Declaration { name, mass },
        _ => Line::Malformed(Malformed::Declaration),
    }
}

fn parse_data(line: &str) -> Line<'_> {
    let line = line.trim_start();
    if line.is_empty() {
        return Line::Malformed(Malformed::Empty);
    }
    let (time, fields) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    match time.parse::<f64>() {
        Ok(t) => Line::Data { t, fields },
        Err(_) => Line::Malformed(Malformed::Time),
    }
}
