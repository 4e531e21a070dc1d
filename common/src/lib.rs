//! Shared model for the n-body engine and its consumers
//!
//! This crate provides the body catalog types, the integration method
//! selector, and both halves of the line-oriented trajectory protocol.

pub mod body;
pub mod method;
pub mod protocol;
pub mod encoder;
pub mod decoder;

pub use body::{Body, BodyState, Frame, System, MAX_NAME_LEN};
pub use decoder::{Decoded, Decoder, FrameUpdate};
pub use encoder::FrameEncoder;
pub use method::{Method, ParseMethodError};
pub use protocol::{classify, format_sci, Line, Malformed};

pub use glam::DVec3;
