//! Encode planning
//!
//! This module decides how a WAV source is encoded:
//! - Allowed parameter tables per output codec
//! - Negotiation of caller overrides against those tables
//! - Encoder and decoder command lines

pub mod command;
pub mod planner;
pub mod tables;

pub use planner::{resolve, EncodeOptions, Mp2HeaderFlags, ResolvedParameters};
pub use tables::Codec;
