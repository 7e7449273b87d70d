//! Interpretation of probe tool output
//!
//! - `soxi` reports into [`SourceFormatInfo`]
//! - `file` reports into [`MpegHeader`]
//! - the [`AudioInfo`] record built from either

pub mod info;
pub mod mpeg;
pub mod soxi;

pub use info::AudioInfo;
pub use mpeg::{MpegHeader, MpegVersion};
pub use soxi::{parse_bit_rate_kbps, CompressionKind, SourceFormatInfo};
