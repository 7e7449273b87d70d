//! Basic info record returned by the info operations

use serde::Serialize;

use super::mpeg::{MpegHeader, MpegVersion};
use super::soxi::SourceFormatInfo;

pub const WAV_CONTENT_TYPE: &str = "audio/vnd.wave";
pub const MPEG_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    /// Bytes on disk
    pub size: u64,
    pub content_type: String,
    pub channel_mode: String,
    /// kbps
    pub bit_rate: u32,
    /// Seconds
    pub length: f64,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<MpegVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<u32>,
}

/// "Mono" for one channel, "Stereo" otherwise
pub fn simple_channel_mode(channels: u16) -> &'static str {
    if channels <= 1 {
        "Mono"
    } else {
        "Stereo"
    }
}

impl AudioInfo {
    pub fn for_wav(size: u64, format: &SourceFormatInfo) -> Self {
        Self {
            size,
            content_type: WAV_CONTENT_TYPE.to_string(),
            channel_mode: simple_channel_mode(format.channel_count).to_string(),
            bit_rate: format.pcm_bit_rate(),
            length: format.duration_secs,
            sample_rate: format.sample_rate,
            version: None,
            layer: None,
        }
    }

    pub fn for_mpeg(size: u64, header: &MpegHeader, duration_secs: f64) -> Self {
        Self {
            size,
            content_type: MPEG_CONTENT_TYPE.to_string(),
            channel_mode: header.channel_mode.clone(),
            bit_rate: header.bit_rate,
            length: duration_secs,
            sample_rate: header.sample_rate,
            version: Some(header.version),
            layer: Some(header.layer),
        }
    }

    pub fn for_audio(
        size: u64,
        content_type: String,
        format: &SourceFormatInfo,
        bit_rate: u32,
    ) -> Self {
        Self {
            size,
            content_type,
            channel_mode: simple_channel_mode(format.channel_count).to_string(),
            bit_rate,
            length: format.duration_secs,
            sample_rate: format.sample_rate,
            version: None,
            layer: None,
        }
    }

    /// Channel count implied by the channel mode
    pub fn channels(&self) -> u16 {
        match self.channel_mode.as_str() {
            "Mono" | "Single Channel" => 1,
            _ => 2,
        }
    }
}
