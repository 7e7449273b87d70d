//! MPEG audio header fields from `file` probe output

use serde::Serialize;

use crate::patterns::{MP2_SHORT_FIELDS, MPEG_HEADER_FIELDS};

/// MPEG audio version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MpegVersion {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
    #[serde(rename = "2.5")]
    V2_5,
}

impl MpegVersion {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "1" => Some(MpegVersion::V1),
            "2" => Some(MpegVersion::V2),
            "2.5" => Some(MpegVersion::V2_5),
            _ => None,
        }
    }

    /// Integer version number; 2.5 counts as 2
    pub fn major(&self) -> u32 {
        match self {
            MpegVersion::V1 => 1,
            MpegVersion::V2 | MpegVersion::V2_5 => 2,
        }
    }
}

impl std::fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MpegVersion::V1 => "1",
            MpegVersion::V2 => "2",
            MpegVersion::V2_5 => "2.5",
        };
        f.write_str(s)
    }
}

/// Header of the first MPEG audio frame, as described by `file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MpegHeader {
    pub version: MpegVersion,
    /// 1, 2 or 3
    pub layer: u32,
    /// "Stereo", "JStereo", "Dual Channel" or "Single Channel"
    pub channel_mode: String,
    /// kbps
    pub bit_rate: u32,
    /// Hz
    pub sample_rate: u32,
}

impl MpegHeader {
    /// Parse `file` output; `None` when it does not describe MPEG audio
    pub fn parse(output: &str) -> Option<Self> {
        if let Some(caps) = MPEG_HEADER_FIELDS.captures(output) {
            let layer = match &caps[1] {
                "I" => 1,
                "II" => 2,
                "III" => 3,
                _ => return None,
            };
            return Some(Self {
                version: MpegVersion::parse(&caps[2])?,
                layer,
                bit_rate: caps[3].parse().ok()?,
                sample_rate: khz_to_hz(&caps[4])?,
                channel_mode: channel_mode_name(&caps[5]).to_string(),
            });
        }

        let caps = MP2_SHORT_FIELDS.captures(output)?;
        Some(Self {
            version: MpegVersion::V1,
            layer: 2,
            bit_rate: caps[1].parse().ok()?,
            sample_rate: khz_to_hz(&caps[2])?,
            channel_mode: channel_mode_name(&caps[3]).to_string(),
        })
    }

    /// 1 for single channel streams, 2 otherwise
    pub fn channels(&self) -> u32 {
        if self.channel_mode == "Single Channel" {
            1
        } else {
            2
        }
    }
}

fn khz_to_hz(value: &str) -> Option<u32> {
    let khz: f64 = value.parse().ok()?;
    Some((khz * 1000.0).round() as u32)
}

/// Normalise the mode names `file` prints to the header naming
fn channel_mode_name(mode: &str) -> &'static str {
    match mode {
        "Stereo" => "Stereo",
        "JStereo" | "JntStereo" => "JStereo",
        "2x Monaural" | "Dual-Ch" => "Dual Channel",
        _ => "Single Channel",
    }
}
