//! Allowed encode parameter values per output codec

use serde::{Deserialize, Serialize};

use crate::config::Tool;

/// kbps accepted by lame (and used for Vorbis)
pub const MP3_BIT_RATES: &[u32] = &[32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

/// kbps accepted by twolame
pub const MP2_BIT_RATES: &[u32] = &[
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
];

/// Output sample rates (Hz), shared by every codec
pub const SAMPLE_RATES: &[u32] = &[32000, 44100, 48000];

/// (s)tereo, (j)oint, (d)ual, (m)ono, (a)uto
pub const TWOLAME_MODES: &[&str] = &["s", "j", "d", "m", "a"];

/// (j)oint, (s)imple stereo, (f)orce, (d)ual-mono, (m)ono
pub const LAME_MODES: &[&str] = &["j", "s", "f", "d", "m"];

/// twolame de-emphasis settings: none, 50/15 us, CCITT
pub const EMPHASIS_MODES: &[&str] = &["n", "5", "c"];

pub const MONO_MODE: &str = "m";
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const MAX_OGG_CHANNELS: u16 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Mp2,
    Mp3,
    Ogg,
}

impl Codec {
    pub fn sample_rates(&self) -> &'static [u32] {
        SAMPLE_RATES
    }

    pub fn bit_rates(&self) -> &'static [u32] {
        match self {
            Codec::Mp2 => MP2_BIT_RATES,
            Codec::Mp3 | Codec::Ogg => MP3_BIT_RATES,
        }
    }

    pub fn channel_modes(&self) -> &'static [&'static str] {
        match self {
            Codec::Mp2 => TWOLAME_MODES,
            Codec::Mp3 | Codec::Ogg => LAME_MODES,
        }
    }

    /// Table entry for a requested mode token, if the codec supports it
    pub fn channel_mode(&self, token: &str) -> Option<&'static str> {
        self.channel_modes().iter().copied().find(|m| *m == token)
    }

    /// Mode used for multi-channel sources when none is requested
    pub fn stereo_default(&self) -> &'static str {
        match self {
            Codec::Mp2 => "s",
            Codec::Mp3 | Codec::Ogg => "j",
        }
    }

    /// Encoder that produces this codec
    pub fn encoder(&self) -> Tool {
        match self {
            Codec::Mp2 => Tool::Twolame,
            Codec::Mp3 => Tool::Lame,
            Codec::Ogg => Tool::Ffmpeg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Mp2 => "mp2",
            Codec::Mp3 => "mp3",
            Codec::Ogg => "ogg",
        }
    }
}

impl std::str::FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp2" => Ok(Codec::Mp2),
            "mp3" => Ok(Codec::Mp3),
            "ogg" | "vorbis" => Ok(Codec::Ogg),
            other => Err(format!("unsupported codec '{}'", other)),
        }
    }
}
