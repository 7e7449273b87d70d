//! Encode parameter negotiation
//!
//! Turns a sparse set of caller overrides plus the source format into a
//! concrete parameter set the encoder accepts. Overrides outside the codec's
//! tables are ignored in favour of the defaults below.

use serde::{Deserialize, Serialize};

use crate::probe::{CompressionKind, SourceFormatInfo};

use super::tables::{Codec, DEFAULT_SAMPLE_RATE, EMPHASIS_MODES, MAX_OGG_CHANNELS, MONO_MODE};

/// Caller overrides; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub sample_rate: Option<u32>,
    pub bit_rate: Option<u32>,
    pub per_channel_bit_rate: Option<u32>,
    pub channel_mode: Option<String>,
    pub protect: Option<bool>,
    pub copyright: Option<bool>,
    pub original: Option<bool>,
    pub emphasis: Option<String>,
    /// Output channel count (Vorbis only)
    pub channels: Option<u16>,
}

/// Concrete encoder parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedParameters {
    pub codec: Codec,
    /// Hz
    pub sample_rate: u32,
    /// kbps
    pub bit_rate: u32,
    pub channel_mode: &'static str,
    pub channel_count: u16,
    /// Mix a multi-channel source down to mono
    pub downmix: bool,
    /// Output rate differs from the source rate
    pub resample: bool,
}

impl ResolvedParameters {
    pub fn is_mono(&self) -> bool {
        self.channel_mode == MONO_MODE
    }
}

/// MPEG layer II header flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mp2HeaderFlags {
    pub protect: bool,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: &'static str,
}

impl Mp2HeaderFlags {
    /// Flags default on, emphasis defaults to none
    pub fn resolve(options: &EncodeOptions) -> Self {
        let emphasis = options
            .emphasis
            .as_deref()
            .and_then(|e| EMPHASIS_MODES.iter().copied().find(|m| *m == e))
            .unwrap_or("n");
        Self {
            protect: options.protect.unwrap_or(true),
            copyright: options.copyright.unwrap_or(true),
            original: options.original.unwrap_or(true),
            emphasis,
        }
    }
}

/// Resolve the full parameter set for one encode
pub fn resolve(
    codec: Codec,
    source: &SourceFormatInfo,
    options: &EncodeOptions,
) -> ResolvedParameters {
    let allowed_rate = |rate: &u32| codec.sample_rates().contains(rate);
    let sample_rate = options
        .sample_rate
        .filter(allowed_rate)
        .or(Some(source.sample_rate).filter(allowed_rate))
        .unwrap_or(DEFAULT_SAMPLE_RATE);

    let channel_mode = options
        .channel_mode
        .as_deref()
        .and_then(|m| codec.channel_mode(m))
        .unwrap_or(if source.is_mono() {
            MONO_MODE
        } else {
            codec.stereo_default()
        });
    let mono = channel_mode == MONO_MODE;

    let channel_count = match codec {
        Codec::Ogg => options
            .channels
            .filter(|c| *c > 0)
            .map(|c| c.min(MAX_OGG_CHANNELS))
            .unwrap_or(if mono { 1 } else { 2 }),
        Codec::Mp2 | Codec::Mp3 => {
            if mono {
                1
            } else {
                2
            }
        }
    };

    let per_channel_multiplier = match codec {
        Codec::Ogg => u32::from(channel_count),
        Codec::Mp2 | Codec::Mp3 => {
            if mono {
                1
            } else {
                2
            }
        }
    };
    let requested = match (options.per_channel_bit_rate, options.bit_rate) {
        (Some(per_channel), _) => per_channel.saturating_mul(per_channel_multiplier),
        (None, Some(bit_rate)) => bit_rate,
        (None, None) => 0,
    };
    let bit_rate = if codec.bit_rates().contains(&requested) {
        requested
    } else {
        default_bit_rate(codec, channel_mode, source)
    };

    let resolved = ResolvedParameters {
        codec,
        sample_rate,
        bit_rate,
        channel_mode,
        channel_count,
        downmix: mono && source.channel_count > 1,
        resample: sample_rate != source.sample_rate,
    };
    tracing::debug!("resolved {:?} parameters: {:?}", codec, resolved);
    resolved
}

fn default_bit_rate(codec: Codec, channel_mode: &str, source: &SourceFormatInfo) -> u32 {
    match codec {
        Codec::Ogg => 96,
        Codec::Mp2 if channel_mode == "a" && source.is_mono() => 128,
        Codec::Mp2 | Codec::Mp3 if channel_mode == MONO_MODE => 128,
        Codec::Mp2 | Codec::Mp3 => 256,
    }
}

/// Sample size twolame is told to read
///
/// twolame scales wide float samples down internally, so anything above
/// 32-bit float is declared as 16.
pub fn mp2_input_sample_size(source: &SourceFormatInfo) -> u16 {
    if source.compression == CompressionKind::FloatingPoint && source.bit_depth > 32 {
        16
    } else {
        source.bit_depth
    }
}
