//! `soxi` output parsing
//!
//! Full `soxi` output looks like:
//!
//! ```text
//! Input File     : 'tone.wav'
//! Channels       : 2
//! Sample Rate    : 44100
//! Precision      : 16-bit
//! Duration       : 00:00:10.00 = 441000 samples = 750 CDDA sectors
//! File Size      : 1.76M
//! Bit Rate       : 1.41M
//! Sample Encoding: 16-bit Signed Integer PCM
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AudioError, Result};

static SOXI_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z ]*?)\s*:\s*(.*?)\s*$").expect("valid soxi field pattern")
});

static BIT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)-bit").expect("valid bit count pattern"));

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d+):(\d+(?:\.\d+)?)(?:\s*=\s*(\d+) samples)?")
        .expect("valid duration pattern")
});

static RATE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d.]+)\s*([kKM]?)").expect("valid rate value pattern")
});

/// Sample encoding of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionKind {
    Pcm,
    FloatingPoint,
    Other(String),
}

/// Format facts about a source file, as reported by `soxi`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFormatInfo {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub bit_depth: u16,
    pub compression: CompressionKind,
    pub duration_secs: f64,
}

impl SourceFormatInfo {
    /// Parse full `soxi` output
    pub fn parse(output: &str) -> Result<Self> {
        let mut channels = None;
        let mut sample_rate = None;
        let mut precision = None;
        let mut encoding = None;
        let mut duration = None;

        for line in output.lines() {
            let Some(caps) = SOXI_FIELD.captures(line) else {
                continue;
            };
            let value = &caps[2];
            match &caps[1] {
                "Channels" => channels = value.parse::<u16>().ok(),
                "Sample Rate" => sample_rate = value.parse::<u32>().ok(),
                "Precision" => precision = bit_count(value),
                "Sample Encoding" => encoding = Some(value.to_string()),
                "Duration" => duration = Some(value.to_string()),
                _ => {}
            }
        }

        let channel_count = channels
            .ok_or_else(|| AudioError::Probe(format!("no channel count in soxi output: {}", output.trim())))?;
        let sample_rate = sample_rate
            .ok_or_else(|| AudioError::Probe(format!("no sample rate in soxi output: {}", output.trim())))?;

        let bit_depth = encoding
            .as_deref()
            .and_then(bit_count)
            .or(precision)
            .unwrap_or(16);

        let compression = match encoding.as_deref() {
            Some(e) if e.contains("Floating Point") => CompressionKind::FloatingPoint,
            Some(e) if e.contains("PCM") => CompressionKind::Pcm,
            Some(e) => CompressionKind::Other(e.to_string()),
            None => CompressionKind::Other(String::new()),
        };

        let duration_secs = duration
            .as_deref()
            .and_then(|d| parse_duration(d, sample_rate))
            .unwrap_or(0.0);

        Ok(Self {
            sample_rate,
            channel_count,
            bit_depth,
            compression,
            duration_secs,
        })
    }

    pub fn is_mono(&self) -> bool {
        self.channel_count <= 1
    }

    /// Uncompressed bit rate in kbps
    pub fn pcm_bit_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.channel_count) * u32::from(self.bit_depth) / 1000
    }
}

fn bit_count(value: &str) -> Option<u16> {
    BIT_COUNT.captures(value).and_then(|c| c[1].parse().ok())
}

/// `HH:MM:SS.ss = N samples ...`; the sample count wins when present
fn parse_duration(value: &str, sample_rate: u32) -> Option<f64> {
    let caps = DURATION.captures(value.trim())?;
    if let (Some(samples), true) = (caps.get(4), sample_rate > 0) {
        let samples: f64 = samples.as_str().parse().ok()?;
        return Some(samples / f64::from(sample_rate));
    }
    let hours: f64 = caps.get(1).map_or(Ok(0.0), |h| h.as_str().parse()).ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Parse a `soxi` bit rate (`1.41M`, `320k`, or a `Bit Rate : ...` line) into kbps
pub fn parse_bit_rate_kbps(output: &str) -> Option<u32> {
    let value = output
        .lines()
        .find_map(|line| {
            SOXI_FIELD
                .captures(line)
                .filter(|c| &c[1] == "Bit Rate")
                .map(|c| c[2].to_string())
        })
        .unwrap_or_else(|| output.trim().to_string());

    let caps = RATE_VALUE.captures(&value)?;
    let number: f64 = caps[1].parse().ok()?;
    let kbps = match &caps[2] {
        "M" => number * 1000.0,
        "k" | "K" => number,
        _ => number / 1000.0,
    };
    Some(kbps.round() as u32)
}
