//! Structural and heuristic checks over probe and validator output

use serde::{Deserialize, Serialize};

use crate::patterns::{
    MP2_FILE_SIGNATURE, MP3VAL_ERROR, MP3VAL_IGNORE, MP3VAL_WARNING, MP3_FILE_SIGNATURE,
};
use crate::probe::MpegHeader;

use super::constraint::MpegConstraints;
use super::report::{Attribute, ValidationReport};

pub const NOT_MPEG_AUDIO: &str = "is not a valid mpeg audio file.";
pub const MP3VAL_WARNING_MESSAGE: &str =
    "is not a valid mpeg file, there were serious warnings when validating the audio.";
pub const MP3VAL_ERROR_MESSAGE: &str =
    "is not a valid mpeg file, there were errors when validating the audio.";

/// Expected kind of MPEG audio file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTarget {
    Mp2,
    Mp3,
    #[default]
    Any,
}

impl ValidationTarget {
    pub fn name(&self) -> &'static str {
        match self {
            ValidationTarget::Mp2 => "mp2",
            ValidationTarget::Mp3 => "mp3",
            ValidationTarget::Any => "mpeg",
        }
    }

    /// Whether `file` output carries this target's signature
    pub fn matches(&self, file_output: &str) -> bool {
        match self {
            ValidationTarget::Mp2 => MP2_FILE_SIGNATURE.is_match(file_output),
            ValidationTarget::Mp3 => MP3_FILE_SIGNATURE.is_match(file_output),
            ValidationTarget::Any => {
                MP2_FILE_SIGNATURE.is_match(file_output) || MP3_FILE_SIGNATURE.is_match(file_output)
            }
        }
    }
}

impl std::str::FromStr for ValidationTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp2" => Ok(ValidationTarget::Mp2),
            "mp3" => Ok(ValidationTarget::Mp3),
            "any" | "mpeg" => Ok(ValidationTarget::Any),
            other => Err(format!("unknown validation target '{}'", other)),
        }
    }
}

/// What `file` thinks the file is: the text after the last `: ` on its first line
fn detected_type(file_output: &str) -> &str {
    let first = file_output.trim().lines().next().unwrap_or("");
    first.rsplit_once(": ").map(|(_, kind)| kind).unwrap_or(first)
}

/// File the format classification finding, if any
pub fn check_signature(target: ValidationTarget, file_output: &str, report: &mut ValidationReport) {
    tracing::debug!("'file' response: {}", file_output.trim());
    if !target.matches(file_output) {
        report.add(
            Attribute::File,
            format!(
                "is not a valid {} file, we think it's a '{}'",
                target.name(),
                detected_type(file_output)
            ),
        );
    }
}

/// Compare a parsed header against the constraints
pub fn check_header(header: &MpegHeader, constraints: &MpegConstraints, report: &mut ValidationReport) {
    if let Some(version) = constraints.version {
        let actual = header.version.major();
        if actual != version {
            report.add(
                Attribute::Version,
                format!("must be mpeg version {}, but audio version is {}", version, actual),
            );
        }
    }

    if let Some(layer) = constraints.layer {
        if header.layer != layer {
            report.add(
                Attribute::Layer,
                format!("must be mpeg layer {}, but audio layer is {}", layer, header.layer),
            );
        }
    }

    if let Some(modes) = &constraints.channel_mode {
        if !modes.iter().any(|m| *m == header.channel_mode) {
            report.add(
                Attribute::ChannelMode,
                format!("channel mode must be one of ({})", to_sentence(modes)),
            );
        }
    }

    let channels = header.channels();

    if let Some(expected) = constraints.channels {
        if channels != expected {
            report.add(
                Attribute::Channels,
                format!("must have channel count of {}, but audio is {}", expected, channels),
            );
        }
    }

    if let Some(threshold) = constraints.sample_rate {
        let actual = i64::from(header.sample_rate);
        if !threshold.check(actual) {
            report.add(
                Attribute::SampleRate,
                format!("sample rate should be {}, but is {}", threshold, actual),
            );
        }
    }

    if let Some(threshold) = constraints.bit_rate {
        let actual = i64::from(header.bit_rate);
        if !threshold.check(actual) {
            report.add(
                Attribute::BitRate,
                format!("bit rate should be {}, but is {}", threshold, actual),
            );
        }
    }

    if let Some(threshold) = constraints.per_channel_bit_rate {
        let actual = i64::from(header.bit_rate / channels);
        if !threshold.check(actual) {
            report.add(
                Attribute::PerChannelBitRate,
                format!(
                    "per channel bit rate should be {}, but is {}, and channels = {}",
                    threshold, actual, channels
                ),
            );
        }
    }
}

/// Read `mp3val` output: at most one warning finding and one error finding
pub fn classify_mp3val_output(output: &str, report: &mut ValidationReport) {
    let mut warned = false;
    let mut errored = false;

    for line in output.lines() {
        if MP3VAL_IGNORE.is_match(line) {
            continue;
        }
        if MP3VAL_WARNING.is_match(line) {
            if !warned {
                report.add(Attribute::File, MP3VAL_WARNING_MESSAGE);
                warned = true;
            }
        } else if MP3VAL_ERROR.is_match(line) && !errored {
            report.add(Attribute::File, MP3VAL_ERROR_MESSAGE);
            errored = true;
        }
    }
}

/// "a", "a and b", "a, b, and c"
pub fn to_sentence(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}
