//! Text patterns recognised in external tool output
//!
//! These are load-bearing: they decide success and failure of every tool run.

use regex::Regex;
use std::sync::LazyLock;

/// `file` output accepted as MPEG-1 layer II audio
pub static MP2_FILE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\S+: (MP2|MPEG ADTS, layer II, v1), \S+ kBits, \S+ kHz, (JStereo|Stereo|Mono|2x Monaural|Dual-Ch|Monaural|JntStereo)",
    )
    .expect("valid mp2 signature pattern")
});

/// `file` output accepted as MPEG layer III audio
pub static MP3_FILE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\S+: MPEG ADTS, layer III, v(2\.5|2|1),\s+\S+ (kBits|kbps), \S+ kHz, (JStereo|Stereo|Mono|2x Monaural|Dual-Ch|Monaural|JntStereo)",
    )
    .expect("valid mp3 signature pattern")
});

/// Header fields inside `file` output for an MPEG audio stream
pub static MPEG_HEADER_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"MPEG ADTS, layer (I{1,3}), v(2\.5|2|1),\s+(\d+) (?:kBits|kbps), ([\d.]+) kHz, (JStereo|JntStereo|Stereo|2x Monaural|Dual-Ch|Monaural|Mono)",
    )
    .expect("valid mpeg header pattern")
});

/// Short-form `file` output for layer II streams: `MP2, 128 kBits, 44.1 kHz, Stereo`
pub static MP2_SHORT_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"MP2, (\d+) kBits, ([\d.]+) kHz, (JStereo|JntStereo|Stereo|2x Monaural|Dual-Ch|Monaural|Mono)",
    )
    .expect("valid mp2 short pattern")
});

pub static MP3VAL_WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"WARNING").expect("valid mp3val warning pattern"));

pub static MP3VAL_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ERROR").expect("valid mp3val error pattern"));

/// mp3val lines that are informational even when tagged WARNING/ERROR
pub static MP3VAL_IGNORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(^Done!|Non-layer-III frame encountered. See related INFO message for details.|No supported tags in the file|It seems that file is truncated or there is garbage at the end of the file|MPEG stream error, resynchronized successfully)",
    )
    .expect("valid mp3val ignore pattern")
});

/// Trailing exit-status line printed by a successful encoder run
pub static ENCODER_SUCCESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*0\s*$").expect("valid encoder success pattern"));

pub static LAME_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fatal error").expect("valid lame error pattern"));

pub static SOX_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"error:").expect("valid sox error pattern"));

pub static SOX_WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWARN\b").expect("valid sox warning pattern"));
