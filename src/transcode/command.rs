//! Encoder and decoder command lines

use std::path::Path;

use crate::config::{Config, Tool};
use crate::probe::SourceFormatInfo;

use super::planner::{mp2_input_sample_size, Mp2HeaderFlags, ResolvedParameters};

/// Single-quote a value for `sh`, escaping embedded quotes
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

/// `[sox ... | ]twolame ...`
pub fn mp2_command(
    config: &Config,
    src: &Path,
    dst: &Path,
    source: &SourceFormatInfo,
    params: &ResolvedParameters,
    flags: &Mp2HeaderFlags,
) -> String {
    let mut prefix = String::new();
    let mut input = quote_path(src);
    let mut args: Vec<String> = vec![config.bin(Tool::Twolame), "-t".into(), "0".into()];

    if params.resample {
        prefix = format!(
            "{} {} -t raw -r {} - | ",
            config.bin(Tool::Sox),
            quote_path(src),
            params.sample_rate
        );
        input = "-".to_string();
        args.push("--raw-input".into());
    }

    args.extend([
        "--samplerate".to_string(),
        params.sample_rate.to_string(),
        "--samplesize".to_string(),
        mp2_input_sample_size(source).to_string(),
        "--channels".to_string(),
        source.channel_count.to_string(),
        "--mode".to_string(),
        params.channel_mode.to_string(),
        "--bitrate".to_string(),
        params.bit_rate.to_string(),
    ]);
    if params.downmix {
        args.push("--downmix".into());
    }
    if flags.protect {
        args.push("--protect".into());
    }
    if flags.copyright {
        args.push("--copyright".into());
    }
    let original = if flags.original {
        "--original"
    } else {
        "--non-original"
    };
    args.push(original.into());
    args.push("--deemphasis".into());
    args.push(flags.emphasis.into());
    args.push(input);
    args.push(quote_path(dst));

    format!("{}{}", prefix, args.join(" "))
}

/// `sox ... | lame ...`
pub fn mp3_command(config: &Config, src: &Path, dst: &Path, params: &ResolvedParameters) -> String {
    let mut sox = vec![config.bin(Tool::Sox), quote_path(src), "-t".into(), "wav".into()];
    if params.resample {
        sox.push(format!("-r {}", params.sample_rate));
    }
    if params.downmix {
        sox.push("-c 1".into());
    }
    sox.push("-".into());

    format!(
        "{} | {} -S -m {} --cbr -b {} - {}",
        sox.join(" "),
        config.bin(Tool::Lame),
        params.channel_mode,
        params.bit_rate,
        quote_path(dst)
    )
}

/// `ffmpeg ... -acodec libvorbis ...`
pub fn ogg_command(config: &Config, src: &Path, dst: &Path, params: &ResolvedParameters) -> String {
    format!(
        "{} -nostats -loglevel warning -vn -i {} -acodec libvorbis -ac {} -ar {} -ab {}k -y -f ogg {}",
        config.bin(Tool::Ffmpeg),
        quote_path(src),
        params.channel_count,
        params.sample_rate,
        params.bit_rate,
        quote_path(dst)
    )
}

pub fn madplay_decode_command(config: &Config, src: &Path, wav: &Path) -> String {
    format!(
        "{} -Q -i --output=wave:{} {}",
        config.bin(Tool::Madplay),
        quote_path(wav),
        quote_path(src)
    )
}

pub fn flac_decode_command(config: &Config, src: &Path, wav: &Path) -> String {
    format!(
        "{} -s -f --decode {} --output-name={}",
        config.bin(Tool::Flac),
        quote_path(src),
        quote_path(wav)
    )
}

/// Generic decode through ffmpeg to 16-bit PCM wav
pub fn ffmpeg_decode_command(
    config: &Config,
    src: &Path,
    wav: &Path,
    input_format: Option<&str>,
    channels: u16,
    sample_rate: u32,
) -> String {
    let format = input_format
        .map(|f| format!("-f {} ", shell_quote(f)))
        .unwrap_or_default();
    format!(
        "{} -nostats -loglevel warning {}-vn -i {} -acodec pcm_s16le -ac {} -ar {} -y -f wav {}",
        config.bin(Tool::Ffmpeg),
        format,
        quote_path(src),
        channels,
        sample_rate,
        quote_path(wav)
    )
}
