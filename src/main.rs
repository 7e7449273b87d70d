//! Broadcast audio transcoder
//!
//! Command-line front end: each subcommand maps onto one orchestrator
//! operation and prints its result as JSON.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use broadcast_transcoder::cart::CartOptions;
use broadcast_transcoder::config_file::{generate_default_config, ConfigFile};
use broadcast_transcoder::detect::scanner::{
    DEFAULT_SILENCE_MIN_DURATION, DEFAULT_SILENCE_THRESHOLD, DEFAULT_TONE_MIN_GAP,
    DEFAULT_TONE_THRESHOLD,
};
use broadcast_transcoder::detect::DetectionPolicy;
use broadcast_transcoder::orchestrator::edit::{DEFAULT_FADE_SECS, DEFAULT_NORMALIZE_LEVEL};
use broadcast_transcoder::orchestrator::DecodeOptions;
use broadcast_transcoder::transcode::{Codec, EncodeOptions};
use broadcast_transcoder::validate::{MpegConstraints, Threshold, ValidationTarget};
use broadcast_transcoder::{AudioError, Config, Orchestrator, Result};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "broadcast-transcoder";

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "broadcast-transcoder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a wav into mp2, mp3 or ogg
    Encode {
        /// Output codec: mp2, mp3 or ogg
        #[arg(long)]
        codec: Codec,
        src: PathBuf,
        dst: PathBuf,
        #[command(flatten)]
        options: EncodeArgs,
    },
    /// Decode any supported source to a 16-bit wav
    Decode {
        src: PathBuf,
        dst: PathBuf,
        /// Source format, overriding the file extension
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        channels: Option<u16>,
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Print basic audio information
    Info { path: PathBuf },
    /// Find ranges containing a tone
    Tone {
        path: PathBuf,
        /// Tone frequency in Hz
        #[arg(long)]
        frequency: u32,
        #[arg(long, default_value_t = DEFAULT_TONE_THRESHOLD)]
        threshold: f64,
        /// Longest gap bridged inside one range, in seconds
        #[arg(long, default_value_t = DEFAULT_TONE_MIN_GAP)]
        min_gap: f64,
    },
    /// Find ranges of silence
    Silence {
        path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SILENCE_THRESHOLD)]
        threshold: f64,
        /// Shortest reported silence, in seconds
        #[arg(long, default_value_t = DEFAULT_SILENCE_MIN_DURATION)]
        min_duration: f64,
    },
    /// Validate an MPEG audio file; exits 1 when there are findings
    Validate {
        path: PathBuf,
        /// Expected kind: mp2, mp3 or mpeg
        #[arg(long, default_value = "mpeg")]
        target: ValidationTarget,
        #[command(flatten)]
        constraints: ConstraintArgs,
    },
    /// Copy part of a wav
    Slice {
        src: PathBuf,
        out: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long)]
        length: f64,
    },
    /// Shorten a wav, fading out the end
    Cut {
        src: PathBuf,
        out: PathBuf,
        #[arg(long)]
        length: f64,
        #[arg(long, default_value_t = DEFAULT_FADE_SECS as f64)]
        fade: f64,
    },
    /// Join wavs end to end
    Concat {
        out: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Append part of a wav or mp3 to a wav
    Append {
        wav: PathBuf,
        append: PathBuf,
        out: PathBuf,
        /// Seconds of the appended source to use
        #[arg(long)]
        length: u64,
        #[arg(long, default_value_t = DEFAULT_FADE_SECS)]
        fade: u64,
    },
    /// Normalise the peak level of a wav
    Normalize {
        src: PathBuf,
        out: PathBuf,
        /// Target level in dB
        #[arg(long, default_value_t = DEFAULT_NORMALIZE_LEVEL, allow_hyphen_values = true)]
        level: i32,
    },
    /// Print cart chunk values for an audio file
    Cart {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        cut_id: Option<String>,
        /// Start date/time (RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`)
        #[arg(long)]
        start_at: Option<String>,
        #[arg(long)]
        end_at: Option<String>,
    },
    /// List tools that cannot be found; exits 1 when any are missing
    CheckTools,
    /// Write a default configuration file
    InitConfig {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(long)]
    sample_rate: Option<u32>,
    /// Total bit rate in kbps
    #[arg(long)]
    bit_rate: Option<u32>,
    #[arg(long)]
    per_channel_bit_rate: Option<u32>,
    /// Channel mode token, e.g. s, j, d, m, a
    #[arg(long)]
    channel_mode: Option<String>,
    #[arg(long)]
    protect: Option<bool>,
    #[arg(long)]
    copyright: Option<bool>,
    #[arg(long)]
    original: Option<bool>,
    /// De-emphasis: n, 5 or c
    #[arg(long)]
    emphasis: Option<String>,
    /// Output channels (ogg only)
    #[arg(long)]
    channels: Option<u16>,
}

impl From<EncodeArgs> for EncodeOptions {
    fn from(args: EncodeArgs) -> Self {
        Self {
            sample_rate: args.sample_rate,
            bit_rate: args.bit_rate,
            per_channel_bit_rate: args.per_channel_bit_rate,
            channel_mode: args.channel_mode,
            protect: args.protect,
            copyright: args.copyright,
            original: args.original,
            emphasis: args.emphasis,
            channels: args.channels,
        }
    }
}

#[derive(Args, Debug)]
struct ConstraintArgs {
    #[arg(long = "mpeg-version")]
    mpeg_version: Option<u32>,
    #[arg(long)]
    layer: Option<u32>,
    /// Accepted channel mode; repeat for several
    #[arg(long)]
    channel_mode: Vec<String>,
    #[arg(long)]
    channels: Option<u32>,
    /// Threshold such as `44100` or `"<= 48000"`
    #[arg(long, value_parser = parse_threshold)]
    sample_rate: Option<Threshold>,
    #[arg(long, value_parser = parse_threshold)]
    bit_rate: Option<Threshold>,
    #[arg(long, value_parser = parse_threshold)]
    per_channel_bit_rate: Option<Threshold>,
}

impl From<ConstraintArgs> for MpegConstraints {
    fn from(args: ConstraintArgs) -> Self {
        Self {
            version: args.mpeg_version,
            layer: args.layer,
            channel_mode: (!args.channel_mode.is_empty()).then_some(args.channel_mode),
            channels: args.channels,
            sample_rate: args.sample_rate,
            bit_rate: args.bit_rate,
            per_channel_bit_rate: args.per_channel_bit_rate,
        }
    }
}

fn parse_threshold(value: &str) -> std::result::Result<Threshold, String> {
    Ok(Threshold::parse(value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = load_config_file(cli.config.as_deref())?;
    let json_logs = cli.json_logs || config_file.as_ref().is_some_and(|cf| cf.json_logging());
    let config = config_file
        .map(ConfigFile::into_config)
        .unwrap_or_default();

    init_logging(&config.log_level, json_logs);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::debug!("Configuration loaded: {:?}", config);

    let code = run(cli.command, config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Explicit `--config` must load; the implicit default file may be absent
fn load_config_file(path: Option<&Path>) -> Result<Option<ConfigFile>> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    if !explicit && !path.exists() {
        return Ok(None);
    }
    ConfigFile::from_file(path).map(Some).map_err(|e| {
        AudioError::Config(format!("failed to load config file {}: {}", path.display(), e))
    })
}

/// Run one subcommand; returns the process exit code
async fn run(command: Command, config: Config) -> Result<i32> {
    match command {
        Command::CheckTools => {
            let missing: Vec<&str> = config
                .missing_tools()
                .iter()
                .map(|tool| tool.default_name())
                .collect();
            for tool in &missing {
                tracing::warn!("Tool not found: {}", tool);
            }
            print_json(&missing)?;
            return Ok(if missing.is_empty() { 0 } else { 1 });
        }
        Command::InitConfig { path } => {
            generate_default_config(&path).map_err(|e| {
                AudioError::Config(format!("failed to write {}: {}", path.display(), e))
            })?;
            tracing::info!("Default configuration written to {}", path.display());
            return Ok(0);
        }
        _ => {}
    }

    let orchestrator = Orchestrator::new(config);

    match command {
        Command::Encode {
            codec,
            src,
            dst,
            options,
        } => {
            let params = orchestrator
                .encode(codec, &src, &dst, &options.into())
                .await?;
            print_json(&params)?;
        }
        Command::Decode {
            src,
            dst,
            format,
            channels,
            sample_rate,
        } => {
            let options = DecodeOptions {
                source_format: format,
                channels,
                sample_rate,
            };
            orchestrator.decode_to_wav(&src, &dst, &options).await?;
            print_json(&orchestrator.info_for_wav(&dst).await?)?;
        }
        Command::Info { path } => print_json(&orchestrator.info(&path).await?)?,
        Command::Tone {
            path,
            frequency,
            threshold,
            min_gap,
        } => {
            let policy = DetectionPolicy::Burst { threshold, min_gap };
            print_json(&orchestrator.tone_detect(&path, frequency, policy).await?)?;
        }
        Command::Silence {
            path,
            threshold,
            min_duration,
        } => {
            let policy = DetectionPolicy::Silence {
                threshold,
                min_duration,
            };
            print_json(&orchestrator.silence_detect(&path, policy).await?)?;
        }
        Command::Validate {
            path,
            target,
            constraints,
        } => {
            let outcome = orchestrator
                .validate_mpeg(&path, target, &constraints.into())
                .await?;
            print_json(&outcome)?;
            if !outcome.is_valid() {
                return Ok(1);
            }
        }
        Command::Slice {
            src,
            out,
            start,
            length,
        } => orchestrator.slice_wav(&src, &out, start, length).await?,
        Command::Cut {
            src,
            out,
            length,
            fade,
        } => orchestrator.cut_wav(&src, &out, length, fade).await?,
        Command::Concat { out, inputs } => orchestrator.concat_wavs(&inputs, &out).await?,
        Command::Append {
            wav,
            append,
            out,
            length,
            fade,
        } => {
            if is_mpeg(&append) {
                orchestrator
                    .append_mp3_to_wav(&wav, &append, &out, length, fade)
                    .await?
            } else {
                orchestrator
                    .append_wav_to_wav(&wav, &append, &out, length, fade)
                    .await?
            }
        }
        Command::Normalize { src, out, level } => {
            orchestrator.normalize_wav(&src, &out, level).await?
        }
        Command::Cart {
            path,
            title,
            artist,
            cut_id,
            start_at,
            end_at,
        } => {
            let options = CartOptions {
                title,
                artist,
                cut_id,
                start_at,
                end_at,
                ..Default::default()
            };
            print_json(&orchestrator.cart_fields(&path, &options)?)?;
        }
        Command::CheckTools | Command::InitConfig { .. } => {}
    }
    Ok(0)
}

fn is_mpeg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("mp3") || ext.eq_ignore_ascii_case("mp2"))
        .unwrap_or(false)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", text);
    Ok(())
}

/// Initialize logging with tracing; logs go to stderr so stdout stays JSON
fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("broadcast_transcoder={}", level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
