//! Request orchestration
//!
//! Each operation checks its inputs, resolves parameters, runs the external
//! tools and interprets what they print. The [`Orchestrator`] holds only
//! read-only state and can be shared across tasks.

pub mod analysis;
pub mod edit;
pub mod encode;
pub mod registry;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{CartFields, CartOptions};
use crate::config::{Config, Tool};
use crate::error::{AudioError, Result};
use crate::probe::{parse_bit_rate_kbps, AudioInfo, MpegHeader, SourceFormatInfo};
use crate::process::{CommandResult, ProcessRunner};
use crate::temp::TempFiles;
use crate::transcode::command::{self, quote_path};

pub use registry::{Decoder, InfoReader, OperationRegistry};

/// Default output channels for the generic decoder
pub const DEFAULT_DECODE_CHANNELS: u16 = 2;

/// Default output sample rate for the generic decoder
pub const DEFAULT_DECODE_SAMPLE_RATE: u32 = 44100;

/// Container format assumed when the extension is unusable
pub const FALLBACK_INPUT_FORMAT: &str = "mov";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Input format, overriding the file extension
    pub source_format: Option<String>,
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<Config>,
    runner: ProcessRunner,
    temp: TempFiles,
    registry: OperationRegistry,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let runner = ProcessRunner::from_config(&config.process);
        let temp = TempFiles::new(config.tmp_dir.clone());
        Self {
            config: Arc::new(config),
            runner,
            temp,
            registry: OperationRegistry::standard(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub(crate) fn bin(&self, tool: Tool) -> String {
        self.config.bin(tool)
    }

    /// Fail unless `path` exists and is non-empty
    pub async fn check_local_file(&self, path: &Path) -> Result<()> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(AudioError::MissingOrEmptyFile(path.to_path_buf())),
        }
    }

    async fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    /// Run a processing command with the configured priority and timeout
    pub(crate) async fn run(&self, command: &str) -> Result<CommandResult> {
        self.runner.run(command).await
    }

    /// Run a quick metadata probe: no `nice`, no exit-status echo
    pub(crate) async fn probe(&self, command: &str) -> Result<CommandResult> {
        self.runner.run_with(command, &self.runner.options().probe()).await
    }

    // Info family

    /// Full format facts from `soxi`
    pub async fn source_format(&self, path: &Path) -> Result<SourceFormatInfo> {
        self.check_local_file(path).await?;
        let command = format!("{} -V0 {}", self.bin(Tool::Soxi), quote_path(path));
        let result = self.probe(&command).await?;
        let format = SourceFormatInfo::parse(&result.stdout)?;
        tracing::debug!("source format of {}: {:?}", path.display(), format);
        Ok(format)
    }

    /// Single `soxi` field, e.g. `D` for duration
    pub async fn audio_file_info(&self, path: &Path, flag: char) -> Result<String> {
        self.check_local_file(path).await?;
        let command = format!("{} -V0 -{} {}", self.bin(Tool::Soxi), flag, quote_path(path));
        let result = self.probe(&command).await?;
        Ok(result.stdout.trim().to_string())
    }

    pub async fn audio_file_duration(&self, path: &Path) -> Result<f64> {
        let value = self.audio_file_info(path, 'D').await?;
        value
            .parse()
            .map_err(|_| AudioError::Probe(format!("unreadable duration '{}'", value)))
    }

    pub async fn audio_file_channels(&self, path: &Path) -> Result<u16> {
        let value = self.audio_file_info(path, 'c').await?;
        value
            .parse()
            .map_err(|_| AudioError::Probe(format!("unreadable channel count '{}'", value)))
    }

    pub async fn audio_file_sample_rate(&self, path: &Path) -> Result<u32> {
        let value = self.audio_file_info(path, 'r').await?;
        value
            .parse()
            .map_err(|_| AudioError::Probe(format!("unreadable sample rate '{}'", value)))
    }

    /// Bit rate in kbps
    pub async fn audio_file_bit_rate(&self, path: &Path) -> Result<u32> {
        let value = self.audio_file_info(path, 'B').await?;
        parse_bit_rate_kbps(&value)
            .ok_or_else(|| AudioError::Probe(format!("unreadable bit rate '{}'", value)))
    }

    /// Duration of an MPEG stream; 0 when the probe cannot tell
    async fn mpeg_duration(&self, path: &Path) -> Result<f64> {
        match self.audio_file_duration(path).await {
            Ok(duration) => Ok(duration),
            Err(AudioError::Probe(reason)) => {
                tracing::warn!("no duration for {}: {}", path.display(), reason);
                Ok(0.0)
            }
            Err(e) => Err(e),
        }
    }

    /// `file` description of a path
    pub(crate) async fn file_type(&self, path: &Path) -> Result<String> {
        let command = format!("{} {}", self.bin(Tool::File), quote_path(path));
        Ok(self.probe(&command).await?.stdout)
    }

    /// Info record for whatever the extension says the file is
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), path = %path.display()))]
    pub async fn info(&self, path: &Path) -> Result<AudioInfo> {
        match self.registry.info_reader_for(&registry::format_key(path)) {
            InfoReader::Mpeg => self.info_for_mpeg(path).await,
            InfoReader::Wav => self.info_for_wav(path).await,
            InfoReader::Generic => self.info_for_audio(path).await,
        }
    }

    pub async fn info_for_wav(&self, path: &Path) -> Result<AudioInfo> {
        let format = self.source_format(path).await?;
        Ok(AudioInfo::for_wav(self.file_size(path).await?, &format))
    }

    pub async fn info_for_mpeg(&self, path: &Path) -> Result<AudioInfo> {
        self.check_local_file(path).await?;
        let description = self.file_type(path).await?;
        let header = MpegHeader::parse(&description).ok_or_else(|| {
            AudioError::Probe(format!("not mpeg audio: {}", description.trim()))
        })?;
        let duration = self.mpeg_duration(path).await?;
        Ok(AudioInfo::for_mpeg(self.file_size(path).await?, &header, duration))
    }

    pub async fn info_for_audio(&self, path: &Path) -> Result<AudioInfo> {
        let format = self.source_format(path).await?;
        let command = format!("{} --brief --mime-type {}", self.bin(Tool::File), quote_path(path));
        let content_type = self.probe(&command).await?.stdout.trim().to_string();
        let bit_rate = self.audio_file_bit_rate(path).await?;
        Ok(AudioInfo::for_audio(
            self.file_size(path).await?,
            content_type,
            &format,
            bit_rate,
        ))
    }

    // Decode family

    /// Decode any supported source into a PCM wav
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn decode_to_wav(&self, src: &Path, dst: &Path, options: &DecodeOptions) -> Result<()> {
        tracing::info!("decode_to_wav: {} -> {}, {:?}", src.display(), dst.display(), options);
        self.check_local_file(src).await?;

        let extension = registry::format_key(src);
        let key = options.source_format.as_deref().unwrap_or(&extension);
        let command = match self.registry.decoder_for(key) {
            Decoder::Madplay => command::madplay_decode_command(&self.config, src, dst),
            Decoder::Flac => command::flac_decode_command(&self.config, src, dst),
            Decoder::Ffmpeg => {
                let input_format = match options.source_format.as_deref() {
                    Some(format) => Some(format),
                    None if extension.chars().count() != 3 => Some(FALLBACK_INPUT_FORMAT),
                    None => None,
                };
                command::ffmpeg_decode_command(
                    &self.config,
                    src,
                    dst,
                    input_format,
                    options.channels.unwrap_or(DEFAULT_DECODE_CHANNELS),
                    options.sample_rate.unwrap_or(DEFAULT_DECODE_SAMPLE_RATE),
                )
            }
        };

        self.run(&command).await?;
        self.check_local_file(dst).await
    }

    /// Cart chunk values for an audio file
    pub fn cart_fields(&self, audio_path: &Path, options: &CartOptions) -> Result<CartFields> {
        let fields = CartFields::from_options(audio_path, options)?;
        tracing::debug!("cart fields for {}: {:?}", audio_path.display(), fields);
        Ok(fields)
    }
}
