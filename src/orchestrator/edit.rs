//! WAV editing with sox: slice, cut with fade, concatenate, append, normalise

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use uuid::Uuid;

use crate::config::Tool;
use crate::error::{AudioError, Result, ToolError};
use crate::process::ToolVerdict;
use crate::transcode::command::quote_path;

use super::Orchestrator;

/// Default fade applied by cut and append, in seconds
pub const DEFAULT_FADE_SECS: u64 = 5;

/// Default normalisation level in dB
pub const DEFAULT_NORMALIZE_LEVEL: i32 = -9;

impl Orchestrator {
    /// Run a sox command line and fail on any sox error output
    async fn run_sox(&self, operation: &str, command: &str) -> Result<()> {
        let result = self.run(command).await?;
        ToolVerdict::sox(&result).into_result(|output| ToolError::Sox {
            operation: operation.to_string(),
            output,
            command: command.to_string(),
        })?;
        Ok(())
    }

    /// Copy `length` seconds starting at `start` into `out`
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn slice_wav(&self, src: &Path, out: &Path, start: f64, length: f64) -> Result<()> {
        tracing::info!("slice_wav: {}, start:{}, length:{}", src.display(), start, length);
        self.check_local_file(src).await?;

        let info = self.info_for_wav(src).await?;
        tracing::debug!("slice_wav: wav_info:{:?}", info);

        let command = format!(
            "{sox} -t wav {src} -t wav {out} trim {start} {length}",
            sox = self.bin(Tool::Sox),
            src = quote_path(src),
            out = quote_path(out),
        );
        self.run_sox("slice_wav", &command).await?;
        self.check_local_file(out).await
    }

    /// Keep the first `length` seconds, fading out over the last `fade` seconds
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn cut_wav(&self, src: &Path, out: &Path, length: f64, fade: f64) -> Result<()> {
        tracing::info!("cut_wav: {}, length:{}, fade:{}", src.display(), length, fade);
        self.check_local_file(src).await?;

        let info = self.info_for_wav(src).await?;
        tracing::debug!("cut_wav: wav_info:{:?}", info);

        let available = info.length.trunc();
        let new_length = available.min(length);
        let fade_length = available.min(fade);
        let channels = info.channels();
        let sox = self.bin(Tool::Sox);

        let command = format!(
            "{sox} -t wav {src} -t raw -s -b 16 -c {channels} - trim 0 {new_length} | \
             {sox} -t raw -r {rate} -s -b 16 -c {channels} - -t wav {out} fade h 0 {new_length} {fade_length}",
            src = quote_path(src),
            out = quote_path(out),
            rate = info.sample_rate,
        );
        self.run_sox("cut_wav", &command).await?;
        self.check_local_file(out).await
    }

    /// Join wavs end to end; inputs that differ from the first in channels or
    /// sample rate are converted first
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), inputs = inputs.len()))]
    pub async fn concat_wavs(&self, inputs: &[PathBuf], out: &Path) -> Result<()> {
        let first = inputs
            .first()
            .ok_or_else(|| AudioError::InvalidArgument("nothing to concatenate".to_string()))?;
        tracing::info!("concat_wavs: {} files -> {}", inputs.len(), out.display());

        let first_info = self.info_for_wav(first).await?;
        let channels = first_info.channels();
        let sample_rate = first_info.sample_rate;
        let sox = self.bin(Tool::Sox);

        // converted copies live until the final command has run
        let mut converted: Vec<TempPath> = Vec::new();
        let mut sources = String::new();

        for input in inputs {
            let info = self.info_for_wav(input).await?;
            let concat_path = if info.channels() != channels || info.sample_rate != sample_rate {
                let temp = self.temp.create_path(input)?;
                let command = format!(
                    "{sox} -t wav {src} -t wav -c {channels} -r {sample_rate} {dst}",
                    src = quote_path(input),
                    dst = quote_path(&temp),
                );
                self.run_sox("concat_wavs", &command).await?;
                let path = temp.to_path_buf();
                converted.push(temp);
                path
            } else {
                input.clone()
            };
            sources.push_str(&format!("-t wav {} ", quote_path(&concat_path)));
        }

        let command = format!("{sox} {sources}-t wav {}", quote_path(out));
        self.run_sox("concat_wavs", &command).await?;
        self.check_local_file(out).await
    }

    /// Append up to `add_length` seconds of another wav, faded and preceded by
    /// one second of silence
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), wav = %wav.display()))]
    pub async fn append_wav_to_wav(
        &self,
        wav: &Path,
        append: &Path,
        out: &Path,
        add_length: u64,
        fade: u64,
    ) -> Result<()> {
        tracing::info!("append_wav_to_wav: {} + {}, add_length:{}", wav.display(), append.display(), add_length);
        self.check_local_file(wav).await?;
        let append_info = self.info_for_wav(append).await?;
        let (append_length, fade_length) = append_lengths(append_info.length, add_length, fade)?;

        let wav_info = self.info_for_wav(wav).await?;
        let channels = wav_info.channels();
        let rate = wav_info.sample_rate;
        let sox = self.bin(Tool::Sox);

        let segment = self.temp.create_path(append)?;
        let command = format!(
            "{sox} -t wav {src} -t raw -s -b 16 -c {channels} - trim 0 {append_length} | \
             {sox} -t raw -r {rate} -s -b 16 -c {channels} - -t raw - fade h 0 {append_length} {fade_length} | \
             {sox} -t raw -r {rate} -s -b 16 -c {channels} - -t wav {dst} pad 1 0",
            src = quote_path(append),
            dst = quote_path(&segment),
        );
        self.run_sox("append_wav_to_wav", &command).await?;

        self.join_segment("append_wav_to_wav", wav, &segment, out).await
    }

    /// Same as [`Orchestrator::append_wav_to_wav`] with an MPEG source decoded by madplay
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), wav = %wav.display()))]
    pub async fn append_mp3_to_wav(
        &self,
        wav: &Path,
        mp3: &Path,
        out: &Path,
        add_length: u64,
        fade: u64,
    ) -> Result<()> {
        tracing::info!("append_mp3_to_wav: {} + {}, add_length:{}", wav.display(), mp3.display(), add_length);
        self.check_local_file(wav).await?;
        let mp3_info = self.info_for_mpeg(mp3).await?;
        let (append_length, fade_length) = append_lengths(mp3_info.length, add_length, fade)?;

        let wav_info = self.info_for_wav(wav).await?;
        let channels = wav_info.channels();
        let rate = wav_info.sample_rate;
        let sox = self.bin(Tool::Sox);

        let segment = self.temp.create_path(mp3)?;
        let command = format!(
            "{madplay} -q -o wave:- {src} - | \
             {sox} -t wav - -t raw -s -b 16 -c {channels} - trim 0 {append_length} | \
             {sox} -t raw -r {rate} -s -b 16 -c {channels} - -t wav - fade h 0 {append_length} {fade_length} | \
             {sox} -t wav - -t wav {dst} pad 1 0",
            madplay = self.bin(Tool::Madplay),
            src = quote_path(mp3),
            dst = quote_path(&segment),
        );
        self.run_sox("append_mp3_to_wav", &command).await?;

        self.join_segment("append_mp3_to_wav", wav, &segment, out).await
    }

    async fn join_segment(&self, operation: &str, wav: &Path, segment: &Path, out: &Path) -> Result<()> {
        let command = format!(
            "{} -t wav {} -t wav {} -t wav {}",
            self.bin(Tool::Sox),
            quote_path(wav),
            quote_path(segment),
            quote_path(out)
        );
        self.run_sox(operation, &command).await?;
        self.check_local_file(out).await
    }

    /// Normalise peak level to `level` dB
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn normalize_wav(&self, src: &Path, out: &Path, level: i32) -> Result<()> {
        tracing::info!("normalize_wav: {}, level:{}", src.display(), level);
        self.check_local_file(src).await?;

        let command = format!(
            "{} -t wav {} -t wav {} gain -n {}",
            self.bin(Tool::Sox),
            quote_path(src),
            quote_path(out),
            level
        );
        self.run_sox("normalize_wav", &command).await?;
        self.check_local_file(out).await
    }
}

/// Trim and fade lengths for an appended segment of `available` seconds
fn append_lengths(available: f64, add_length: u64, fade: u64) -> Result<(u64, u64)> {
    let available = available.max(0.0).trunc() as u64;
    if available < add_length {
        return Err(AudioError::InsufficientSourceLength {
            available,
            requested: add_length,
        });
    }
    Ok((
        available.min(add_length.saturating_sub(1)),
        available.min(fade),
    ))
}
