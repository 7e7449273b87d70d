//! Tone / silence detection and MPEG validation

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::Tool;
use crate::detect::{detect_ranges_from_reader, DetectionPolicy, EnergyRange};
use crate::error::{AudioError, Result, ToolError};
use crate::probe::{AudioInfo, MpegHeader};
use crate::process::ToolVerdict;
use crate::transcode::command::quote_path;
use crate::validate::engine::NOT_MPEG_AUDIO;
use crate::validate::{
    check_header, check_signature, classify_mp3val_output, Attribute, MpegConstraints,
    ValidationOutcome, ValidationReport, ValidationTarget,
};

use super::Orchestrator;

/// Path of the sample dump for `path`: the source name plus `.dat`
fn dump_base(path: &Path) -> PathBuf {
    let mut base = path.as_os_str().to_os_string();
    base.push(".dat");
    PathBuf::from(base)
}

impl Orchestrator {
    /// Ranges where a `tone` Hz signal is present
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), path = %path.display(), tone = tone))]
    pub async fn tone_detect(
        &self,
        path: &Path,
        tone: u32,
        policy: DetectionPolicy,
    ) -> Result<Vec<EnergyRange>> {
        tracing::info!("tone_detect: {}, {} Hz, {:?}", path.display(), tone, policy);
        let filter = format!("channels 1 rate 200 bandpass {} 3 gain 6", tone);
        self.detect(path, &filter, policy, "tone_detect").await
    }

    /// Ranges of silence
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), path = %path.display()))]
    pub async fn silence_detect(
        &self,
        path: &Path,
        policy: DetectionPolicy,
    ) -> Result<Vec<EnergyRange>> {
        tracing::info!("silence_detect: {}, {:?}", path.display(), policy);
        self.detect(path, "channels 1 rate 1000 norm", policy, "silence_detect")
            .await
    }

    /// Dump samples through a sox effect chain and scan the dump
    async fn detect(
        &self,
        path: &Path,
        effects: &str,
        policy: DetectionPolicy,
        operation: &str,
    ) -> Result<Vec<EnergyRange>> {
        self.check_local_file(path).await?;

        let dump = self.temp.create_path(&dump_base(path))?;
        let command = format!(
            "{} {} {} {}",
            self.bin(Tool::Sox),
            quote_path(path),
            quote_path(&dump),
            effects
        );
        let result = self.run(&command).await?;
        ToolVerdict::sox(&result).into_result(|output| ToolError::Sox {
            operation: operation.to_string(),
            output,
            command: command.clone(),
        })?;

        let dump_path = dump.to_path_buf();
        let ranges = tokio::task::spawn_blocking(move || -> Result<Vec<EnergyRange>> {
            let reader = BufReader::new(File::open(&dump_path)?);
            detect_ranges_from_reader(reader, policy)
        })
        .await
        .map_err(|e| AudioError::Io(std::io::Error::other(e)))??;

        tracing::debug!("{}: {} ranges", operation, ranges.len());
        Ok(ranges)
    }

    /// Check an MPEG audio file's type, header and stream
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), path = %path.display()))]
    pub async fn validate_mpeg(
        &self,
        path: &Path,
        target: ValidationTarget,
        constraints: &MpegConstraints,
    ) -> Result<ValidationOutcome> {
        tracing::info!("validate_mpeg: {}, {:?}, {:?}", path.display(), target, constraints);
        self.check_local_file(path).await?;

        let mut report = ValidationReport::new();

        let description = self.file_type(path).await?;
        check_signature(target, &description, &mut report);

        let info = match MpegHeader::parse(&description) {
            Some(header) => {
                check_header(&header, constraints, &mut report);
                let duration = self.mpeg_duration(path).await?;
                Some(AudioInfo::for_mpeg(self.file_size(path).await?, &header, duration))
            }
            None => {
                report.add(Attribute::File, NOT_MPEG_AUDIO);
                None
            }
        };

        let command = format!("{} -si {}", self.bin(Tool::Mp3val), quote_path(path));
        let result = self
            .runner
            .run_with(&command, &self.runner.options().without_exit_status())
            .await?;
        if result.stdout.trim().is_empty() && result.exit_code != 0 {
            return Err(ToolError::ValidatorFatal {
                tool: "mp3val".to_string(),
                output: result.stderr,
            }
            .into());
        }
        classify_mp3val_output(&result.stdout, &mut report);

        if !report.is_valid() {
            tracing::info!("validate_mpeg: {} findings for {}", report.len(), path.display());
        }
        Ok(ValidationOutcome { report, info })
    }
}
