//! WAV to MP2 / MP3 / Ogg Vorbis encoding

use std::path::Path;

use uuid::Uuid;

use crate::error::{Result, ToolError};
use crate::process::ToolVerdict;
use crate::transcode::command;
use crate::transcode::{resolve, Codec, EncodeOptions, Mp2HeaderFlags, ResolvedParameters};

use super::Orchestrator;

impl Orchestrator {
    /// Encode a wav into MPEG-1 layer II with twolame
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn encode_mp2_from_wav(
        &self,
        src: &Path,
        dst: &Path,
        options: &EncodeOptions,
    ) -> Result<ResolvedParameters> {
        tracing::info!("encode_mp2_from_wav: {} -> {}, {:?}", src.display(), dst.display(), options);
        self.check_local_file(src).await?;

        let source = self.source_format(src).await?;
        let params = resolve(Codec::Mp2, &source, options);
        let flags = Mp2HeaderFlags::resolve(options);
        let command = command::mp2_command(&self.config, src, dst, &source, &params, &flags);

        let result = self.run(&command).await?;
        ToolVerdict::twolame(&result).into_result(|output| ToolError::Encode {
            tool: "twolame".to_string(),
            output,
        })?;

        self.check_local_file(dst).await?;
        Ok(params)
    }

    /// Encode a wav into MPEG layer III, piping sox into lame
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn encode_mp3_from_wav(
        &self,
        src: &Path,
        dst: &Path,
        options: &EncodeOptions,
    ) -> Result<ResolvedParameters> {
        tracing::info!("encode_mp3_from_wav: {} -> {}, {:?}", src.display(), dst.display(), options);
        self.check_local_file(src).await?;

        let source = self.source_format(src).await?;
        let params = resolve(Codec::Mp3, &source, options);
        let command = command::mp3_command(&self.config, src, dst, &params);

        // sox warns that the piped wav header length is wrong; lame ignores it
        let result = self.run(&command).await?;
        ToolVerdict::lame(&result).into_result(|output| ToolError::Encode {
            tool: "lame".to_string(),
            output,
        })?;

        self.check_local_file(dst).await?;
        Ok(params)
    }

    /// Encode a wav into Ogg Vorbis with ffmpeg
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), src = %src.display()))]
    pub async fn encode_ogg_from_wav(
        &self,
        src: &Path,
        dst: &Path,
        options: &EncodeOptions,
    ) -> Result<ResolvedParameters> {
        tracing::info!("encode_ogg_from_wav: {} -> {}, {:?}", src.display(), dst.display(), options);
        self.check_local_file(src).await?;

        let source = self.source_format(src).await?;
        let params = resolve(Codec::Ogg, &source, options);
        let command = command::ogg_command(&self.config, src, dst, &params);

        self.run(&command).await?;
        self.check_local_file(dst).await?;
        Ok(params)
    }

    /// Dispatch on the output codec
    pub async fn encode(
        &self,
        codec: Codec,
        src: &Path,
        dst: &Path,
        options: &EncodeOptions,
    ) -> Result<ResolvedParameters> {
        match codec {
            Codec::Mp2 => self.encode_mp2_from_wav(src, dst, options).await,
            Codec::Mp3 => self.encode_mp3_from_wav(src, dst, options).await,
            Codec::Ogg => self.encode_ogg_from_wav(src, dst, options).await,
        }
    }
}
