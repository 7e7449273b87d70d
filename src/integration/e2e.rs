//! End-to-end integration tests
//!
//! Drives the orchestrator against the fake toolbox: real subprocesses,
//! real pipes and temp files, canned tool answers.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::cart::CartOptions;
    use crate::detect::DetectionPolicy;
    use crate::error::{AudioError, ToolError};
    use crate::integration::fixtures::FakeToolbox;
    use crate::orchestrator::{DecodeOptions, Orchestrator};
    use crate::probe::MpegVersion;
    use crate::transcode::{Codec, EncodeOptions};
    use crate::validate::{Attribute, MpegConstraints, Threshold, ValidationTarget};

    const STEREO_MP2: &str = "MPEG ADTS, layer II, v1, 256 kBits, 44.1 kHz, Stereo";
    const JOINT_MP3: &str = "MPEG ADTS, layer III, v1, 128 kBits, 44.1 kHz, JntStereo";

    // Encoding

    #[tokio::test]
    async fn test_encode_mp2_stereo_defaults() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);
        let dst = toolbox.media_path("show.mp2");

        let params = toolbox
            .orchestrator()
            .encode_mp2_from_wav(&src, &dst, &EncodeOptions::default())
            .await
            .unwrap();

        assert_eq!(params.channel_mode, "s");
        assert_eq!(params.bit_rate, 256);
        assert!(dst.is_file());
        let log = toolbox.log("twolame");
        assert!(log.contains("--mode s --bitrate 256"), "{}", log);
        assert!(!log.contains("--raw-input"));
        assert_eq!(toolbox.log("sox"), "");
    }

    #[tokio::test]
    async fn test_encode_mp2_resamples_through_sox() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("low.wav", 1, 22050, 30.0);
        let dst = toolbox.media_path("low.mp2");

        let params = toolbox
            .orchestrator()
            .encode_mp2_from_wav(&src, &dst, &EncodeOptions::default())
            .await
            .unwrap();

        assert!(params.resample);
        assert_eq!(params.channel_mode, "m");
        assert_eq!(params.bit_rate, 128);
        assert!(toolbox.log("sox").contains("-t raw -r 44100 -"));
        assert!(toolbox.log("twolame").contains("--raw-input --samplerate 44100"));
    }

    #[tokio::test]
    async fn test_encode_mp2_failure_status() {
        let toolbox = FakeToolbox::new();
        toolbox.install("twolame", "echo 'twolame: bad input' >&2\nexit 3\n");
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);

        let err = toolbox
            .orchestrator()
            .encode_mp2_from_wav(&src, &toolbox.media_path("show.mp2"), &EncodeOptions::default())
            .await
            .unwrap_err();

        match err {
            AudioError::Tool(ToolError::Encode { tool, output }) => {
                assert_eq!(tool, "twolame");
                assert!(output.contains("bad input"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_encode_without_output_is_missing_file() {
        let toolbox = FakeToolbox::new();
        toolbox.install("twolame", "exit 0\n");
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);
        let dst = toolbox.media_path("never.mp2");

        let err = toolbox
            .orchestrator()
            .encode_mp2_from_wav(&src, &dst, &EncodeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::MissingOrEmptyFile(path) if path == dst));
    }

    #[tokio::test]
    async fn test_encode_missing_source() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.media_path("absent.wav");

        let err = toolbox
            .orchestrator()
            .encode(Codec::Mp3, &src, &toolbox.media_path("x.mp3"), &EncodeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::MissingOrEmptyFile(path) if path == src));
        assert_eq!(toolbox.log("soxi"), "");
    }

    #[tokio::test]
    async fn test_encode_mp3_fatal_error_despite_zero_status() {
        let toolbox = FakeToolbox::new();
        toolbox.install(
            "lame",
            "cat > /dev/null\necho 'lame: fatal error during initialization' >&2\nexit 0\n",
        );
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);

        let err = toolbox
            .orchestrator()
            .encode_mp3_from_wav(&src, &toolbox.media_path("show.mp3"), &EncodeOptions::default())
            .await
            .unwrap_err();
        match err {
            AudioError::Tool(ToolError::Encode { tool, output }) => {
                assert_eq!(tool, "lame");
                assert!(output.contains("fatal error"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_encode_mp3_pipeline() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("show.wav", 2, 48000, 60.0);
        let dst = toolbox.media_path("show.mp3");
        let options = EncodeOptions {
            bit_rate: Some(192),
            ..Default::default()
        };

        let params = toolbox
            .orchestrator()
            .encode_mp3_from_wav(&src, &dst, &options)
            .await
            .unwrap();

        assert_eq!(params.sample_rate, 48000);
        assert!(!params.resample);
        assert!(toolbox.log("sox").contains("-t wav -"));
        assert!(toolbox.log("lame").contains("-S -m j --cbr -b 192 -"));
        assert!(dst.is_file());
    }

    #[tokio::test]
    async fn test_encode_ogg_default_bit_rate() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);
        let dst = toolbox.media_path("show.ogg");

        let params = toolbox
            .orchestrator()
            .encode(Codec::Ogg, &src, &dst, &EncodeOptions::default())
            .await
            .unwrap();

        assert_eq!(params.codec, Codec::Ogg);
        let log = toolbox.log("ffmpeg");
        assert!(log.contains("-acodec libvorbis -ac 2 -ar 44100"), "{}", log);
        assert!(dst.is_file());
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let toolbox = FakeToolbox::new();
        toolbox.install("twolame", "sleep 10\n");
        let mut config = toolbox.config();
        config.process.timeout_secs = 1;
        let src = toolbox.add_wav("show.wav", 2, 44100, 60.0);

        let err = Orchestrator::new(config)
            .encode_mp2_from_wav(&src, &toolbox.media_path("show.mp2"), &EncodeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::Timeout { .. }), "{:?}", err);
    }

    // Detection

    #[tokio::test]
    async fn test_tone_detect_from_dump() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("cue.wav", 2, 44100, 5.0);
        toolbox.set_sidecar(
            &src,
            ".dump",
            "; Sample Rate 200\n; Channels 1\n   0.000  0.01\n   1.000  0.3\n   1.100  -0.4\n   1.200  0.01\n   3.000  0.01\n",
        );

        let ranges = toolbox
            .orchestrator()
            .tone_detect(&src, 25, DetectionPolicy::tone())
            .await
            .unwrap();

        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start, ranges[0].finish), (1.0, 1.1));
        assert_eq!(ranges[0].max_energy, 0.4);
        assert!(toolbox.log("sox").contains("bandpass 25 3 gain 6"));
        assert_eq!(toolbox.leftover_temp_files(), 0);
    }

    #[tokio::test]
    async fn test_silence_detect_from_dump() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("gap.wav", 1, 44100, 6.0);
        toolbox.set_sidecar(
            &src,
            ".dump",
            "; Sample Rate 1000\n0 0.5\n1 0.0001\n2 0.0002\n3 0.0001\n4 0.0001\n5 0.4\n",
        );

        let ranges = toolbox
            .orchestrator()
            .silence_detect(&src, DetectionPolicy::silence())
            .await
            .unwrap();

        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start, ranges[0].finish), (1.0, 4.0));
        assert!(toolbox.log("sox").contains("channels 1 rate 1000 norm"));
    }

    #[tokio::test]
    async fn test_detect_malformed_dump() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("bad.wav", 1, 44100, 6.0);
        toolbox.set_sidecar(&src, ".dump", "; Sample Rate 1000\n0 0.5\nnot a number\n");

        let err = toolbox
            .orchestrator()
            .silence_detect(&src, DetectionPolicy::silence())
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::MalformedSample { line: 3, .. }), "{:?}", err);
        assert_eq!(toolbox.leftover_temp_files(), 0);
    }

    // Validation

    #[tokio::test]
    async fn test_validate_compliant_mp2() {
        let toolbox = FakeToolbox::new();
        let path = toolbox.add_mpeg("ok.mp2", STEREO_MP2, 62.5);
        let constraints = MpegConstraints {
            version: Some(1),
            layer: Some(2),
            channel_mode: Some(vec!["Stereo".to_string(), "JStereo".to_string()]),
            channels: Some(2),
            sample_rate: Some(Threshold::parse("44100")),
            bit_rate: Some(Threshold::parse("256")),
            per_channel_bit_rate: Some(Threshold::parse("128")),
        };

        let outcome = toolbox
            .orchestrator()
            .validate_mpeg(&path, ValidationTarget::Mp2, &constraints)
            .await
            .unwrap();

        assert!(outcome.is_valid(), "{:?}", outcome.report);
        let info = outcome.info.unwrap();
        assert_eq!(info.version, Some(MpegVersion::V1));
        assert_eq!(info.layer, Some(2));
        assert_eq!(info.length, 62.5);
    }

    #[tokio::test]
    async fn test_validate_every_constraint_violated() {
        let toolbox = FakeToolbox::new();
        let path = toolbox.add_mpeg("wrong.mp3", JOINT_MP3, 10.0);
        let constraints = MpegConstraints {
            version: Some(2),
            layer: Some(2),
            channel_mode: Some(vec!["Single Channel".to_string()]),
            channels: Some(1),
            sample_rate: Some(Threshold::parse("<= 32000")),
            bit_rate: Some(Threshold::parse("256")),
            per_channel_bit_rate: Some(Threshold::parse("192")),
        };

        let outcome = toolbox
            .orchestrator()
            .validate_mpeg(&path, ValidationTarget::Mp2, &constraints)
            .await
            .unwrap();

        let report = &outcome.report;
        assert_eq!(report.len(), 8, "{:?}", report);
        assert_eq!(
            report.get(Attribute::SampleRate).unwrap(),
            ["sample rate should be <= 32000, but is 44100"]
        );
        assert_eq!(
            report.get(Attribute::PerChannelBitRate).unwrap(),
            ["per channel bit rate should be >= 192, but is 64, and channels = 2"]
        );
        assert!(report.get(Attribute::File).unwrap()[0].starts_with("is not a valid mp2 file"));
    }

    #[tokio::test]
    async fn test_validate_wav_is_not_mpeg() {
        let toolbox = FakeToolbox::new();
        let path = toolbox.add_wav("voice.wav", 1, 44100, 3.0);
        toolbox.set_sidecar(&path, ".file", "RIFF (little-endian) data, WAVE audio\n");

        let outcome = toolbox
            .orchestrator()
            .validate_mpeg(&path, ValidationTarget::Any, &MpegConstraints::default())
            .await
            .unwrap();

        assert!(outcome.info.is_none());
        assert_eq!(
            outcome.report.get(Attribute::File).unwrap(),
            [
                "is not a valid mpeg file, we think it's a 'RIFF (little-endian) data, WAVE audio'",
                "is not a valid mpeg audio file.",
            ]
        );
    }

    #[tokio::test]
    async fn test_validate_mp3val_findings() {
        let toolbox = FakeToolbox::new();
        let path = toolbox.add_mpeg("noisy.mp2", STEREO_MP2, 10.0);
        toolbox.set_sidecar(
            &path,
            ".mp3val",
            "Analyzing file \"noisy.mp2\"...\n\
             WARNING: \"noisy.mp2\" (offset 0x0): No supported tags in the file\n\
             WARNING: \"noisy.mp2\" (offset 0x1a2): Wrong CRC in 3 frames\n\
             WARNING: \"noisy.mp2\" (offset 0x1f0): Wrong CRC in 1 frame\n\
             Done!\n",
        );

        let outcome = toolbox
            .orchestrator()
            .validate_mpeg(&path, ValidationTarget::Mp2, &MpegConstraints::default())
            .await
            .unwrap();

        assert_eq!(outcome.report.len(), 1);
        assert_eq!(
            outcome.report.get(Attribute::File).unwrap(),
            ["is not a valid mpeg file, there were serious warnings when validating the audio."]
        );
    }

    #[tokio::test]
    async fn test_validate_mp3val_fatal() {
        let toolbox = FakeToolbox::new();
        toolbox.install("mp3val", "echo 'mp3val: cannot open file' >&2\nexit 1\n");
        let path = toolbox.add_mpeg("ok.mp2", STEREO_MP2, 10.0);

        let err = toolbox
            .orchestrator()
            .validate_mpeg(&path, ValidationTarget::Mp2, &MpegConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::Tool(ToolError::ValidatorFatal { .. })), "{:?}", err);
    }

    // Info and decode

    #[tokio::test]
    async fn test_info_dispatch_by_extension() {
        let toolbox = FakeToolbox::new();
        let orchestrator = toolbox.orchestrator();

        let wav = toolbox.add_wav("voice.wav", 1, 22050, 3.0);
        let info = orchestrator.info(&wav).await.unwrap();
        assert_eq!(info.content_type, "audio/vnd.wave");
        assert_eq!(info.channel_mode, "Mono");
        assert_eq!(info.sample_rate, 22050);

        let mp2 = toolbox.add_mpeg("show.mp2", STEREO_MP2, 20.0);
        let info = orchestrator.info(&mp2).await.unwrap();
        assert_eq!(info.content_type, "audio/mpeg");
        assert_eq!(info.bit_rate, 256);
        assert_eq!(info.length, 20.0);

        let ogg = toolbox.add_pcm("promo.ogg", 2, 44100, 30.0, "Vorbis", 16);
        toolbox.set_sidecar(&ogg, ".mime", "audio/ogg\n");
        let info = orchestrator.info(&ogg).await.unwrap();
        assert_eq!(info.content_type, "audio/ogg");
        assert_eq!(info.bit_rate, 1410);
        assert_eq!(info.version, None);
    }

    #[tokio::test]
    async fn test_mpeg_info_without_duration() {
        let toolbox = FakeToolbox::new();
        let mp3 = toolbox.add_mpeg("odd.mp3", JOINT_MP3, 0.0);
        toolbox.set_sidecar(&mp3, ".soxi", "");

        let info = toolbox.orchestrator().info(&mp3).await.unwrap();
        assert_eq!(info.length, 0.0);
        assert_eq!(info.channel_mode, "JStereo");
    }

    #[tokio::test]
    async fn test_decode_dispatch() {
        let toolbox = FakeToolbox::new();
        let orchestrator = toolbox.orchestrator();
        let options = DecodeOptions::default();

        let mp2 = toolbox.add_mpeg("show.mp2", STEREO_MP2, 20.0);
        let wav = toolbox.media_path("show.wav");
        orchestrator.decode_to_wav(&mp2, &wav, &options).await.unwrap();
        assert!(toolbox.log("madplay").contains("-Q -i --output=wave:"));
        assert!(wav.is_file());

        let flac = toolbox.media_path("song.flac");
        std::fs::write(&flac, b"fLaC").unwrap();
        orchestrator
            .decode_to_wav(&flac, &toolbox.media_path("song.wav"), &options)
            .await
            .unwrap();
        assert!(toolbox.log("flac").contains("-s -f --decode"));

        let m4a = toolbox.media_path("talk.m4a");
        std::fs::write(&m4a, b"ftyp").unwrap();
        orchestrator
            .decode_to_wav(&m4a, &toolbox.media_path("talk.wav"), &options)
            .await
            .unwrap();
        let long_ext = toolbox.media_path("clip.mpeg4");
        std::fs::write(&long_ext, b"ftyp").unwrap();
        orchestrator
            .decode_to_wav(&long_ext, &toolbox.media_path("clip.wav"), &options)
            .await
            .unwrap();

        let ffmpeg: Vec<String> = toolbox.log("ffmpeg").lines().map(String::from).collect();
        assert_eq!(ffmpeg.len(), 2);
        assert!(!ffmpeg[0].contains("-f mov"));
        assert!(ffmpeg[0].contains("-ac 2 -ar 44100"));
        assert!(ffmpeg[1].contains("-f mov -vn"));
    }

    #[tokio::test]
    async fn test_decode_source_format_override() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.media_path("upload.bin");
        std::fs::write(&src, b"\xff\xfd").unwrap();
        let options = DecodeOptions {
            source_format: Some("mp3".to_string()),
            ..Default::default()
        };

        toolbox
            .orchestrator()
            .decode_to_wav(&src, &toolbox.media_path("upload.wav"), &options)
            .await
            .unwrap();
        assert!(toolbox.log("madplay").contains("upload.bin"));
        assert_eq!(toolbox.log("ffmpeg"), "");
    }

    // Editing

    #[tokio::test]
    async fn test_cut_clamps_to_source_length() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("bed.wav", 2, 44100, 10.4);
        let out = toolbox.media_path("bed-cut.wav");

        toolbox.orchestrator().cut_wav(&src, &out, 30.0, 5.0).await.unwrap();

        let log = toolbox.log("sox");
        assert!(log.contains("trim 0 10"), "{}", log);
        assert!(log.contains("fade h 0 10 5"), "{}", log);
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn test_slice_and_normalize() {
        let toolbox = FakeToolbox::new();
        let orchestrator = toolbox.orchestrator();
        let src = toolbox.add_wav("long.wav", 2, 44100, 120.0);

        let slice = toolbox.media_path("slice.wav");
        orchestrator.slice_wav(&src, &slice, 12.5, 30.0).await.unwrap();
        assert!(toolbox.log("sox").contains("trim 12.5 30"));

        let loud = toolbox.media_path("loud.wav");
        orchestrator.normalize_wav(&src, &loud, -9).await.unwrap();
        assert!(toolbox.log("sox").contains("gain -n -9"));
        assert!(loud.is_file());
    }

    #[tokio::test]
    async fn test_sox_error_surfaces() {
        let toolbox = FakeToolbox::new();
        let src = toolbox.add_wav("corrupt.wav", 2, 44100, 20.0);

        let err = toolbox
            .orchestrator()
            .slice_wav(&src, &toolbox.media_path("out.wav"), 0.0, 5.0)
            .await
            .unwrap_err();
        match err {
            AudioError::Tool(ToolError::Sox { operation, output, .. }) => {
                assert_eq!(operation, "slice_wav");
                assert!(output.contains("sox error: corrupt input"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concat_converts_mismatched_inputs() {
        let toolbox = FakeToolbox::new();
        let first = toolbox.add_wav("a.wav", 2, 44100, 10.0);
        let second = toolbox.add_wav("b.wav", 1, 22050, 10.0);
        let out = toolbox.media_path("ab.wav");

        toolbox
            .orchestrator()
            .concat_wavs(&[first, second], &out)
            .await
            .unwrap();

        let log = toolbox.log("sox");
        assert_eq!(log.lines().count(), 2, "{}", log);
        assert!(log.lines().next().unwrap().contains("-c 2 -r 44100"));
        assert!(out.is_file());
        assert_eq!(toolbox.leftover_temp_files(), 0);
    }

    #[tokio::test]
    async fn test_concat_requires_inputs() {
        let toolbox = FakeToolbox::new();
        let inputs: Vec<PathBuf> = Vec::new();
        let err = toolbox
            .orchestrator()
            .concat_wavs(&inputs, &toolbox.media_path("none.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_append_wav_too_short() {
        let toolbox = FakeToolbox::new();
        let wav = toolbox.add_wav("main.wav", 2, 44100, 60.0);
        let tail = toolbox.add_wav("tail.wav", 2, 44100, 4.9);

        let err = toolbox
            .orchestrator()
            .append_wav_to_wav(&wav, &tail, &toolbox.media_path("out.wav"), 5, 5)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AudioError::InsufficientSourceLength { available: 4, requested: 5 }
        ));
        assert_eq!(toolbox.log("sox"), "");
    }

    #[tokio::test]
    async fn test_append_wav_to_wav() {
        let toolbox = FakeToolbox::new();
        let wav = toolbox.add_wav("main.wav", 2, 44100, 60.0);
        let tail = toolbox.add_wav("tail.wav", 2, 44100, 30.0);
        let out = toolbox.media_path("out.wav");

        toolbox
            .orchestrator()
            .append_wav_to_wav(&wav, &tail, &out, 10, 5)
            .await
            .unwrap();

        let log = toolbox.log("sox");
        assert!(log.contains("trim 0 9"), "{}", log);
        assert!(log.contains("fade h 0 9 5"), "{}", log);
        assert!(log.contains("pad 1 0"), "{}", log);
        assert!(out.is_file());
        assert_eq!(toolbox.leftover_temp_files(), 0);
    }

    #[tokio::test]
    async fn test_append_mp3_to_wav() {
        let toolbox = FakeToolbox::new();
        let wav = toolbox.add_wav("main.wav", 2, 44100, 60.0);
        let mp3 = toolbox.add_mpeg("promo.mp3", JOINT_MP3, 20.0);
        let out = toolbox.media_path("out.wav");

        toolbox
            .orchestrator()
            .append_mp3_to_wav(&wav, &mp3, &out, 15, 5)
            .await
            .unwrap();

        assert!(toolbox.log("madplay").contains("-q -o wave:-"));
        assert!(toolbox.log("sox").contains("trim 0 14"));
        assert!(out.is_file());
    }

    // Cart

    #[test]
    fn test_cart_fields_through_orchestrator() {
        let toolbox = FakeToolbox::new();
        let options = CartOptions {
            artist: Some("Morning Edition".to_string()),
            start_at: Some("2010-06-19T00:00:00-04:00".to_string()),
            ..Default::default()
        };
        let fields = toolbox
            .orchestrator()
            .cart_fields(&toolbox.media_path("segment.wav"), &options)
            .unwrap();
        assert_eq!(fields.title, "segment.wav");
        assert_eq!(fields.start_date, "2010/06/19");
        assert_eq!(fields.end_date, "2011/06/19");
    }
}
