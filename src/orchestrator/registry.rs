//! Source-format dispatch table
//!
//! Built once when the orchestrator is constructed; formats without an entry
//! fall through to the generic handlers.

use std::collections::HashMap;
use std::path::Path;

/// Tool used to turn a source into PCM wav
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Madplay,
    Flac,
    /// Anything ffmpeg can read
    Ffmpeg,
}

/// How the basic info record is gathered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoReader {
    Mpeg,
    Wav,
    Generic,
}

#[derive(Debug, Clone)]
pub struct OperationRegistry {
    decoders: HashMap<&'static str, Decoder>,
    info_readers: HashMap<&'static str, InfoReader>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperationRegistry {
    pub fn standard() -> Self {
        let decoders = HashMap::from([
            ("mp2", Decoder::Madplay),
            ("mp3", Decoder::Madplay),
            ("flac", Decoder::Flac),
        ]);
        let info_readers = HashMap::from([
            ("mp2", InfoReader::Mpeg),
            ("mp3", InfoReader::Mpeg),
            ("wav", InfoReader::Wav),
        ]);
        Self {
            decoders,
            info_readers,
        }
    }

    pub fn decoder_for(&self, format: &str) -> Decoder {
        self.decoders
            .get(format.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Decoder::Ffmpeg)
    }

    pub fn info_reader_for(&self, format: &str) -> InfoReader {
        self.info_readers
            .get(format.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(InfoReader::Generic)
    }
}

/// Lowercased extension of a path, empty when there is none
pub fn format_key(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
