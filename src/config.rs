//! Transcoder configuration
//!
//! One immutable value built at start-up and handed to the orchestrator.
//! Nothing here is mutated once requests start flowing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// External command-line tools driven by the transcoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    File,
    Ffmpeg,
    Flac,
    Lame,
    Mp3val,
    Sox,
    Soxi,
    Madplay,
    Twolame,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::File,
        Tool::Ffmpeg,
        Tool::Flac,
        Tool::Lame,
        Tool::Mp3val,
        Tool::Sox,
        Tool::Soxi,
        Tool::Madplay,
        Tool::Twolame,
    ];

    /// Default executable name
    pub fn default_name(&self) -> &'static str {
        match self {
            Tool::File => "file",
            Tool::Ffmpeg => "ffmpeg",
            Tool::Flac => "flac",
            Tool::Lame => "lame",
            Tool::Mp3val => "mp3val",
            Tool::Sox => "sox",
            Tool::Soxi => "soxi",
            Tool::Madplay => "madplay",
            Tool::Twolame => "twolame",
        }
    }
}

/// Executable names (or paths) for each tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub file: String,
    pub ffmpeg: String,
    pub flac: String,
    pub lame: String,
    pub mp3val: String,
    pub sox: String,
    pub soxi: String,
    pub madplay: String,
    pub twolame: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            file: Tool::File.default_name().to_string(),
            ffmpeg: Tool::Ffmpeg.default_name().to_string(),
            flac: Tool::Flac.default_name().to_string(),
            lame: Tool::Lame.default_name().to_string(),
            mp3val: Tool::Mp3val.default_name().to_string(),
            sox: Tool::Sox.default_name().to_string(),
            soxi: Tool::Soxi.default_name().to_string(),
            madplay: Tool::Madplay.default_name().to_string(),
            twolame: Tool::Twolame.default_name().to_string(),
        }
    }
}

impl ToolPaths {
    /// Configured executable name for a tool
    pub fn get(&self, tool: Tool) -> &str {
        match tool {
            Tool::File => &self.file,
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Flac => &self.flac,
            Tool::Lame => &self.lame,
            Tool::Mp3val => &self.mp3val,
            Tool::Sox => &self.sox,
            Tool::Soxi => &self.soxi,
            Tool::Madplay => &self.madplay,
            Tool::Twolame => &self.twolame,
        }
    }
}

/// Subprocess defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Timeout applied to every external command, in seconds
    pub timeout_secs: u64,

    /// Niceness for external commands
    pub nice: i32,

    /// Run external commands under `nice` at all
    pub adjust_priority: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 7200, // 2 hours
            nice: 19,
            adjust_priority: true,
        }
    }
}

impl ProcessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Niceness to apply, `None` when commands run unadjusted
    pub fn niceness(&self) -> Option<i32> {
        self.adjust_priority.then_some(self.nice)
    }
}

/// Transcoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory prepended to every tool name, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<PathBuf>,

    /// Directory for scratch files, created on demand
    pub tmp_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Tool executable names
    pub tools: ToolPaths,

    /// Subprocess defaults
    pub process: ProcessConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bin_dir: None,
            tmp_dir: PathBuf::from("/tmp/audio_transcoder"),
            log_level: "info".to_string(),
            tools: ToolPaths::default(),
            process: ProcessConfig::default(),
        }
    }
}

impl Config {
    /// Command-line name of a tool, with `bin_dir` applied
    pub fn bin(&self, tool: Tool) -> String {
        let name = self.tools.get(tool);
        match &self.bin_dir {
            Some(dir) => dir.join(name).to_string_lossy().into_owned(),
            None => name.to_string(),
        }
    }

    /// Tools that cannot be found, either at their configured path or on `PATH`
    pub fn missing_tools(&self) -> Vec<Tool> {
        Tool::ALL
            .iter()
            .copied()
            .filter(|tool| !is_executable_available(&self.bin(*tool)))
            .collect()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

fn is_executable_available(name: &str) -> bool {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}
