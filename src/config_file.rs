//! Configuration file support
//!
//! Loads transcoder configuration from TOML files where every section is
//! optional and absent keys fall back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{Config, ProcessConfig, ToolPaths};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Directory settings
    pub paths: Option<PathSettings>,
    /// Tool executable overrides
    pub tools: Option<ToolSettings>,
    /// Subprocess settings
    pub process: Option<ProcessSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory prepended to every tool name
    pub bin_dir: Option<PathBuf>,
    /// Scratch directory for temporary files
    pub tmp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    pub file: Option<String>,
    pub ffmpeg: Option<String>,
    pub flac: Option<String>,
    pub lame: Option<String>,
    pub mp3val: Option<String>,
    pub sox: Option<String>,
    pub soxi: Option<String>,
    pub madplay: Option<String>,
    pub twolame: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessSettings {
    /// Timeout for external commands in seconds
    pub timeout_secs: Option<u64>,
    /// Niceness, or the string "n" to run commands unadjusted
    pub nice: Option<NiceSetting>,
}

/// Either a numeric niceness or the "n" marker for no adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NiceSetting {
    Level(i32),
    Marker(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = Config::default();
        let tools = defaults.tools;
        Self {
            paths: Some(PathSettings {
                bin_dir: None,
                tmp_dir: Some(defaults.tmp_dir),
            }),
            tools: Some(ToolSettings {
                file: Some(tools.file),
                ffmpeg: Some(tools.ffmpeg),
                flac: Some(tools.flac),
                lame: Some(tools.lame),
                mp3val: Some(tools.mp3val),
                sox: Some(tools.sox),
                soxi: Some(tools.soxi),
                madplay: Some(tools.madplay),
                twolame: Some(tools.twolame),
            }),
            process: Some(ProcessSettings {
                timeout_secs: Some(defaults.process.timeout_secs),
                nice: Some(NiceSetting::Level(defaults.process.nice)),
            }),
            logging: Some(LoggingSettings {
                level: Some(defaults.log_level),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Whether the logging section asks for JSON output
    pub fn json_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    /// Convert to Config
    pub fn into_config(self) -> Config {
        let defaults = Config::default();

        let paths = self.paths.unwrap_or_default();
        let tools = self.tools.unwrap_or_default();
        let default_tools = ToolPaths::default();
        let process = self.process.unwrap_or_default();

        let (nice, adjust_priority) = match process.nice {
            Some(NiceSetting::Level(level)) => (level, true),
            Some(NiceSetting::Marker(marker)) if marker == "n" => {
                (defaults.process.nice, false)
            }
            Some(NiceSetting::Marker(marker)) => {
                tracing::warn!("Unrecognized nice setting '{}', using default", marker);
                (defaults.process.nice, true)
            }
            None => (defaults.process.nice, true),
        };

        Config {
            bin_dir: paths.bin_dir,
            tmp_dir: paths.tmp_dir.unwrap_or(defaults.tmp_dir),
            log_level: self
                .logging
                .and_then(|l| l.level)
                .unwrap_or(defaults.log_level),
            tools: ToolPaths {
                file: tools.file.unwrap_or(default_tools.file),
                ffmpeg: tools.ffmpeg.unwrap_or(default_tools.ffmpeg),
                flac: tools.flac.unwrap_or(default_tools.flac),
                lame: tools.lame.unwrap_or(default_tools.lame),
                mp3val: tools.mp3val.unwrap_or(default_tools.mp3val),
                sox: tools.sox.unwrap_or(default_tools.sox),
                soxi: tools.soxi.unwrap_or(default_tools.soxi),
                madplay: tools.madplay.unwrap_or(default_tools.madplay),
                twolame: tools.twolame.unwrap_or(default_tools.twolame),
            },
            process: ProcessConfig {
                timeout_secs: process
                    .timeout_secs
                    .unwrap_or(defaults.process.timeout_secs),
                nice,
                adjust_priority,
            },
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
