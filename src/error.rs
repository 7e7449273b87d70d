use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for transcoding, detection and validation operations
#[derive(Error, Debug)]
pub enum AudioError {
    /// A required input or output file is absent or has zero length
    #[error("File missing or 0 length: {}", .0.display())]
    MissingOrEmptyFile(PathBuf),

    /// An external tool exceeded its allotted time and was killed
    #[error("Command timed out after {:.1}s: {command}", elapsed.as_secs_f64())]
    Timeout { command: String, elapsed: Duration },

    /// An external tool reported failure through its own output
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// A requested trim/append length exceeds the source duration
    #[error("Source is not sufficiently long enough ({available}s) to add length ({requested}s)")]
    InsufficientSourceLength { available: u64, requested: u64 },

    /// The command could not be started at all
    #[error("Failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Probe output could not be interpreted as audio metadata
    #[error("Probe error: {0}")]
    Probe(String),

    /// A row of a decoded sample dump could not be parsed
    #[error("Malformed sample row {line}: '{content}'")]
    MalformedSample { line: usize, content: String },

    /// Caller supplied an argument the operation cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures reported by external tools through their own success/error markers
#[derive(Error, Debug)]
pub enum ToolError {
    /// An encoder did not print its success marker or printed a fatal error
    #[error("{tool} encode failed: {output}")]
    Encode { tool: String, output: String },

    /// A validator could not complete its own run
    #[error("{tool} validator fatal error: {output}")]
    ValidatorFatal { tool: String, output: String },

    /// sox printed an error while performing an edit
    #[error("{operation}: sox error '{output}' on: {command}")]
    Sox {
        operation: String,
        output: String,
        command: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AudioError>;
