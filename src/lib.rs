//! Broadcast audio transcoding
//!
//! Drives external codec tools (`sox`, `twolame`, `lame`, `ffmpeg`, `madplay`,
//! `flac`, `mp3val`, `file`) to encode, decode, edit, analyse and validate
//! broadcast audio, and reads their text output back into typed results.

pub mod cart;
pub mod config;
pub mod config_file;
pub mod detect;
pub mod error;
pub mod orchestrator;
pub mod patterns;
pub mod probe;
pub mod process;
pub mod temp;
pub mod transcode;
pub mod validate;

#[cfg(all(test, unix))]
mod integration;

pub use config::Config;
pub use error::{AudioError, Result, ToolError};
pub use orchestrator::Orchestrator;
