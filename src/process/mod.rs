//! External tool execution
//!
//! - Shell command lines (including pipelines) with timeout and `nice`
//! - Line-by-line stdout/stderr capture
//! - Per-tool verdicts on the captured text

pub mod runner;
pub mod verdict;

pub use runner::{CommandResult, Priority, ProcessRunner, RunOptions};
pub use verdict::ToolVerdict;
