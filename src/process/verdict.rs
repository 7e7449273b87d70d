//! Success / warning / failure judgement of captured tool output

use crate::error::ToolError;
use crate::patterns::{ENCODER_SUCCESS, LAME_ERROR, SOX_ERROR, SOX_WARNING};

use super::runner::CommandResult;

/// Outcome of a tool run, as read from the tool's own text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVerdict {
    Succeeded,
    SucceededWithWarnings(Vec<String>),
    /// The offending output
    Failed(String),
}

impl ToolVerdict {
    /// Judge a twolame run: the trailing exit status must be `0`
    pub fn twolame(result: &CommandResult) -> Self {
        match result.last_stdout_line() {
            Some(line) if ENCODER_SUCCESS.is_match(line) => ToolVerdict::Succeeded,
            _ => ToolVerdict::Failed(result.combined()),
        }
    }

    /// Judge a lame run: success marker required and no `fatal error` on stderr
    pub fn lame(result: &CommandResult) -> Self {
        if let Some(line) = result.stderr.lines().find(|l| LAME_ERROR.is_match(l)) {
            return ToolVerdict::Failed(line.to_string());
        }
        match result.last_stdout_line() {
            Some(line) if ENCODER_SUCCESS.is_match(line) => ToolVerdict::Succeeded,
            _ => ToolVerdict::Failed(result.combined()),
        }
    }

    /// Judge a sox run: any `error:` line fails, `WARN` lines are collected
    pub fn sox(result: &CommandResult) -> Self {
        let response = result.combined();
        if response.lines().any(|l| SOX_ERROR.is_match(l)) {
            return ToolVerdict::Failed(response);
        }
        let warnings: Vec<String> = response
            .lines()
            .filter(|l| SOX_WARNING.is_match(l))
            .map(|l| l.trim().to_string())
            .collect();
        if warnings.is_empty() {
            ToolVerdict::Succeeded
        } else {
            ToolVerdict::SucceededWithWarnings(warnings)
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ToolVerdict::Failed(_))
    }

    /// Log any warnings and turn a failure into the error built by `on_fail`
    pub fn into_result<F>(self, on_fail: F) -> Result<(), ToolError>
    where
        F: FnOnce(String) -> ToolError,
    {
        match self {
            ToolVerdict::Succeeded => Ok(()),
            ToolVerdict::SucceededWithWarnings(warnings) => {
                for warning in &warnings {
                    tracing::warn!("tool warning: {}", warning);
                }
                Ok(())
            }
            ToolVerdict::Failed(output) => Err(on_fail(output)),
        }
    }
}
