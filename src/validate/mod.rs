//! MPEG audio validation
//!
//! Findings are collected into a [`ValidationReport`]; only operational
//! failures (tools that cannot run) surface as errors.

pub mod constraint;
pub mod engine;
pub mod report;

use serde::Serialize;

use crate::probe::AudioInfo;

pub use constraint::{Comparison, MpegConstraints, Threshold};
pub use engine::{check_header, check_signature, classify_mp3val_output, ValidationTarget};
pub use report::{Attribute, ValidationReport};

/// Result of validating one file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    /// Present when the header could be read
    pub info: Option<AudioInfo>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}
