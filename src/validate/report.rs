//! Per-attribute accumulation of validation findings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute a finding is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    File,
    Version,
    Layer,
    ChannelMode,
    Channels,
    SampleRate,
    BitRate,
    PerChannelBitRate,
}

/// Findings keyed by attribute; empty means the file passed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<Attribute, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: Attribute, message: impl Into<String>) {
        self.errors.entry(attribute).or_default().push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of attributes with findings
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, attribute: Attribute) -> Option<&[String]> {
        self.errors.get(&attribute).map(Vec::as_slice)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.errors.keys().copied()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        for (attribute, messages) in other.errors {
            self.errors.entry(attribute).or_default().extend(messages);
        }
    }
}
