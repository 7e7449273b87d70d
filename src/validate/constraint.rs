//! Header constraints for MPEG audio validation
//!
//! Threshold constraints accept either a bare number (meaning `>=`) or an
//! `"<op> <number>"` string. Unknown operators are read as `>=`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl Comparison {
    /// Parse an operator; `=` means `==` and anything unrecognised means `>=`
    pub fn parse_lenient(op: &str) -> Self {
        match op {
            ">=" => Comparison::Ge,
            "<=" => Comparison::Le,
            "==" | "=" => Comparison::Eq,
            ">" => Comparison::Gt,
            "<" => Comparison::Lt,
            _ => Comparison::Ge,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
        }
    }

    pub fn holds(&self, actual: i64, expected: i64) -> bool {
        match self {
            Comparison::Ge => actual >= expected,
            Comparison::Le => actual <= expected,
            Comparison::Eq => actual == expected,
            Comparison::Gt => actual > expected,
            Comparison::Lt => actual < expected,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Comparison against a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Threshold {
    pub op: Comparison,
    pub value: i64,
}

impl Threshold {
    pub fn new(op: Comparison, value: i64) -> Self {
        Self { op, value }
    }

    pub fn at_least(value: i64) -> Self {
        Self::new(Comparison::Ge, value)
    }

    /// Parse `"44100"` or `"<= 44000"`
    pub fn parse(text: &str) -> Self {
        if !text.contains(' ') {
            return Self::at_least(leading_integer(text));
        }
        let mut tokens = text.split_whitespace();
        let op = Comparison::parse_lenient(tokens.next().unwrap_or(""));
        let value = leading_integer(tokens.next().unwrap_or(""));
        Self::new(op, value)
    }

    pub fn check(&self, actual: i64) -> bool {
        self.op.holds(actual, self.value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.value)
    }
}

/// Integer prefix of a string, 0 when there is none
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Threshold::at_least(n),
            Raw::Float(f) => Threshold::at_least(f.trunc() as i64),
            Raw::Text(s) => Threshold::parse(&s),
        })
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::One(mode) => vec![mode],
        Raw::Many(modes) => modes,
    }))
}

/// Expected header properties; absent fields are not checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpegConstraints {
    pub version: Option<u32>,
    pub layer: Option<u32>,
    /// Accepted header channel modes ("Stereo", "JStereo", "Dual Channel", "Single Channel")
    #[serde(deserialize_with = "one_or_many")]
    pub channel_mode: Option<Vec<String>>,
    pub channels: Option<u32>,
    pub sample_rate: Option<Threshold>,
    pub bit_rate: Option<Threshold>,
    pub per_channel_bit_rate: Option<Threshold>,
}

impl MpegConstraints {
    /// Number of constraints that will be checked
    pub fn count(&self) -> usize {
        [
            self.version.is_some(),
            self.layer.is_some(),
            self.channel_mode.is_some(),
            self.channels.is_some(),
            self.sample_rate.is_some(),
            self.bit_rate.is_some(),
            self.per_channel_bit_rate.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}
