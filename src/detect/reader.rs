//! Lazy parser for sox `.dat` sample dumps
//!
//! Rows look like `   0.015  -0.00213` (time, then one value per channel).
//! Header rows start with `;`.

use std::io::BufRead;

use crate::error::{AudioError, Result};

use super::scanner::Sample;

/// Iterator over the samples of a dump, one row at a time
pub struct SampleReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

fn parse_row(row: &str) -> Option<Sample> {
    let mut fields = row.split_whitespace();
    let time = fields.next()?.parse().ok()?;
    let energy = fields.next()?.parse().ok()?;
    Some(Sample::new(time, energy))
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(AudioError::Io(e))),
            };
            self.line_number += 1;

            let row = line.trim();
            if row.is_empty() || row.starts_with(';') {
                continue;
            }

            return Some(parse_row(row).ok_or_else(|| AudioError::MalformedSample {
                line: self.line_number,
                content: row.to_string(),
            }));
        }
    }
}
