//! Tone and silence range detection over decoded sample energy

pub mod reader;
pub mod scanner;

use std::io::BufRead;

use crate::error::Result;

pub use reader::SampleReader;
pub use scanner::{detect_ranges, DetectionPolicy, EnergyRange, RangeScanner, Sample};

/// Scan a sample dump straight from a reader, stopping at the first bad row
pub fn detect_ranges_from_reader<R: BufRead>(
    reader: R,
    policy: DetectionPolicy,
) -> Result<Vec<EnergyRange>> {
    let mut scanner = RangeScanner::new(policy);
    let mut ranges = Vec::new();
    for sample in SampleReader::new(reader) {
        if let Some(range) = scanner.push(sample?) {
            ranges.push(range);
        }
    }
    ranges.extend(scanner.finish());
    Ok(ranges)
}
