//! Single-pass merge scan shared by tone and silence detection

use serde::Serialize;

/// One row of a decoded sample dump
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds from the start of the audio
    pub time: f64,
    pub energy: f64,
}

impl Sample {
    pub fn new(time: f64, energy: f64) -> Self {
        Self { time, energy }
    }
}

/// A closed interval of samples that satisfied the detection predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyRange {
    pub start: f64,
    pub finish: f64,
    pub min_energy: f64,
    pub max_energy: f64,
}

impl EnergyRange {
    fn open(time: f64, energy: f64) -> Self {
        Self {
            start: time,
            finish: time,
            min_energy: energy,
            max_energy: energy,
        }
    }

    fn extend(&mut self, time: f64, energy: f64) {
        self.finish = time;
        self.min_energy = self.min_energy.min(energy);
        self.max_energy = self.max_energy.max(energy);
    }

    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }
}

pub const DEFAULT_TONE_THRESHOLD: f64 = 0.05;
pub const DEFAULT_TONE_MIN_GAP: f64 = 0.5;
pub const DEFAULT_SILENCE_THRESHOLD: f64 = 0.001;
pub const DEFAULT_SILENCE_MIN_DURATION: f64 = 2.0;

/// How samples are grouped into ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionPolicy {
    /// Samples at or above `threshold`; a range stays open across gaps up to `min_gap`
    Burst { threshold: f64, min_gap: f64 },
    /// Samples below `threshold`; ranges no longer than `min_duration` are dropped
    Silence { threshold: f64, min_duration: f64 },
}

impl DetectionPolicy {
    pub fn tone() -> Self {
        DetectionPolicy::Burst {
            threshold: DEFAULT_TONE_THRESHOLD,
            min_gap: DEFAULT_TONE_MIN_GAP,
        }
    }

    pub fn silence() -> Self {
        DetectionPolicy::Silence {
            threshold: DEFAULT_SILENCE_THRESHOLD,
            min_duration: DEFAULT_SILENCE_MIN_DURATION,
        }
    }

    fn accepts(&self, energy: f64) -> bool {
        match *self {
            DetectionPolicy::Burst { threshold, .. } => energy >= threshold,
            DetectionPolicy::Silence { threshold, .. } => energy < threshold,
        }
    }

    fn keeps(&self, range: &EnergyRange) -> bool {
        match *self {
            DetectionPolicy::Burst { .. } => true,
            DetectionPolicy::Silence { min_duration, .. } => range.duration() > min_duration,
        }
    }
}

/// Incremental range builder
///
/// Feed samples in time order with [`RangeScanner::push`]; each call returns a
/// range when one closes. [`RangeScanner::finish`] flushes the open range.
#[derive(Debug, Clone)]
pub struct RangeScanner {
    policy: DetectionPolicy,
    current: Option<EnergyRange>,
}

impl RangeScanner {
    pub fn new(policy: DetectionPolicy) -> Self {
        Self {
            policy,
            current: None,
        }
    }

    pub fn push(&mut self, sample: Sample) -> Option<EnergyRange> {
        let energy = sample.energy.abs();

        if self.policy.accepts(energy) {
            match self.current.as_mut() {
                Some(range) => range.extend(sample.time, energy),
                None => self.current = Some(EnergyRange::open(sample.time, energy)),
            }
            return None;
        }

        match self.policy {
            DetectionPolicy::Burst { min_gap, .. } => match self.current {
                Some(range) if range.finish + min_gap < sample.time => self.current.take(),
                _ => None,
            },
            DetectionPolicy::Silence { .. } => {
                let range = self.current.take()?;
                self.policy.keeps(&range).then_some(range)
            }
        }
    }

    pub fn finish(mut self) -> Option<EnergyRange> {
        let range = self.current.take()?;
        self.policy.keeps(&range).then_some(range)
    }
}

/// Run a complete scan over an in-memory or lazy sample sequence
pub fn detect_ranges<I>(samples: I, policy: DetectionPolicy) -> Vec<EnergyRange>
where
    I: IntoIterator<Item = Sample>,
{
    let mut scanner = RangeScanner::new(policy);
    let mut ranges: Vec<EnergyRange> = samples
        .into_iter()
        .filter_map(|sample| scanner.push(sample))
        .collect();
    ranges.extend(scanner.finish());
    ranges
}
