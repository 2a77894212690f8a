//! Descriptive statistics over a captured sample stream.

use crate::sample::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Min/max/average and two percentiles of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub p50: f64,
    pub p90: f64,
}

impl Summary {
    /// Summarise `values`. Every field is 0 for an empty slice.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        Self {
            min,
            max,
            avg,
            p50: percentile(values, 50),
            p90: percentile(values, 90),
        }
    }

    /// Wrap this summary for display with a unit suffix, e.g. `"V"`.
    pub fn display_with_unit<'a>(&'a self, unit: &'a str) -> SummaryDisplay<'a> {
        SummaryDisplay { summary: self, unit }
    }
}

pub struct SummaryDisplay<'a> {
    summary: &'a Summary,
    unit: &'a str,
}

impl fmt::Display for SummaryDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let u = self.unit;
        write!(
            f,
            "min={:.2}{u}, max={:.2}{u}, avg={:.2}{u}, p50={:.2}{u}, p90={:.2}{u}",
            s.min, s.max, s.avg, s.p50, s.p90
        )
    }
}

/// Nearest-rank-below percentile: the element at index `p * (n - 1) / 100`
/// (integer division) of the sorted values. Returns 0 for an empty slice or
/// `p > 100`.
pub fn percentile(values: &[f64], p: u32) -> f64 {
    if values.is_empty() || p > 100 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let index = (p as usize * (sorted.len() - 1)) / 100;
    sorted[index]
}

/// Accumulates voltage and current series from a sample stream.
#[derive(Debug, Clone, Default)]
pub struct SampleStats {
    voltages: Vec<f64>,
    currents: Vec<f64>,
}

impl SampleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: &Sample) {
        self.voltages.push(f64::from(sample.voltage()));
        self.currents.push(f64::from(sample.current()));
    }

    pub fn len(&self) -> usize {
        self.voltages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltages.is_empty()
    }

    pub fn voltage(&self) -> Summary {
        Summary::from_values(&self.voltages)
    }

    pub fn current(&self) -> Summary {
        Summary::from_values(&self.currents)
    }
}

impl Extend<Sample> for SampleStats {
    fn extend<T: IntoIterator<Item = Sample>>(&mut self, iter: T) {
        for sample in iter {
            self.push(&sample);
        }
    }
}
