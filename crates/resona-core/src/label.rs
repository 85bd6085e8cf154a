//! Labeled time regions produced by analysis passes.

use crate::time::{SampleRange, SampleRate};
use serde::{Deserialize, Serialize};

/// A labeled interval of the timeline, in seconds.
///
/// Analysis passes append these to an externally-owned label collection;
/// the region itself carries no reference back to the audio data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRegion {
    /// Start of the region in seconds.
    pub start: f64,
    /// End of the region in seconds (exclusive).
    pub end: f64,
    /// Display label.
    pub label: String,
}

impl LabeledRegion {
    /// Create a region from explicit times.
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Convert a sample range at the given rate into a labeled region.
    pub fn from_samples(range: SampleRange, rate: SampleRate, label: impl Into<String>) -> Self {
        let (start, end) = range.to_seconds(rate);
        Self::new(start, end, label)
    }

    /// Region duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
