//! Sample-accurate time representation for audio editing
//!
//! Positions inside an audio signal are integer sample indices; wall-clock
//! seconds are derived values. Keeping indices integral avoids
//! floating-point drift when passes are windowed and stitched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Samples per second of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD audio, 44.1 kHz.
    pub const CD: SampleRate = SampleRate(44_100);
    /// Studio/video audio, 48 kHz.
    pub const STUDIO: SampleRate = SampleRate(48_000);

    /// Convert a sample index to seconds.
    #[inline]
    pub fn seconds_at(self, sample: usize) -> f64 {
        sample as f64 / self.0 as f64
    }

    /// Convert a duration in seconds to a sample count (rounded down).
    #[inline]
    pub fn samples_in(self, seconds: f64) -> usize {
        (seconds * self.0 as f64) as usize
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// A half-open range of sample indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRange {
    pub start: usize,
    pub end: usize,
}

impl SampleRange {
    /// Create a range. `end < start` is normalized to an empty range.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of samples in the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range contains no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `sample` falls inside the range.
    #[inline]
    pub fn contains(&self, sample: usize) -> bool {
        sample >= self.start && sample < self.end
    }

    /// Shift the range forward by `offset` samples.
    #[inline]
    pub fn offset_by(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Whether two ranges overlap or touch end-to-start.
    #[inline]
    pub fn overlaps(&self, other: &SampleRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both.
    #[inline]
    pub fn union(self, other: SampleRange) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Start and end of the range in seconds.
    #[inline]
    pub fn to_seconds(self, rate: SampleRate) -> (f64, f64) {
        (rate.seconds_at(self.start), rate.seconds_at(self.end))
    }
}

/// Coalesce overlapping or touching ranges into a minimal sorted list.
///
/// Analysis passes over 50%-overlapped windows report the same defect from
/// two windows; this stitches those duplicates back together.
pub fn merge_ranges(mut ranges: Vec<SampleRange>) -> Vec<SampleRange> {
    ranges.retain(|r| !r.is_empty());
    if ranges.len() <= 1 {
        return ranges;
    }
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<SampleRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.overlaps(&range) => *last = last.union(range),
            _ => merged.push(range),
        }
    }
    merged
}
