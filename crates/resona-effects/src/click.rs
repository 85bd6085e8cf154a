//! Click detection and removal.
//!
//! A click is a short, high-amplitude artifact whose local energy stands
//! out against the surrounding signal. The scanner compares a short
//! "probe" window against the mean-square energy of a long half-window at
//! several probe widths from coarse to fine; bursts that exceed the
//! threshold and are short enough are repaired by a straight line between
//! the samples bounding the burst. Sustained loud passages fail the width
//! test and are left alone.
//!
//! The selection is processed in fixed 8192-sample windows advancing by
//! half a window (50% overlap), with the final partial window zero-padded.

use rayon::prelude::*;
use resona_core::{merge_ranges, LabeledRegion, ResonaError, Result, SampleRange, SampleRate};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

/// Samples per analysis window.
pub const WINDOW_SIZE: usize = 8192;
/// Window advance per step; also the minimum selection length.
const HALF_WINDOW: usize = WINDOW_SIZE / 2;
/// Offset of the probe window inside the analysis window.
const QUARTER_WINDOW: usize = WINDOW_SIZE / 4;

/// Default sensitivity. Larger is less sensitive.
pub const DEFAULT_THRESHOLD: u32 = 200;
/// Default maximum expected click width in samples.
pub const DEFAULT_WIDTH: usize = 20;

/// Spans repaired within one window. Rarely more than a handful.
pub type WindowSpans = SmallVec<[SampleRange; 4]>;

/// Sliding-window click scanner over one fixed-size window.
///
/// Owns its scratch arrays so repeated scans reuse the same allocations.
/// The scanner always repairs its working buffer in place; callers that
/// only want detection hand it a scratch copy and keep just the spans.
pub struct ClickScanner {
    /// Squared sample energies. Refreshed in place after each repair so
    /// narrower probe passes see the repaired signal.
    sq: Box<[f32; WINDOW_SIZE]>,
    /// Pairwise-doubled energy sums; becomes the long-window mean square.
    acc: Box<[f32; WINDOW_SIZE]>,
}

impl ClickScanner {
    pub fn new() -> Self {
        Self {
            sq: Box::new([0.0; WINDOW_SIZE]),
            acc: Box::new([0.0; WINDOW_SIZE]),
        }
    }

    /// Scan one window, repairing clicks in place.
    ///
    /// Returns the repaired spans, window-local. `threshold` and `width`
    /// must be non-zero; the pass drivers short-circuit disabled settings
    /// before reaching the scanner.
    pub fn scan(
        &mut self,
        window: &mut [f32; WINDOW_SIZE],
        threshold: u32,
        width: usize,
    ) -> WindowSpans {
        debug_assert!(threshold > 0 && width > 0);
        let mut found = WindowSpans::new();

        for (sq, &s) in self.sq.iter_mut().zip(window.iter()) {
            *sq = s * s;
        }

        // Long-window mean square over the forward-looking half window,
        // O(W log W) by pairwise doubling: after the pass for `step`,
        // acc[j] holds the sum of 2*step consecutive energies.
        self.acc.copy_from_slice(&self.sq[..]);
        let mut step = 1;
        while step < HALF_WINDOW {
            for j in 0..WINDOW_SIZE - step {
                self.acc[j] += self.acc[j + step];
            }
            step *= 2;
        }
        // acc[i] now sums sq[i..i + HALF_WINDOW) for i < HALF_WINDOW.

        // Probe widths from coarse to fine: ww = width/wrc for wrc halving
        // from width/4 down to 1. width < 4 runs zero passes, so clicks
        // narrower than ~4 samples are never probed (historical behavior).
        let mut wrc = width / 4;
        while wrc >= 1 {
            let ww = width / wrc;
            if ww <= QUARTER_WINDOW {
                self.probe_pass(window, threshold as f32, ww, &mut found);
            }
            wrc /= 2;
        }
        found
    }

    /// One pass at a single probe width.
    fn probe_pass(
        &mut self,
        window: &mut [f32; WINDOW_SIZE],
        threshold: f32,
        ww: usize,
        found: &mut WindowSpans,
    ) {
        let mut candidate: Option<usize> = None;
        for i in 0..HALF_WINDOW {
            let probe_start = i + QUARTER_WINDOW;
            let ms_short =
                self.sq[probe_start..probe_start + ww].iter().sum::<f32>() / ww as f32;
            let ms_long = self.acc[i] / HALF_WINDOW as f32;

            if ms_short >= threshold * ms_long / 10.0 {
                if candidate.is_none() {
                    candidate = Some(i);
                }
            } else if let Some(start) = candidate.take() {
                // Width filter: only bursts at most twice the probe width
                // qualify; anything longer is program material.
                if i - start <= 2 * ww {
                    let left = start + QUARTER_WINDOW;
                    let right = i + ww + QUARTER_WINDOW;
                    self.repair(window, left, right);
                    found.push(SampleRange::new(left, right));
                }
            }
        }
        // An unterminated candidate at the end of the pass is discarded.
    }

    /// Replace `[left, right)` with the line between its boundary samples
    /// and refresh the squared energies over the repaired span.
    fn repair(&mut self, window: &mut [f32; WINDOW_SIZE], left: usize, right: usize) {
        let lv = window[left];
        let rv = window[right];
        let span = (right - left) as f32;
        for j in left..right {
            let t = (j - left) as f32;
            window[j] = (rv * t + lv * (span - t)) / span;
            self.sq[j] = window[j] * window[j];
        }
    }
}

impl Default for ClickScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject selections too short for one half-window step.
fn check_selection(len: usize) -> Result<()> {
    if len < HALF_WINDOW {
        return Err(ResonaError::SelectionTooShort {
            got: len,
            need: HALF_WINDOW,
        });
    }
    Ok(())
}

/// Click repair pass over a selection.
///
/// `threshold` is the sensitivity (larger = less sensitive); `width` is
/// the widest click expected, in samples. Either set to zero disables the
/// pass entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRemoval {
    pub threshold: u32,
    pub width: usize,
}

impl ClickRemoval {
    pub fn new(threshold: u32, width: usize) -> Self {
        Self { threshold, width }
    }

    /// Repair clicks in place. Returns whether anything changed.
    pub fn process(&self, samples: &mut [f32]) -> Result<bool> {
        self.process_with_progress(samples, |_| true)
    }

    /// Repair clicks in place, reporting progress between windows.
    ///
    /// `progress` receives the completed fraction after each window and
    /// returns whether to continue; declining aborts with
    /// [`ResonaError::Cancelled`]. Windows already written back stay
    /// repaired; rollback belongs to the caller's undo machinery.
    pub fn process_with_progress(
        &self,
        samples: &mut [f32],
        mut progress: impl FnMut(f32) -> bool,
    ) -> Result<bool> {
        if self.threshold == 0 || self.width == 0 {
            return Ok(false);
        }
        let len = samples.len();
        check_selection(len)?;
        debug!(
            "click removal: {} samples, threshold {}, width {}",
            len, self.threshold, self.width
        );

        let total = len.saturating_sub(HALF_WINDOW).div_ceil(HALF_WINDOW);
        let mut scanner = ClickScanner::new();
        let mut window = Box::new([0.0f32; WINDOW_SIZE]);
        let mut repaired = 0usize;
        let mut windows = 0usize;

        let mut start = 0;
        while start + HALF_WINDOW < len {
            let take = WINDOW_SIZE.min(len - start);
            window[..take].copy_from_slice(&samples[start..start + take]);
            window[take..].fill(0.0);

            let spans = scanner.scan(&mut *window, self.threshold, self.width);
            if !spans.is_empty() {
                samples[start..start + take].copy_from_slice(&window[..take]);
                repaired += spans.len();
            }

            start += HALF_WINDOW;
            windows += 1;
            if !progress(windows as f32 / total as f32) {
                return Err(ResonaError::Cancelled);
            }
        }

        info!(
            "click removal repaired {} spans across {} windows",
            repaired, windows
        );
        Ok(repaired > 0)
    }
}

impl Default for ClickRemoval {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_WIDTH)
    }
}

/// Click detection pass: reports defects as labeled regions and leaves
/// the audio untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindClicks {
    pub threshold: u32,
    pub width: usize,
}

impl FindClicks {
    pub fn new(threshold: u32, width: usize) -> Self {
        Self { threshold, width }
    }

    /// Detected clicks as absolute sample ranges, stitched across the
    /// overlapping windows.
    pub fn detect(&self, samples: &[f32]) -> Result<Vec<SampleRange>> {
        if self.threshold == 0 || self.width == 0 {
            return Ok(Vec::new());
        }
        let len = samples.len();
        check_selection(len)?;

        let mut scanner = ClickScanner::new();
        let mut window = Box::new([0.0f32; WINDOW_SIZE]);
        let mut ranges = Vec::new();

        let mut start = 0;
        while start + HALF_WINDOW < len {
            let take = WINDOW_SIZE.min(len - start);
            window[..take].copy_from_slice(&samples[start..start + take]);
            window[take..].fill(0.0);

            // The scanner repairs its working copy; the copy is discarded
            // and only the spans are kept.
            for span in scanner.scan(&mut *window, self.threshold, self.width) {
                let abs = span.offset_by(start);
                // A repair may run into the zero-padded tail.
                ranges.push(SampleRange::new(abs.start.min(len), abs.end.min(len)));
            }
            start += HALF_WINDOW;
        }

        let merged = merge_ranges(ranges);
        debug!("found {} clicks in {} samples", merged.len(), len);
        Ok(merged)
    }

    /// Detected clicks as labeled regions in seconds.
    pub fn analyze(&self, samples: &[f32], rate: SampleRate) -> Result<Vec<LabeledRegion>> {
        let ranges = self.detect(samples)?;
        Ok(ranges
            .into_iter()
            .map(|r| LabeledRegion::from_samples(r, rate, "Click"))
            .collect())
    }

    /// Per-channel detection fanned out across the rayon pool.
    ///
    /// Detection is read-only per channel, so channels are independent;
    /// each worker owns its scanner.
    pub fn analyze_channels(
        &self,
        channels: &[&[f32]],
        rate: SampleRate,
    ) -> Result<Vec<Vec<LabeledRegion>>> {
        channels
            .par_iter()
            .map(|channel| self.analyze(channel, rate))
            .collect()
    }
}

impl Default for FindClicks {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_WIDTH)
    }
}
