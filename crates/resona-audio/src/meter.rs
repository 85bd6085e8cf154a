//! Peak/RMS level metering published over the single-slot channel.

use crate::single_slot::SingleSlotChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One meter reading: peak and RMS level of a processed block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterFrame {
    /// Peak absolute sample value in the block.
    pub peak: f32,
    /// Root-mean-square level of the block.
    pub rms: f32,
}

/// Level meter fed from the audio thread and polled from the UI thread.
///
/// Cloning shares the underlying channel; the channel contract applies to
/// the pair: exactly one thread calls [`process_block`](Self::process_block)
/// and exactly one calls [`poll`](Self::poll).
#[derive(Clone)]
pub struct LevelMeter {
    channel: Arc<SingleSlotChannel<MeterFrame>>,
}

impl LevelMeter {
    /// Create a meter with no reading published yet.
    pub fn new() -> Self {
        debug!("level meter created");
        Self {
            channel: Arc::new(SingleSlotChannel::new()),
        }
    }

    /// Measure one block of samples and publish the reading.
    ///
    /// Audio-thread side. An empty block publishes nothing.
    pub fn process_block(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }
        let mut peak = 0.0f32;
        let mut sum = 0.0f64;
        for &s in samples {
            let a = s.abs();
            if a > peak {
                peak = a;
            }
            sum += s as f64 * s as f64;
        }
        let rms = (sum / samples.len() as f64).sqrt() as f32;
        self.channel.write(MeterFrame { peak, rms });
    }

    /// Take the most recent reading.
    ///
    /// UI-thread side. Returns the default (silent) frame when nothing new
    /// has been published since the last poll.
    pub fn poll(&self) -> MeterFrame {
        self.channel.read()
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
