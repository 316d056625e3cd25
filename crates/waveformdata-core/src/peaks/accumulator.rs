//! Per-channel running min/max tracking for the current window
//!
//! Each channel owns one [`ChannelStats`]. The [`ChannelAccumulator`] keeps one
//! per declared channel and is read then reset every time a window completes.

use crate::error::{Result, WaveformError};
use serde::{Deserialize, Serialize};

/// Value a channel's min/max is reset to at stream start and after every window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Start every window at `(+inf, -inf)` so the reported pair is the true
    /// extrema of the window. A channel that saw no samples reads as `(0, 0)`.
    #[default]
    Extrema,
    /// Start every window at `(0, 0)`.
    ///
    /// Matches files produced by the legacy filter bit for bit: a window holding
    /// only positive samples still reports `min = 0`, and vice versa.
    ZeroAnchored,
}

impl ResetPolicy {
    /// Initial stats for a fresh window under this policy
    pub fn initial(self) -> ChannelStats {
        match self {
            ResetPolicy::Extrema => ChannelStats::EMPTY,
            ResetPolicy::ZeroAnchored => ChannelStats::ZERO,
        }
    }
}

/// Running min/max of one channel
///
/// NaN samples never update either bound: both `sample > max` and
/// `sample < min` are false for NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    /// Smallest sample seen in the current window
    pub min: f32,
    /// Largest sample seen in the current window
    pub max: f32,
}

impl ChannelStats {
    /// Zero-anchored starting point
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    /// Sentinel that any real sample replaces
    pub const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Fold one sample into the running min/max
    #[inline]
    pub fn update(&mut self, sample: f32) {
        if sample > self.max {
            self.max = sample;
        }
        if sample < self.min {
            self.min = sample;
        }
    }

    /// Fold a contiguous run of samples
    pub fn update_slice(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.update(sample);
        }
    }

    /// True while still holding the [`Self::EMPTY`] sentinel
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Min/max pair to emit, mapping an untouched sentinel to `(0, 0)`
    pub fn peaks(&self) -> (f32, f32) {
        if self.is_empty() {
            (0.0, 0.0)
        } else {
            (self.min, self.max)
        }
    }
}

/// One [`ChannelStats`] per declared channel
#[derive(Debug, Clone)]
pub struct ChannelAccumulator {
    stats: Vec<ChannelStats>,
    policy: ResetPolicy,
}

impl ChannelAccumulator {
    /// Allocate state for `channels` channels
    ///
    /// Allocation failure is reported as [`WaveformError::Allocation`] instead
    /// of aborting the process.
    pub fn new(channels: usize, policy: ResetPolicy) -> Result<Self> {
        let mut stats = Vec::new();
        stats
            .try_reserve_exact(channels)
            .map_err(|_| WaveformError::Allocation { channels })?;
        stats.resize(channels, policy.initial());
        Ok(Self { stats, policy })
    }

    /// Number of channels tracked
    pub fn channels(&self) -> usize {
        self.stats.len()
    }

    /// Reset policy in effect
    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    /// Fold a run of samples belonging to one channel
    #[inline]
    pub fn update_channel(&mut self, channel: usize, samples: &[f32]) {
        self.stats[channel].update_slice(samples);
    }

    /// Fold one interleaved frame (one sample per channel)
    #[inline]
    pub fn update_frame(&mut self, frame: &[f32]) {
        for (stats, &sample) in self.stats.iter_mut().zip(frame) {
            stats.update(sample);
        }
    }

    /// Current stats in declared channel order
    pub fn stats(&self) -> &[ChannelStats] {
        &self.stats
    }

    /// Restore every channel to the policy's starting value
    pub fn reset(&mut self) {
        let initial = self.policy.initial();
        self.stats.fill(initial);
    }
}
