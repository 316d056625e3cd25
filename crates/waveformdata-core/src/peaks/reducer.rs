//! Windowed min/max reduction over arbitrarily chunked sample buffers
//!
//! Input buffers never line up with window boundaries. The reducer carries the
//! position inside the current window across calls, so splitting a stream into
//! buffers of any size produces exactly the same windows.

use super::accumulator::{ChannelAccumulator, ChannelStats};
use crate::error::{Result, WaveformError};

/// Receives each completed window before the accumulator is reset
pub trait WindowSink {
    /// Called once per completed (or flushed partial) window with the stats of
    /// every channel in declared order
    fn complete_window(&mut self, stats: &[ChannelStats]) -> Result<()>;
}

/// Drives sample consumption and window boundaries
///
/// # Example
/// ```
/// use waveformdata_core::peaks::accumulator::{ChannelAccumulator, ChannelStats, ResetPolicy};
/// use waveformdata_core::peaks::reducer::{WindowReducer, WindowSink};
///
/// struct Collect(Vec<(f32, f32)>);
///
/// impl WindowSink for Collect {
///     fn complete_window(&mut self, stats: &[ChannelStats]) -> waveformdata_core::Result<()> {
///         self.0.push(stats[0].peaks());
///         Ok(())
///     }
/// }
///
/// let acc = ChannelAccumulator::new(1, ResetPolicy::Extrema).unwrap();
/// let mut reducer = WindowReducer::new(acc, 4);
/// let mut sink = Collect(Vec::new());
///
/// reducer.consume_interleaved(&[0.1, 0.2, -0.3], &mut sink).unwrap();
/// reducer.consume_interleaved(&[0.4, 0.5], &mut sink).unwrap();
/// assert_eq!(sink.0, vec![(-0.3, 0.4)]);
/// assert_eq!(reducer.window_pos(), 1);
/// ```
#[derive(Debug)]
pub struct WindowReducer {
    accumulator: ChannelAccumulator,
    /// Frames folded into the current window
    window_pos: u64,
    /// Window length in frames
    tc_samples: u64,
    /// Frames consumed since creation
    frames_consumed: u64,
}

impl WindowReducer {
    /// Create a reducer closing a window every `tc_samples` frames
    ///
    /// `tc_samples` must be non-zero; [`crate::WaveformConfig::window_samples`]
    /// guarantees this.
    pub fn new(accumulator: ChannelAccumulator, tc_samples: u64) -> Self {
        debug_assert!(tc_samples > 0, "window length must be non-zero");
        Self {
            accumulator,
            window_pos: 0,
            tc_samples,
            frames_consumed: 0,
        }
    }

    /// Number of channels per frame
    pub fn channels(&self) -> usize {
        self.accumulator.channels()
    }

    /// Frames accumulated into the current partial window
    pub fn window_pos(&self) -> u64 {
        self.window_pos
    }

    /// Window length in frames
    pub fn window_samples(&self) -> u64 {
        self.tc_samples
    }

    /// Total frames consumed
    pub fn frames_consumed(&self) -> u64 {
        self.frames_consumed
    }

    /// Consume `frames` frames of planar (one slice per channel) input
    ///
    /// The buffer is walked in chunks bounded by the room left in the current
    /// window, so several windows may complete inside one call.
    pub fn consume_planar<S: WindowSink>(
        &mut self,
        planes: &[&[f32]],
        frames: usize,
        sink: &mut S,
    ) -> Result<()> {
        if planes.len() != self.channels() {
            return Err(WaveformError::InvalidBuffer(format!(
                "expected {} planes, got {}",
                self.channels(),
                planes.len()
            )));
        }
        if let Some((channel, plane)) = planes.iter().enumerate().find(|(_, p)| p.len() < frames) {
            return Err(WaveformError::InvalidBuffer(format!(
                "plane {} holds {} samples, expected at least {}",
                channel,
                plane.len(),
                frames
            )));
        }

        let mut offset = 0usize;
        while offset < frames {
            let room = self.tc_samples - self.window_pos;
            let chunk = room.min((frames - offset) as u64) as usize;
            let end = offset + chunk;

            for (channel, plane) in planes.iter().enumerate() {
                self.accumulator.update_channel(channel, &plane[offset..end]);
            }

            self.window_pos += chunk as u64;
            self.frames_consumed += chunk as u64;
            offset = end;

            if self.window_pos == self.tc_samples {
                self.complete(sink)?;
            }
        }
        Ok(())
    }

    /// Consume interleaved input (`channels` samples per frame)
    pub fn consume_interleaved<S: WindowSink>(
        &mut self,
        samples: &[f32],
        sink: &mut S,
    ) -> Result<()> {
        let channels = self.channels();
        if samples.len() % channels != 0 {
            return Err(WaveformError::InvalidBuffer(format!(
                "{} interleaved samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }

        for frame in samples.chunks_exact(channels) {
            self.accumulator.update_frame(frame);
            self.window_pos += 1;
            self.frames_consumed += 1;
            if self.window_pos == self.tc_samples {
                self.complete(sink)?;
            }
        }
        Ok(())
    }

    /// Emit the current partial window, if any
    ///
    /// Returns whether a window was emitted.
    pub fn flush<S: WindowSink>(&mut self, sink: &mut S) -> Result<bool> {
        if self.window_pos == 0 {
            return Ok(false);
        }
        self.complete(sink)?;
        Ok(true)
    }

    fn complete<S: WindowSink>(&mut self, sink: &mut S) -> Result<()> {
        let result = sink.complete_window(self.accumulator.stats());
        self.accumulator.reset();
        self.window_pos = 0;
        result
    }
}
