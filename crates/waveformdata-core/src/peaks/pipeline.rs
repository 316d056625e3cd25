//! Push-based peak extraction pipeline
//!
//! Ties the stages together for one audio stream:
//!
//! ```text
//! push(buffer) → WindowReducer → (window complete) → PeakEncoder → WaveformWriter
//! ```
//!
//! The pipeline is a small state machine. [`Pipeline::configure`] moves it from
//! `Unconfigured` to `Ready` once the stream layout is known, [`Pipeline::push`]
//! is only valid while `Ready`, and [`Pipeline::finalize`] flushes the partial
//! window, patches the file header and moves to `Finalized`.
//!
//! Any I/O or count-overflow error moves the pipeline to `Failed`, from which
//! every further call is rejected. Malformed buffers and calls made in the
//! wrong state are reported without changing state.
//!
//! Dropping a `Ready` pipeline without finalizing leaves the output with a
//! zero data point count; such files must be treated as malformed.

use super::accumulator::{ChannelAccumulator, ChannelStats};
use super::encoder::PeakEncoder;
use super::reducer::{WindowReducer, WindowSink};
use crate::config::{StreamLayout, WaveformConfig};
use crate::error::{Result, WaveformError};
use crate::format::header::WaveformHeader;
use crate::format::writer::{WaveformSink, WaveformWriter};
use std::path::PathBuf;

/// Where the waveform file goes
pub enum Destination {
    /// Nothing is written; windows are still computed and counted
    Discard,
    /// Create (or truncate) a file
    File(PathBuf),
    /// Any seekable byte sink
    Stream(Box<dyn WaveformSink>),
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Discard => write!(f, "Discard"),
            Destination::File(path) => f.debug_tuple("File").field(path).finish(),
            Destination::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// One buffer of 32-bit float samples
#[derive(Debug, Clone, Copy)]
pub enum SampleBuffer<'a> {
    /// One slice per channel, each holding at least `frames` samples
    Planar {
        /// Channel planes in declared order
        planes: &'a [&'a [f32]],
        /// Frames to consume from each plane
        frames: usize,
    },
    /// Frames stored back to back, one sample per channel
    Interleaved(&'a [f32]),
}

/// Observes every window before its stats are reset
///
/// Closures of the form `FnMut(u64, &[ChannelStats])` implement this.
pub trait PeakObserver: Send {
    /// Called with the zero-based window index and per-channel stats
    fn on_window(&mut self, index: u64, stats: &[ChannelStats]);
}

impl<F> PeakObserver for F
where
    F: FnMut(u64, &[ChannelStats]) + Send,
{
    fn on_window(&mut self, index: u64, stats: &[ChannelStats]) {
        self(index, stats)
    }
}

/// Lifecycle state of a [`Pipeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for the stream layout
    Unconfigured,
    /// Accepting sample buffers
    Ready,
    /// Finished; the file is complete
    Finalized,
    /// Stopped by an error; the output is incomplete
    Failed,
}

impl PipelineState {
    fn name(self) -> &'static str {
        match self {
            PipelineState::Unconfigured => "unconfigured",
            PipelineState::Ready => "ready",
            PipelineState::Finalized => "finalized",
            PipelineState::Failed => "failed",
        }
    }
}

/// Totals reported by [`Pipeline::finalize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Windows written (the header's data point count)
    pub windows: u64,
    /// Frames consumed
    pub frames: u64,
    /// File size in bytes (0 without a destination)
    pub bytes_written: u64,
    /// Whether the last window was a partial one flushed at stream end
    pub partial_flushed: bool,
}

/// Block completion: encodes a finished window and hands it to the writer
struct PeakEmitter {
    encoder: PeakEncoder,
    writer: WaveformWriter,
    split_channels: bool,
    observer: Option<Box<dyn PeakObserver>>,
    scratch: Vec<u8>,
}

impl WindowSink for PeakEmitter {
    fn complete_window(&mut self, stats: &[ChannelStats]) -> Result<()> {
        let index = self.writer.blocks() as u64;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_window(index, stats);
        }

        self.scratch.clear();
        if self.split_channels {
            for (channel, s) in stats.iter().enumerate() {
                let (min, max) = s.peaks();
                tracing::trace!(window = index, channel, min, max, "Window peaks");
                self.encoder.encode(min, max, &mut self.scratch);
            }
        } else {
            let mut min_sum = 0.0f32;
            let mut max_sum = 0.0f32;
            for (channel, s) in stats.iter().enumerate() {
                let (min, max) = s.peaks();
                tracing::trace!(window = index, channel, min, max, "Window peaks");
                min_sum += min;
                max_sum += max;
            }
            let channels = stats.len() as f32;
            self.encoder
                .encode(min_sum / channels, max_sum / channels, &mut self.scratch);
        }

        self.writer.write_block(&self.scratch)
    }
}

struct Running {
    reducer: WindowReducer,
    emitter: PeakEmitter,
}

enum Stage {
    Unconfigured,
    Ready(Box<Running>),
    Finalized(PipelineSummary),
    Failed,
}

impl Stage {
    fn state(&self) -> PipelineState {
        match self {
            Stage::Unconfigured => PipelineState::Unconfigured,
            Stage::Ready(_) => PipelineState::Ready,
            Stage::Finalized(_) => PipelineState::Finalized,
            Stage::Failed => PipelineState::Failed,
        }
    }
}

/// Streaming peak extractor for one audio stream
///
/// # Example
/// ```
/// use waveformdata_core::{Pipeline, StreamLayout, WaveformConfig};
///
/// let config = WaveformConfig {
///     window_secs: 0.01,
///     ..Default::default()
/// };
/// let mut pipeline = Pipeline::new(config);
/// pipeline.configure(StreamLayout::new(2, 8000)).unwrap();
///
/// // 200 stereo frames = 2.5 windows of 80 frames
/// let frames = vec![0.25f32; 400];
/// pipeline.push_interleaved(&frames).unwrap();
///
/// let summary = pipeline.finalize().unwrap();
/// assert_eq!(summary.windows, 3);
/// assert!(summary.partial_flushed);
/// ```
pub struct Pipeline {
    config: WaveformConfig,
    destination: Option<Destination>,
    observer: Option<Box<dyn PeakObserver>>,
    stage: Stage,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("windows", &self.windows_completed())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline writing to `config.output`, or nowhere if unset
    pub fn new(config: WaveformConfig) -> Self {
        let destination = match &config.output {
            Some(path) => Destination::File(path.clone()),
            None => Destination::Discard,
        };
        Self::with_destination(config, destination)
    }

    /// Create a pipeline with an explicit destination, ignoring `config.output`
    pub fn with_destination(config: WaveformConfig, destination: Destination) -> Self {
        Self {
            config,
            destination: Some(destination),
            observer: None,
            stage: Stage::Unconfigured,
        }
    }

    /// Register an observer notified of every window
    pub fn with_observer<O: PeakObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.stage.state()
    }

    /// Windows emitted so far
    pub fn windows_completed(&self) -> u64 {
        match &self.stage {
            Stage::Unconfigured | Stage::Failed => 0,
            Stage::Ready(running) => running.emitter.writer.blocks() as u64,
            Stage::Finalized(summary) => summary.windows,
        }
    }

    /// Window length in frames, known once configured
    pub fn window_samples(&self) -> Option<u64> {
        match &self.stage {
            Stage::Ready(running) => Some(running.reducer.window_samples()),
            _ => None,
        }
    }

    /// Fix the stream layout, allocate state, open the destination and write
    /// the header
    ///
    /// Any failure here happens before a single sample is processed. Invalid
    /// options or layouts leave the pipeline `Unconfigured`; once the
    /// destination has been handed to the writer, a failure to open it or to
    /// write the header moves the pipeline to `Failed`.
    pub fn configure(&mut self, layout: StreamLayout) -> Result<()> {
        if !matches!(self.stage, Stage::Unconfigured) {
            return Err(WaveformError::InvalidState(self.state().name()));
        }
        layout.validate()?;
        let tc_samples = self.config.window_samples(layout.sample_rate)?;
        let accumulator = ChannelAccumulator::new(layout.channels, self.config.reset_policy)?;

        // Both fit u32: checked by layout.validate() and window_samples()
        let header = if self.config.split_channels {
            WaveformHeader::per_channel(
                self.config.bits,
                layout.sample_rate,
                tc_samples as u32,
                layout.channels as u32,
            )
        } else {
            WaveformHeader::summed(self.config.bits, layout.sample_rate, tc_samples as u32)
        };

        let destination = self.destination.take().unwrap_or(Destination::Discard);
        let destination_desc = match &destination {
            Destination::Discard => "none".to_string(),
            Destination::File(path) => path.display().to_string(),
            Destination::Stream(_) => "stream".to_string(),
        };
        let writer = match open_writer(destination, &header) {
            Ok(writer) => writer,
            Err(e) => {
                tracing::error!(
                    destination = %destination_desc,
                    error = %e,
                    "Failed to start waveform output"
                );
                self.stage = Stage::Failed;
                return Err(e);
            }
        };

        let encoder = PeakEncoder::new(self.config.bits);
        let emitter = PeakEmitter {
            encoder,
            writer,
            split_channels: self.config.split_channels,
            observer: self.observer.take(),
            scratch: Vec::with_capacity(encoder.point_size() * layout.channels),
        };

        tracing::info!(
            channels = layout.channels,
            sample_rate = layout.sample_rate,
            window_secs = self.config.window_secs,
            window_samples = tc_samples,
            bits = self.config.bits.bits(),
            split_channels = self.config.split_channels,
            destination = %destination_desc,
            "Waveform pipeline configured"
        );

        self.stage = Stage::Ready(Box::new(Running {
            reducer: WindowReducer::new(accumulator, tc_samples),
            emitter,
        }));
        Ok(())
    }

    /// Consume one buffer
    ///
    /// The buffer is only read, so the caller can forward it downstream
    /// unchanged afterwards.
    pub fn push(&mut self, buffer: SampleBuffer<'_>) -> Result<()> {
        let state = self.state();
        let Stage::Ready(running) = &mut self.stage else {
            return Err(WaveformError::InvalidState(state.name()));
        };
        let Running { reducer, emitter } = running.as_mut();
        let result = match buffer {
            SampleBuffer::Planar { planes, frames } => {
                reducer.consume_planar(planes, frames, emitter)
            }
            SampleBuffer::Interleaved(samples) => reducer.consume_interleaved(samples, emitter),
        };
        // Malformed buffers are rejected before any sample is folded in
        if let Err(e) = &result {
            if !matches!(e, WaveformError::InvalidBuffer(_)) {
                tracing::error!(error = %e, "Waveform pipeline failed");
                self.stage = Stage::Failed;
            }
        }
        result
    }

    /// Consume planar input
    pub fn push_planar(&mut self, planes: &[&[f32]], frames: usize) -> Result<()> {
        self.push(SampleBuffer::Planar { planes, frames })
    }

    /// Consume interleaved input
    pub fn push_interleaved(&mut self, samples: &[f32]) -> Result<()> {
        self.push(SampleBuffer::Interleaved(samples))
    }

    /// Flush the partial window, patch the header and close the destination
    ///
    /// If this fails the pipeline ends up `Failed` and the output must be
    /// treated as incomplete.
    pub fn finalize(&mut self) -> Result<PipelineSummary> {
        let running = match std::mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Ready(running) => running,
            other => {
                let state = other.state();
                self.stage = other;
                return Err(WaveformError::InvalidState(state.name()));
            }
        };
        let Running {
            mut reducer,
            mut emitter,
        } = *running;

        let partial_flushed = reducer.flush(&mut emitter)?;
        if partial_flushed {
            tracing::debug!("Flushed partial window at stream end");
        }

        let windows = emitter.writer.blocks() as u64;
        let bytes_written = emitter.writer.finalize()?;
        let summary = PipelineSummary {
            windows,
            frames: reducer.frames_consumed(),
            bytes_written,
            partial_flushed,
        };
        self.stage = Stage::Finalized(summary);

        tracing::info!(
            windows = summary.windows,
            frames = summary.frames,
            bytes = summary.bytes_written,
            "Waveform pipeline finalized"
        );
        Ok(summary)
    }
}

/// Open the destination and write the placeholder header
fn open_writer(destination: Destination, header: &WaveformHeader) -> Result<WaveformWriter> {
    let mut writer = match destination {
        Destination::Discard => WaveformWriter::discard(),
        Destination::File(path) => WaveformWriter::open(&path)?,
        Destination::Stream(sink) => WaveformWriter::from_sink(sink),
    };
    writer.write_header(header)?;
    Ok(writer)
}
