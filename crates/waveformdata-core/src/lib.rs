//! Waveformdata Core - Streaming peak extraction and waveform data files
//!
//! Reduces a multichannel 32-bit float sample stream to fixed-length min/max
//! windows and writes them as a compact binary waveform file that
//! waveform renderers (peaks.js, audiowaveform) can load directly.
//!
//! Decoding and resampling happen upstream; this crate only sees raw frames.

pub mod config;
pub mod error;
pub mod format;
pub mod peaks;

pub use config::{StreamLayout, WaveformConfig};
pub use error::{Result, WaveformError};
pub use format::header::WaveformHeader;
pub use format::writer::{WaveformSink, WaveformWriter};
pub use peaks::accumulator::{ChannelAccumulator, ChannelStats, ResetPolicy};
pub use peaks::encoder::{BitDepth, PeakEncoder};
pub use peaks::pipeline::{
    Destination, PeakObserver, Pipeline, PipelineState, PipelineSummary, SampleBuffer,
};
pub use peaks::reducer::{WindowReducer, WindowSink};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (YYYY-MM-DD) stamped by build.rs
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Default window length in seconds
pub const DEFAULT_WINDOW_SECS: f64 = 3.0;

/// Shortest accepted window length in seconds
pub const MIN_WINDOW_SECS: f64 = 0.01;

/// Longest accepted window length in seconds
pub const MAX_WINDOW_SECS: f64 = 100.0;
