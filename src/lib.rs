//! Waveformdata - binary waveform data generator
//!
//! This library re-exports the peak extraction pipeline and file format from
//! `waveformdata-core`, and adds the raw-stream reader and file inspection
//! used by the `waveformdata` command line tool.

pub mod inspect;
pub mod raw_input;

pub use waveformdata_core::{config, error, format, peaks};

pub use waveformdata_core::{
    BitDepth, ChannelStats, Destination, Pipeline, PipelineState, PipelineSummary, ResetPolicy,
    SampleBuffer, StreamLayout, WaveformConfig, WaveformError, WaveformHeader,
};
pub use waveformdata_core::{BUILD_DATE, DEFAULT_WINDOW_SECS, VERSION};
