//! Error type shared by every stage of the peak pipeline
//!
//! I/O and count-overflow errors are terminal for the stream that produced
//! them; a caller that wants to retry has to start a new [`crate::Pipeline`].
//! Invalid buffers and calls made in the wrong state leave the pipeline as it
//! was.

use thiserror::Error;

/// Errors that can occur while configuring or running a waveform pipeline
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("Window length must be within {min}..={max} seconds, got {value}")]
    InvalidWindowLength { value: f64, min: f64, max: f64 },

    #[error("Unsupported output bit depth: {0} (expected 8 or 16)")]
    InvalidBitDepth(u8),

    #[error("Invalid stream layout: {0}")]
    InvalidLayout(String),

    #[error("Window of {secs}s at {sample_rate} Hz rounds to zero samples")]
    ZeroLengthWindow { secs: f64, sample_rate: u32 },

    #[error("Failed to allocate state for {channels} channels")]
    Allocation { channels: usize },

    #[error("Invalid sample buffer: {0}")]
    InvalidBuffer(String),

    #[error("Operation not allowed in state {0}")]
    InvalidState(&'static str),

    #[error("Data point count exceeds the 32-bit header field")]
    CountOverflow,

    #[error("Malformed waveform data: {0}")]
    Format(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, WaveformError>;
