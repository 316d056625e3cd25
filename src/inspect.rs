//! Summary of an existing waveform data file

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use waveformdata_core::WaveformHeader;

/// What `waveformdata inspect` reports about a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    /// Format version (1 = summed, 2 = per-channel)
    pub version: u32,
    /// Bits per stored value
    pub bits: u8,
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// Window length in frames
    pub samples_per_pixel: u32,
    /// Data point count from the header
    pub data_points: u32,
    /// Channels stored per window
    pub channels: u32,
    /// Bytes of peak data actually present
    pub data_bytes: u64,
    /// Bytes of peak data the header promises
    pub expected_data_bytes: u64,
    /// Approximate duration covered by the data points
    pub duration_secs: f64,
    /// Whether payload size matches the header
    pub complete: bool,
}

impl InspectReport {
    /// Build a report from a parsed header and the payload size
    pub fn new(header: &WaveformHeader, data_bytes: u64) -> Self {
        let expected_data_bytes = header.expected_data_len();
        let duration_secs = if header.sample_rate > 0 {
            header.length as f64 * header.samples_per_pixel as f64 / header.sample_rate as f64
        } else {
            0.0
        };
        Self {
            version: header.version(),
            bits: header.bits.bits(),
            sample_rate: header.sample_rate,
            samples_per_pixel: header.samples_per_pixel,
            data_points: header.length,
            channels: header.stored_channels(),
            data_bytes,
            expected_data_bytes,
            duration_secs,
            complete: data_bytes == expected_data_bytes,
        }
    }
}

/// Read the header of the file at `path` and compare it with the file size
pub fn inspect(path: &Path) -> Result<InspectReport> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let file_len = file.metadata()?.len();
    let header = WaveformHeader::read_from(&mut BufReader::new(file))
        .with_context(|| format!("Failed to parse header of {}", path.display()))?;

    let data_bytes = file_len.saturating_sub(header.encoded_len() as u64);
    let report = InspectReport::new(&header, data_bytes);
    if !report.complete {
        tracing::warn!(
            path = %path.display(),
            data_bytes = report.data_bytes,
            expected = report.expected_data_bytes,
            "Payload size does not match header"
        );
    }
    Ok(report)
}
