//! Quantization of min/max pairs into waveform data points

use crate::error::WaveformError;
use serde::{Deserialize, Serialize};

/// Resolution of each stored min/max value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    /// Signed 8-bit values scaled by 127
    Eight,
    /// Signed 16-bit little-endian values scaled by 32767
    #[default]
    Sixteen,
}

impl BitDepth {
    /// Bits per stored value
    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    /// Bytes per stored value
    pub fn bytes_per_value(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }

    /// Largest positive magnitude representable
    pub fn full_scale(self) -> f32 {
        match self {
            BitDepth::Eight => i8::MAX as f32,
            BitDepth::Sixteen => i16::MAX as f32,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = WaveformError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(WaveformError::InvalidBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

/// Converts min/max pairs to little-endian signed integers
///
/// Values are scaled by [`BitDepth::full_scale`] and rounded half away from
/// zero. Inputs are expected in `[-1.0, 1.0]`; anything outside saturates at
/// the integer limits and NaN encodes as 0.
///
/// # Example
/// ```
/// use waveformdata_core::peaks::encoder::{BitDepth, PeakEncoder};
///
/// let encoder = PeakEncoder::new(BitDepth::Sixteen);
/// let mut out = Vec::new();
/// encoder.encode(-1.0, 1.0, &mut out);
/// assert_eq!(out, [0x01, 0x80, 0xff, 0x7f]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PeakEncoder {
    depth: BitDepth,
}

impl PeakEncoder {
    /// Create an encoder for the given depth
    pub fn new(depth: BitDepth) -> Self {
        Self { depth }
    }

    /// Configured depth
    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Bytes appended per [`Self::encode`] call
    pub fn point_size(&self) -> usize {
        2 * self.depth.bytes_per_value()
    }

    /// Scale and round one value to the configured integer range
    pub fn quantize(&self, value: f32) -> i16 {
        let scaled = (value * self.depth.full_scale()).round();
        match self.depth {
            BitDepth::Eight => scaled as i8 as i16,
            BitDepth::Sixteen => scaled as i16,
        }
    }

    /// Append one data point (`min` then `max`) to `out`
    pub fn encode(&self, min: f32, max: f32, out: &mut Vec<u8>) {
        for value in [min, max] {
            let q = self.quantize(value);
            match self.depth {
                BitDepth::Eight => out.extend_from_slice(&(q as i8).to_le_bytes()),
                BitDepth::Sixteen => out.extend_from_slice(&q.to_le_bytes()),
            }
        }
    }
}
