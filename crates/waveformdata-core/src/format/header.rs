//! Fixed header of the binary waveform data file

use crate::error::{Result, WaveformError};
use crate::peaks::encoder::BitDepth;
use std::io::Read;

/// Byte offset of the data point count, patched on finalize
pub const COUNT_OFFSET: u64 = 16;

/// Header length without the channel count field (version 1)
pub const HEADER_LEN_V1: usize = 20;

/// Header length with the channel count field (version 2)
pub const HEADER_LEN_V2: usize = 24;

/// Flag bit set when data points are 8-bit
pub const FLAG_8BIT: u32 = 0x1;

/// Waveform file header
///
/// | Offset | Field |
/// |---|---|
/// | 0 | version (1 = summed, 2 = per-channel) |
/// | 4 | flags (bit 0 = 8-bit points) |
/// | 8 | sample rate |
/// | 12 | samples per pixel |
/// | 16 | data point count |
/// | 20 | channel count (version 2 only) |
///
/// All fields are little-endian `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformHeader {
    /// Resolution of each stored value
    pub bits: BitDepth,
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// Window length in frames
    pub samples_per_pixel: u32,
    /// Number of windows stored
    pub length: u32,
    /// Channel count for per-channel files, `None` for summed files
    pub channels: Option<u32>,
}

impl WaveformHeader {
    /// Header for a file holding one summed point per window
    pub fn summed(bits: BitDepth, sample_rate: u32, samples_per_pixel: u32) -> Self {
        Self {
            bits,
            sample_rate,
            samples_per_pixel,
            length: 0,
            channels: None,
        }
    }

    /// Header for a file holding one point per channel per window
    pub fn per_channel(
        bits: BitDepth,
        sample_rate: u32,
        samples_per_pixel: u32,
        channels: u32,
    ) -> Self {
        Self {
            channels: Some(channels),
            ..Self::summed(bits, sample_rate, samples_per_pixel)
        }
    }

    /// Format version: 2 when a channel count is present
    pub fn version(&self) -> u32 {
        if self.channels.is_some() {
            2
        } else {
            1
        }
    }

    /// Flags word
    pub fn flags(&self) -> u32 {
        match self.bits {
            BitDepth::Eight => FLAG_8BIT,
            BitDepth::Sixteen => 0,
        }
    }

    /// Number of channels whose points are stored per window
    pub fn stored_channels(&self) -> u32 {
        self.channels.unwrap_or(1)
    }

    /// Encoded header size in bytes
    pub fn encoded_len(&self) -> usize {
        if self.channels.is_some() {
            HEADER_LEN_V2
        } else {
            HEADER_LEN_V1
        }
    }

    /// Bytes of peak data per window
    pub fn window_len(&self) -> u64 {
        2 * self.bits.bytes_per_value() as u64 * self.stored_channels() as u64
    }

    /// Payload size implied by [`Self::length`]
    pub fn expected_data_len(&self) -> u64 {
        self.length as u64 * self.window_len()
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.version().to_le_bytes());
        out.extend_from_slice(&self.flags().to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.samples_per_pixel.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        if let Some(channels) = self.channels {
            out.extend_from_slice(&channels.to_le_bytes());
        }
        out
    }

    /// Parse a header, leaving the reader positioned at the first data point
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fixed = [0u8; HEADER_LEN_V1];
        reader.read_exact(&mut fixed)?;

        let field =
            |i: usize| u32::from_le_bytes([fixed[i], fixed[i + 1], fixed[i + 2], fixed[i + 3]]);
        let version = field(0);
        let flags = field(4);
        if flags & !FLAG_8BIT != 0 {
            return Err(WaveformError::Format(format!("unknown flags {:#x}", flags)));
        }

        let bits = if flags & FLAG_8BIT != 0 {
            BitDepth::Eight
        } else {
            BitDepth::Sixteen
        };

        let channels = match version {
            1 => None,
            2 => {
                let mut word = [0u8; 4];
                reader.read_exact(&mut word)?;
                let channels = u32::from_le_bytes(word);
                if channels == 0 {
                    return Err(WaveformError::Format(
                        "version 2 header with zero channels".to_string(),
                    ));
                }
                Some(channels)
            }
            other => {
                return Err(WaveformError::Format(format!(
                    "unsupported version {}",
                    other
                )))
            }
        };

        Ok(Self {
            bits,
            sample_rate: field(8),
            samples_per_pixel: field(12),
            length: field(16),
            channels,
        })
    }
}
