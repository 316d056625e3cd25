//! Raw interleaved little-endian f32 input
//!
//! Upstream decoders (e.g. `ffmpeg -f f32le -`) emit a headerless stream of
//! interleaved 32-bit floats. [`FrameReader`] cuts that stream into blocks of
//! whole frames. A frame may straddle two `read` calls; the leftover bytes are
//! carried into the next block.

use std::io::{ErrorKind, Read};
use thiserror::Error;

/// Bytes per sample in the raw stream
pub const SAMPLE_BYTES: usize = 4;

/// Errors while reading raw input
#[derive(Error, Debug)]
pub enum RawInputError {
    #[error("Channel count must be non-zero")]
    NoChannels,

    #[error("Block of {block_frames} frames with {channels} channels is too large")]
    BlockTooLarge { channels: usize, block_frames: usize },

    #[error("Input ended with {0} bytes of an incomplete frame")]
    TrailingBytes(usize),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads blocks of whole interleaved frames
pub struct FrameReader<R> {
    reader: R,
    frame_bytes: usize,
    bytes: Vec<u8>,
    /// Bytes in `bytes` not yet converted
    filled: usize,
    samples: Vec<f32>,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader yielding at most `block_frames` frames per block
    pub fn new(reader: R, channels: usize, block_frames: usize) -> Result<Self, RawInputError> {
        if channels == 0 {
            return Err(RawInputError::NoChannels);
        }
        let too_large = || RawInputError::BlockTooLarge {
            channels,
            block_frames,
        };
        let frame_bytes = channels.checked_mul(SAMPLE_BYTES).ok_or_else(too_large)?;
        let capacity = frame_bytes
            .checked_mul(block_frames.max(1))
            .ok_or_else(too_large)?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity).map_err(|_| too_large())?;
        bytes.resize(capacity, 0u8);
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity / SAMPLE_BYTES)
            .map_err(|_| too_large())?;

        Ok(Self {
            reader,
            frame_bytes,
            bytes,
            filled: 0,
            samples,
        })
    }

    /// Next block of interleaved samples, `None` at a clean end of input
    pub fn next_block(&mut self) -> Result<Option<&[f32]>, RawInputError> {
        loop {
            let read = match self.reader.read(&mut self.bytes[self.filled..]) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if read == 0 {
                if self.filled == 0 {
                    return Ok(None);
                }
                return Err(RawInputError::TrailingBytes(self.filled));
            }

            self.filled += read;
            let whole = self.filled / self.frame_bytes * self.frame_bytes;
            if whole == 0 {
                continue;
            }

            self.samples.clear();
            self.samples.extend(
                self.bytes[..whole]
                    .chunks_exact(SAMPLE_BYTES)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            );
            self.bytes.copy_within(whole..self.filled, 0);
            self.filled -= whole;
            return Ok(Some(self.samples.as_slice()));
        }
    }
}
