//! Streaming writer for waveform data files
//!
//! The header goes out first with a zero data point count. Peak bytes are then
//! appended as windows complete, and [`WaveformWriter::finalize`] seeks back to
//! [`COUNT_OFFSET`] to patch in the real count.
//!
//! A writer without a destination discards everything but still counts
//! windows, so a pipeline without output behaves identically apart from I/O.

use super::header::{WaveformHeader, COUNT_OFFSET};
use crate::error::{Result, WaveformError};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Byte destination a waveform file can be written to
pub trait WaveformSink: Write + Seek + Send {}

impl<T: Write + Seek + Send> WaveformSink for T {}

/// Writes the header, streams peak bytes and patches the count on finalize
pub struct WaveformWriter {
    sink: Option<Box<dyn WaveformSink>>,
    header_written: bool,
    /// Completed windows
    blocks: u32,
    /// Bytes handed to the sink, header included
    bytes_written: u64,
}

impl std::fmt::Debug for WaveformWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformWriter")
            .field("enabled", &self.sink.is_some())
            .field("header_written", &self.header_written)
            .field("blocks", &self.blocks)
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}

impl WaveformWriter {
    /// Create (or truncate) the file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to create waveform file");
            e
        })?;
        tracing::debug!(path = %path.display(), "Opened waveform file");
        Ok(Self::from_sink(Box::new(BufWriter::with_capacity(8192, file))))
    }

    /// Write into an arbitrary seekable sink
    pub fn from_sink(sink: Box<dyn WaveformSink>) -> Self {
        Self {
            sink: Some(sink),
            header_written: false,
            blocks: 0,
            bytes_written: 0,
        }
    }

    /// Writer with no destination: counts windows, performs no I/O
    pub fn discard() -> Self {
        Self {
            sink: None,
            header_written: false,
            blocks: 0,
            bytes_written: 0,
        }
    }

    /// Whether bytes actually reach a destination
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Completed windows so far
    pub fn blocks(&self) -> u32 {
        self.blocks
    }

    /// Bytes written so far, header included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Emit the header with the count field zeroed
    pub fn write_header(&mut self, header: &WaveformHeader) -> Result<()> {
        if self.header_written {
            return Err(WaveformError::InvalidState("header already written"));
        }
        let placeholder = WaveformHeader { length: 0, ..*header };
        self.header_written = true;
        self.write_bytes(&placeholder.to_bytes())?;
        tracing::debug!(
            version = placeholder.version(),
            flags = placeholder.flags(),
            sample_rate = placeholder.sample_rate,
            samples_per_pixel = placeholder.samples_per_pixel,
            "Wrote waveform header"
        );
        Ok(())
    }

    /// Append encoded peak bytes
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.header_written {
            return Err(WaveformError::InvalidState("header not written"));
        }
        self.write_bytes(bytes)
    }

    /// Append the encoded points of one completed window and count it
    ///
    /// Fails with [`WaveformError::CountOverflow`] before writing anything
    /// once the count no longer fits the 32-bit header field.
    pub fn write_block(&mut self, bytes: &[u8]) -> Result<()> {
        let blocks = self
            .blocks
            .checked_add(1)
            .ok_or(WaveformError::CountOverflow)?;
        self.append(bytes)?;
        self.blocks = blocks;
        Ok(())
    }

    /// Patch the data point count and close the sink
    ///
    /// Returns the total number of bytes in the file.
    pub fn finalize(mut self) -> Result<u64> {
        if !self.header_written {
            return Err(WaveformError::InvalidState("header not written"));
        }
        if let Some(mut sink) = self.sink.take() {
            let end = sink.stream_position()?;
            sink.seek(SeekFrom::Start(COUNT_OFFSET))?;
            sink.write_all(&self.blocks.to_le_bytes())?;
            sink.seek(SeekFrom::Start(end))?;
            sink.flush()?;
        }
        tracing::debug!(
            blocks = self.blocks,
            bytes = self.bytes_written,
            "Finalized waveform file"
        );
        Ok(self.bytes_written)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.write_all(bytes)?;
            self.bytes_written += bytes.len() as u64;
        }
        Ok(())
    }
}
