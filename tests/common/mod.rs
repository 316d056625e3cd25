//! Shared helpers for the end-to-end tests

#![allow(dead_code)]

use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Seekable in-memory sink that counts every write and seek
///
/// Clones share the same buffer and counters, so the test keeps a handle
/// after the pipeline has taken ownership of the boxed sink.
#[derive(Clone, Default)]
pub struct CountingSink {
    buffer: Arc<Mutex<Cursor<Vec<u8>>>>,
    writes: Arc<AtomicU64>,
    seeks: Arc<AtomicU64>,
}

impl CountingSink {
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().unwrap().get_ref().clone()
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn seeks(&self) -> u64 {
        self.seeks.load(Ordering::Relaxed)
    }

    pub fn io_calls(&self) -> u64 {
        self.writes() + self.seeks()
    }
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.buffer.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for CountingSink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seeks.fetch_add(1, Ordering::Relaxed);
        self.buffer.lock().unwrap().seek(pos)
    }
}

/// Sink whose writes start failing after `budget` bytes
pub struct FailingSink {
    budget: usize,
}

impl FailingSink {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::other("no space left on device"));
        }
        self.budget -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FailingSink {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

/// Wraps a [`CountingSink`] and fails exactly one write call (1-based)
pub struct FlakySink {
    inner: CountingSink,
    fail_on: u64,
    calls: u64,
}

impl FlakySink {
    pub fn new(inner: CountingSink, fail_on: u64) -> Self {
        Self {
            inner,
            fail_on,
            calls: 0,
        }
    }
}

impl Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(io::Error::other("transient write failure"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for FlakySink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Little-endian i16 pairs of a 16-bit payload
pub fn i16_values(payload: &[u8]) -> Vec<i16> {
    payload
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Little-endian u32 at `offset`
pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Deterministic test signal in [-1, 1]
pub fn sine(frames: usize, freq: f32, sample_rate: u32) -> Vec<f32> {
    (0..frames)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}
