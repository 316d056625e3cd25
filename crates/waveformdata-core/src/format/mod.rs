//! Binary waveform data file format
//!
//! A fixed little-endian header ([`header`]) followed by one min/max point per
//! window (or per channel per window). [`writer`] streams the file and patches
//! the point count once the stream ends.

pub mod header;
pub mod writer;
