//! Peak extraction
//!
//! - Per-channel min/max tracking ([`accumulator`])
//! - Window boundaries over chunked input ([`reducer`])
//! - Quantization of min/max pairs ([`encoder`])
//! - The push-based stream pipeline tying them together ([`pipeline`])

pub mod accumulator;
pub mod encoder;
pub mod pipeline;
pub mod reducer;
