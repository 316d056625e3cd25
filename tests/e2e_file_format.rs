//! E2E tests for the on-disk waveform data format
//!
//! Writes real files through the pipeline and checks the header layout,
//! value encoding and that `inspect` reads them back consistently.

mod common;

use common::{i16_values, sine, u32_at};
use std::io::Cursor;
use waveformdata::inspect::inspect;
use waveformdata::{BitDepth, Pipeline, StreamLayout, WaveformConfig, WaveformHeader};

fn write_file(config: WaveformConfig, layout: StreamLayout, interleaved: &[f32]) -> Vec<u8> {
    let path = config.output.clone().expect("test config needs an output path");
    let mut pipeline = Pipeline::new(config);
    pipeline.configure(layout).unwrap();
    pipeline.push_interleaved(interleaved).unwrap();
    pipeline.finalize().unwrap();
    std::fs::read(path).unwrap()
}

#[test]
fn test_summed_header_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = WaveformConfig {
        window_secs: 0.5,
        output: Some(dir.path().join("summed.dat")),
        ..Default::default()
    };
    // 44100 Hz, 1.2s mono = 2 full windows + 1 partial
    let bytes = write_file(config, StreamLayout::new(1, 44100), &sine(52920, 440.0, 44100));

    assert_eq!(u32_at(&bytes, 0), 1, "version");
    assert_eq!(u32_at(&bytes, 4), 0, "flags");
    assert_eq!(u32_at(&bytes, 8), 44100, "sample rate");
    assert_eq!(u32_at(&bytes, 12), 22050, "samples per pixel");
    assert_eq!(u32_at(&bytes, 16), 3, "data points");
    assert_eq!(bytes.len(), 20 + 3 * 4);
}

#[test]
fn test_split_channel_header_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = WaveformConfig {
        window_secs: 0.01,
        split_channels: true,
        bits: BitDepth::Eight,
        output: Some(dir.path().join("split.dat")),
        ..Default::default()
    };
    // 3 channels, exactly 4 windows of 480 frames at 48 kHz
    let interleaved = vec![0.0f32; 3 * 480 * 4];
    let bytes = write_file(config, StreamLayout::new(3, 48000), &interleaved);

    assert_eq!(u32_at(&bytes, 0), 2, "version");
    assert_eq!(u32_at(&bytes, 4), 1, "8-bit flag");
    assert_eq!(u32_at(&bytes, 12), 480);
    assert_eq!(u32_at(&bytes, 16), 4);
    assert_eq!(u32_at(&bytes, 20), 3, "channel count");
    assert_eq!(bytes.len(), 24 + 4 * 3 * 2);
}

#[test]
fn test_full_scale_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = WaveformConfig {
        window_secs: 0.01,
        output: Some(dir.path().join("full.dat")),
        ..Default::default()
    };
    let mut signal = vec![0.0f32; 80];
    signal[10] = -1.0;
    signal[70] = 1.0;
    let bytes = write_file(config, StreamLayout::new(1, 8000), &signal);

    assert_eq!(i16_values(&bytes[20..]), vec![-32767, 32767]);
}

#[test]
fn test_out_of_range_samples_saturate() {
    let dir = tempfile::tempdir().unwrap();
    let config = WaveformConfig {
        window_secs: 0.01,
        bits: BitDepth::Eight,
        output: Some(dir.path().join("clip.dat")),
        ..Default::default()
    };
    let bytes = write_file(config, StreamLayout::new(1, 8000), &[-4.0, 4.0]);

    assert_eq!(bytes[20] as i8, i8::MIN);
    assert_eq!(bytes[21] as i8, i8::MAX);
}

#[test]
fn test_header_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = WaveformConfig {
        window_secs: 0.25,
        split_channels: true,
        output: Some(dir.path().join("parse.dat")),
        ..Default::default()
    };
    let bytes = write_file(config, StreamLayout::new(2, 16000), &vec![0.1; 2 * 16000]);

    let mut cursor = Cursor::new(&bytes);
    let header = WaveformHeader::read_from(&mut cursor).unwrap();
    assert_eq!(
        header,
        WaveformHeader {
            length: 4,
            ..WaveformHeader::per_channel(BitDepth::Sixteen, 16000, 4000, 2)
        }
    );
    assert_eq!(cursor.position(), 24);
    assert_eq!(bytes.len() as u64 - 24, header.expected_data_len());
}

#[test]
fn test_inspect_complete_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inspect.dat");
    let config = WaveformConfig {
        window_secs: 0.1,
        output: Some(path.clone()),
        ..Default::default()
    };
    write_file(config, StreamLayout::new(2, 8000), &vec![0.5; 2 * 8000]);

    let report = inspect(&path).unwrap();
    assert_eq!(report.version, 1);
    assert_eq!(report.bits, 16);
    assert_eq!(report.samples_per_pixel, 800);
    assert_eq!(report.data_points, 10);
    assert!(report.complete);
    approx::assert_relative_eq!(report.duration_secs, 1.0);
}

#[test]
fn test_inspect_flags_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.dat");
    let config = WaveformConfig {
        window_secs: 0.01,
        output: Some(path.clone()),
        ..Default::default()
    };
    let mut bytes = write_file(config, StreamLayout::new(1, 8000), &vec![0.5; 800]);
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, &bytes).unwrap();

    let report = inspect(&path).unwrap();
    assert_eq!(report.data_points, 10);
    assert!(!report.complete);
}

#[test]
fn test_inspect_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.dat");
    std::fs::write(&path, b"RIFF").unwrap();
    assert!(inspect(&path).is_err());
}
