//! Pipeline configuration
//!
//! [`WaveformConfig`] carries the user-facing options and can be stored as
//! JSON. [`StreamLayout`] describes the incoming audio and only becomes known
//! once the upstream decoder reports it.

use crate::error::{Result, WaveformError};
use crate::peaks::accumulator::ResetPolicy;
use crate::peaks::encoder::BitDepth;
use crate::{DEFAULT_WINDOW_SECS, MAX_WINDOW_SECS, MIN_WINDOW_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_window_secs() -> f64 {
    DEFAULT_WINDOW_SECS
}

/// Options controlling peak extraction and output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,
    /// Emit one point per channel instead of the channel average
    #[serde(default)]
    pub split_channels: bool,
    /// Resolution of stored points
    #[serde(default)]
    pub bits: BitDepth,
    /// Destination file (None = metadata-only, nothing is written)
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Per-window min/max starting value
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            split_channels: false,
            bits: BitDepth::default(),
            output: None,
            reset_policy: ResetPolicy::default(),
        }
    }
}

impl WaveformConfig {
    /// Check option ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_SECS..=MAX_WINDOW_SECS).contains(&self.window_secs) {
            return Err(WaveformError::InvalidWindowLength {
                value: self.window_secs,
                min: MIN_WINDOW_SECS,
                max: MAX_WINDOW_SECS,
            });
        }
        Ok(())
    }

    /// Window length in frames for the given sample rate
    ///
    /// Rounded to the nearest frame. Fails if the window rounds to zero or
    /// does not fit the header's 32-bit samples-per-pixel field.
    pub fn window_samples(&self, sample_rate: u32) -> Result<u64> {
        self.validate()?;
        let samples = (self.window_secs * sample_rate as f64).round() as u64;
        if samples == 0 {
            return Err(WaveformError::ZeroLengthWindow {
                secs: self.window_secs,
                sample_rate,
            });
        }
        if samples > u32::MAX as u64 {
            return Err(WaveformError::InvalidLayout(format!(
                "window of {} samples exceeds the header range",
                samples
            )));
        }
        Ok(samples)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded config from disk");
        Ok(config)
    }

    /// Save config as pretty JSON, creating parent directories if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }
}

/// Channel layout and rate of the incoming stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLayout {
    /// Channels per frame
    pub channels: usize,
    /// Frames per second
    pub sample_rate: u32,
}

impl StreamLayout {
    /// Create a layout
    pub fn new(channels: usize, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Reject layouts no waveform can be produced for
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(WaveformError::InvalidLayout(
                "channel count must be non-zero".to_string(),
            ));
        }
        if u32::try_from(self.channels).is_err() {
            return Err(WaveformError::InvalidLayout(format!(
                "{} channels exceeds the header range",
                self.channels
            )));
        }
        if self.sample_rate == 0 {
            return Err(WaveformError::InvalidLayout(
                "sample rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WaveformConfig::default();
        assert_eq!(config.window_secs, 3.0);
        assert!(!config.split_channels);
        assert_eq!(config.bits, BitDepth::Sixteen);
        assert_eq!(config.output, None);
        assert_eq!(config.reset_policy, ResetPolicy::Extrema);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_bounds() {
        let mut config = WaveformConfig::default();
        for ok in [0.01, 1.0, 100.0] {
            config.window_secs = ok;
            assert!(config.validate().is_ok(), "{} should be accepted", ok);
        }
        for bad in [0.0, 0.009, 100.5, -1.0, f64::NAN, f64::INFINITY] {
            config.window_secs = bad;
            assert!(
                matches!(
                    config.validate(),
                    Err(WaveformError::InvalidWindowLength { .. })
                ),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_window_samples_rounds() {
        let config = WaveformConfig {
            window_secs: 0.01,
            ..Default::default()
        };
        assert_eq!(config.window_samples(44100).unwrap(), 441);
        assert_eq!(config.window_samples(22050).unwrap(), 221); // 220.5 rounds up
        assert_eq!(config.window_samples(150).unwrap(), 2); // 1.5 rounds up

        let default = WaveformConfig::default();
        assert_eq!(default.window_samples(48000).unwrap(), 144000);
    }

    #[test]
    fn test_window_rounding_to_zero() {
        let config = WaveformConfig {
            window_secs: 0.01,
            ..Default::default()
        };
        assert!(matches!(
            config.window_samples(40),
            Err(WaveformError::ZeroLengthWindow { .. })
        ));
    }

    #[test]
    fn test_window_exceeding_header() {
        let config = WaveformConfig {
            window_secs: 100.0,
            ..Default::default()
        };
        assert!(matches!(
            config.window_samples(u32::MAX),
            Err(WaveformError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{"split_channels": true, "bits": 8}"#;
        let config: WaveformConfig = serde_json::from_str(json).unwrap();
        assert!(config.split_channels);
        assert_eq!(config.bits, BitDepth::Eight);
        assert_eq!(config.window_secs, 3.0);
        assert_eq!(config.output, None);
    }

    #[test]
    fn test_invalid_bits_rejected() {
        let json = r#"{"bits": 24}"#;
        let err = serde_json::from_str::<WaveformConfig>(json).unwrap_err();
        assert!(err.to_string().contains("bit depth"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = WaveformConfig {
            window_secs: 0.5,
            split_channels: true,
            bits: BitDepth::Eight,
            output: Some(PathBuf::from("out.dat")),
            reset_policy: ResetPolicy::ZeroAnchored,
        };
        config.save(&path).unwrap();

        let loaded = WaveformConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"window_secs": 500.0}"#).unwrap();
        assert!(matches!(
            WaveformConfig::load(&path),
            Err(WaveformError::InvalidWindowLength { .. })
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            WaveformConfig::load(&path),
            Err(WaveformError::Config(_))
        ));
    }

    #[test]
    fn test_layout_validation() {
        assert!(StreamLayout::new(2, 44100).validate().is_ok());
        assert!(StreamLayout::new(0, 44100).validate().is_err());
        assert!(StreamLayout::new(2, 0).validate().is_err());
    }
}
