//! Analysis configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters of the extraction pipeline.
///
/// The defaults bracket normal adult speaking voice: a 75–600 Hz pitch
/// search band rejects octave errors, and the 10 ms contour step matches
/// the resolution the perturbation metrics were defined at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub schema_version: u32,

    /// Sample rate every signal is normalized to before analysis (Hz).
    pub target_sample_rate: u32,
    /// Minimum decoded duration; shorter input is rejected at ingest.
    pub min_duration_s: f64,

    // Pitch tracking
    pub pitch_floor_hz: f64,
    pub pitch_ceiling_hz: f64,
    /// Time step between contour frames, in seconds.
    pub time_step_s: f64,
    /// Analysis frame length in samples (64 ms at 16 kHz).
    pub frame_size: usize,
    /// Power threshold below which a frame is considered silent.
    pub power_threshold: f32,
    /// Clarity threshold for accepting a pitch candidate.
    pub clarity_threshold: f32,

    /// Path to the screening model artifact. `None` means "use the
    /// default location"; a missing file puts the classifier in
    /// simulation mode.
    pub model_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            target_sample_rate: 16_000,
            min_duration_s: 0.5,
            pitch_floor_hz: 75.0,
            pitch_ceiling_hz: 600.0,
            time_step_s: 0.01,
            frame_size: 1024,
            power_threshold: 0.8,
            clarity_threshold: 0.5,
            model_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Load config from file, or fall back to defaults when absent.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Contour hop in samples at the target rate.
    pub fn hop_samples(&self) -> usize {
        (self.time_step_s * self.target_sample_rate as f64).round() as usize
    }

    /// Minimum voice-break gap: the longest inter-pulse interval a voice
    /// at the pitch floor could legitimately contain.
    pub fn voice_break_min_s(&self) -> f64 {
        1.25 / self.pitch_floor_hz
    }

    /// Default model artifact location.
    pub fn default_model_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicescreen")
            .join("model.json")
    }

    /// Resolve the model path from config or the platform default.
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(Self::default_model_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bracket_speaking_voice() {
        let config = AnalysisConfig::default();
        assert_eq!(config.target_sample_rate, 16_000);
        assert_eq!(config.pitch_floor_hz, 75.0);
        assert_eq!(config.pitch_ceiling_hz, 600.0);
        assert_eq!(config.hop_samples(), 160);
    }

    #[test]
    fn test_voice_break_threshold_derived_from_floor() {
        let config = AnalysisConfig::default();
        let gap = config.voice_break_min_s();
        assert!((gap - 1.25 / 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AnalysisConfig::default();
        config.pitch_ceiling_hz = 500.0;
        config.save(&path).unwrap();

        let loaded = AnalysisConfig::load(&path).unwrap();
        assert_eq!(loaded.pitch_ceiling_hz, 500.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let loaded = AnalysisConfig::load(Path::new("/nonexistent/voicescreen.json")).unwrap();
        assert_eq!(loaded.min_duration_s, 0.5);
    }
}
