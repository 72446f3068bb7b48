//! Pitch/period tracking: F0 contour and glottal pulse train.
//!
//! Two derived views of the signal feed every downstream metric:
//!
//! - [`PitchContour`] — framewise fundamental-frequency estimates at a
//!   fixed time step, with unvoiced frames marked as absent.
//! - [`PulseTrain`] — glottal pulse instants marked inside the voiced
//!   portions, anchored at the detected local period.
//!
//! A fully unvoiced or silent signal yields an empty contour and train
//! rather than an error; downstream metrics degrade to defaults.

mod pulses;
mod tracker;

use serde::Serialize;

use crate::audio::Signal;
use crate::config::AnalysisConfig;

pub use pulses::mark_pulses;
pub use tracker::track_contour;

/// One contour frame: a time stamp and a frequency, absent when unvoiced.
#[derive(Debug, Clone, Copy)]
pub struct PitchFrame {
    /// Frame center time in seconds.
    pub time: f64,
    /// Fundamental frequency in Hz; `None` for unvoiced frames.
    pub frequency: Option<f64>,
}

/// Fundamental-frequency contour at a fixed time step.
#[derive(Debug, Clone)]
pub struct PitchContour {
    frames: Vec<PitchFrame>,
    time_step: f64,
}

impl PitchContour {
    pub fn new(frames: Vec<PitchFrame>, time_step: f64) -> Self {
        Self { frames, time_step }
    }

    #[inline]
    pub fn frames(&self) -> &[PitchFrame] {
        &self.frames
    }

    #[inline]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frequencies of the voiced frames, in contour order.
    pub fn voiced_frequencies(&self) -> Vec<f64> {
        self.frames.iter().filter_map(|f| f.frequency).collect()
    }

    /// Frequency at the frame nearest to `time`, if that frame is voiced.
    pub fn frequency_at(&self, time: f64) -> Option<f64> {
        if self.frames.is_empty() {
            return None;
        }
        let t0 = self.frames[0].time;
        let idx = ((time - t0) / self.time_step).round();
        if idx < 0.0 {
            return self.frames[0].frequency;
        }
        let idx = (idx as usize).min(self.frames.len() - 1);
        self.frames[idx].frequency
    }
}

/// Glottal pulse instants in seconds, ordered.
#[derive(Debug, Clone, Default)]
pub struct PulseTrain {
    pulses: Vec<f64>,
}

impl PulseTrain {
    pub fn new(pulses: Vec<f64>) -> Self {
        Self { pulses }
    }

    #[inline]
    pub fn pulses(&self) -> &[f64] {
        &self.pulses
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Inter-pulse intervals in seconds.
    pub fn periods(&self) -> Vec<f64> {
        self.pulses.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Summary statistics of the voiced contour frames.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PitchStats {
    pub median_pitch: Option<f64>,
    pub mean_pitch: Option<f64>,
    pub std_pitch: Option<f64>,
    pub min_pitch: Option<f64>,
    pub max_pitch: Option<f64>,
}

impl PitchStats {
    pub fn from_contour(contour: &PitchContour) -> Self {
        let mut freqs = contour.voiced_frequencies();
        if freqs.is_empty() {
            return Self::default();
        }

        freqs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = freqs.len();
        let median = if n % 2 == 1 {
            freqs[n / 2]
        } else {
            (freqs[n / 2 - 1] + freqs[n / 2]) / 2.0
        };
        let mean = freqs.iter().sum::<f64>() / n as f64;
        let variance = freqs.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n as f64;

        Self {
            median_pitch: Some(median),
            mean_pitch: Some(mean),
            std_pitch: Some(variance.sqrt()),
            min_pitch: Some(freqs[0]),
            max_pitch: Some(freqs[n - 1]),
        }
    }
}

/// Derive the pitch contour and pulse train for a signal.
pub fn track(signal: &Signal, config: &AnalysisConfig) -> (PitchContour, PulseTrain) {
    let contour = track_contour(signal, config);
    let pulses = mark_pulses(signal, &contour, config);
    (contour, pulses)
}
