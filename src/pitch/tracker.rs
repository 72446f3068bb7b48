//! Framewise F0 tracking via the McLeod pitch method.

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;
use tracing::debug;

use super::{PitchContour, PitchFrame};
use crate::audio::Signal;
use crate::config::AnalysisConfig;

/// Track the fundamental-frequency contour of a signal.
///
/// Frames are `config.frame_size` samples with a hop of
/// `config.time_step_s`; each frame's candidate is accepted only inside
/// the `[pitch_floor_hz, pitch_ceiling_hz]` band, which brackets normal
/// adult speaking voice and rejects octave errors. Frames that fail the
/// power or clarity thresholds are unvoiced.
pub fn track_contour(signal: &Signal, config: &AnalysisConfig) -> PitchContour {
    let samples = signal.samples();
    let sample_rate = signal.sample_rate() as usize;
    let frame_size = config.frame_size;
    let hop = config.hop_samples();

    if samples.len() < frame_size || hop == 0 {
        return PitchContour::new(Vec::new(), config.time_step_s);
    }

    let mut detector = McLeodDetector::new(frame_size, frame_size / 2);
    let mut frames = Vec::new();
    let mut voiced = 0usize;

    let mut start = 0usize;
    while start + frame_size <= samples.len() {
        let frame = &samples[start..start + frame_size];
        let time = (start + frame_size / 2) as f64 / sample_rate as f64;

        let frequency = detector
            .get_pitch(
                frame,
                sample_rate,
                config.power_threshold,
                config.clarity_threshold,
            )
            .map(|p| p.frequency as f64)
            .filter(|&f| f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz);

        if frequency.is_some() {
            voiced += 1;
        }
        frames.push(PitchFrame { time, frequency });

        start += hop;
    }

    debug!(
        "Pitch contour: {} frames, {} voiced",
        frames.len(),
        voiced
    );
    PitchContour::new(frames, config.time_step_s)
}
