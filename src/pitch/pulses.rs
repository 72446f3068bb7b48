//! Glottal pulse marking.
//!
//! Pulses are placed one local period at a time inside each voiced run of
//! the contour, snapping every pulse to the positive-peak sample of its
//! period window. The signed peak is used on purpose: the absolute value
//! has two maxima per cycle, which would alternate and fabricate jitter.

use tracing::debug;

use super::{PitchContour, PulseTrain};
use crate::audio::Signal;
use crate::config::AnalysisConfig;

/// Mark glottal pulse instants consistent with the pitch contour.
///
/// Voiced runs shorter than one period produce no pulses; a fully
/// unvoiced contour produces an empty train.
pub fn mark_pulses(
    signal: &Signal,
    contour: &PitchContour,
    config: &AnalysisConfig,
) -> PulseTrain {
    let samples = signal.samples();
    let sr = signal.sample_rate() as f64;
    let frames = contour.frames();
    let mut pulses: Vec<f64> = Vec::new();

    for (run_start, run_end) in voiced_runs(contour) {
        let run_t0 = frames[run_start].time;
        let run_t1 = frames[run_end].time;

        // Seed the run: strongest positive peak within the first period.
        let Some(f0) = frames[run_start].frequency else {
            continue;
        };
        let mut period = 1.0 / f0;
        let Some(first) = peak_in_window(samples, sr, run_t0, run_t0 + period) else {
            continue;
        };
        let mut prev = first;
        pulses.push(prev);

        loop {
            // Re-read the local period near the previous pulse so the walk
            // follows pitch drift within the run.
            match contour.frequency_at(prev) {
                Some(f) if f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz => {
                    period = 1.0 / f;
                }
                _ => break,
            }

            let w0 = prev + 0.8 * period;
            let w1 = prev + 1.25 * period;
            if w0 > run_t1 + period / 2.0 {
                break;
            }
            let Some(next) = peak_in_window(samples, sr, w0, w1) else {
                break;
            };
            pulses.push(next);
            prev = next;
        }
    }

    debug!("Marked {} glottal pulses", pulses.len());
    PulseTrain::new(pulses)
}

/// Index ranges (inclusive) of maximal voiced runs in the contour.
fn voiced_runs(contour: &PitchContour) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (i, frame) in contour.frames().iter().enumerate() {
        match (frame.frequency.is_some(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, contour.frames().len() - 1));
    }
    runs
}

/// Time of the maximum-valued sample in `[t0, t1)`, if the window is valid.
fn peak_in_window(samples: &[f32], sr: f64, t0: f64, t1: f64) -> Option<f64> {
    let i0 = (t0 * sr).round().max(0.0) as usize;
    let i1 = ((t1 * sr).round() as usize).min(samples.len());
    if i0 >= i1 {
        return None;
    }

    let mut best = i0;
    for i in i0 + 1..i1 {
        if samples[i] > samples[best] {
            best = i;
        }
    }
    Some(best as f64 / sr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::track_contour;
    use std::f32::consts::PI;

    fn sine_signal(freq: f32, sample_rate: u32, duration_s: f32) -> Signal {
        let n = (sample_rate as f32 * duration_s) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        Signal::new(samples, sample_rate)
    }

    #[test]
    fn test_pulses_track_period_of_steady_tone() {
        // 200 Hz at 16 kHz: the period is exactly 80 samples, so peak
        // snapping lands on identical offsets every cycle.
        let config = AnalysisConfig::default();
        let signal = sine_signal(200.0, 16_000, 1.0);
        let contour = track_contour(&signal, &config);
        let train = mark_pulses(&signal, &contour, &config);

        assert!(train.len() > 100, "Expected dense pulses, got {}", train.len());

        let periods = train.periods();
        let mean: f64 = periods.iter().sum::<f64>() / periods.len() as f64;
        assert!(
            (mean - 0.005).abs() < 1e-4,
            "Expected ~5 ms mean period, got {mean:.6}"
        );

        // Perfectly periodic input: period variation stays at quantization level.
        let max_dev = periods
            .iter()
            .map(|p| (p - mean).abs())
            .fold(0.0f64, f64::max);
        assert!(max_dev < 2e-4, "Expected near-constant periods, max dev {max_dev}");
    }

    #[test]
    fn test_silence_yields_no_pulses() {
        let config = AnalysisConfig::default();
        let signal = Signal::new(vec![0.0; 16_000], 16_000);
        let contour = track_contour(&signal, &config);
        let train = mark_pulses(&signal, &contour, &config);
        assert!(train.is_empty());
    }

    #[test]
    fn test_voiced_runs_split_on_gaps() {
        use crate::pitch::PitchFrame;
        let frames = vec![
            PitchFrame { time: 0.00, frequency: Some(100.0) },
            PitchFrame { time: 0.01, frequency: Some(100.0) },
            PitchFrame { time: 0.02, frequency: None },
            PitchFrame { time: 0.03, frequency: Some(120.0) },
        ];
        let contour = PitchContour::new(frames, 0.01);
        assert_eq!(voiced_runs(&contour), vec![(0, 1), (3, 3)]);
    }
}
