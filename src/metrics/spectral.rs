//! Harmonicity: autocorrelation-based separation of periodic and noise energy.
//!
//! For each voiced contour frame the windowed signal's normalized
//! autocorrelation is evaluated at the detected period lag. With the
//! periodic fraction `r` of the frame energy, the harmonics-to-noise
//! ratio is `10 * log10(r / (1 - r))` dB. The raw autocorrelation is
//! corrected for the analysis window's own autocorrelation, otherwise the
//! window would bias `r` well below 1 even for a perfectly periodic frame.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::audio::Signal;
use crate::config::AnalysisConfig;
use crate::pitch::PitchContour;

/// Periodic fraction is clamped below 1 so a perfectly periodic frame
/// reports a large finite HNR instead of dividing by zero.
const MAX_PERIODIC_FRACTION: f64 = 0.999_999;

/// Harmonicity measurements; `None` when no voiced frame was measurable.
#[derive(Debug, Clone, Default)]
pub struct SpectralMetrics {
    /// Mean harmonics-to-noise ratio in dB.
    pub hnr: Option<f64>,
    /// Mean noise-to-harmonic energy ratio (linear).
    pub noise_to_harmonic: Option<f64>,
    /// Mean harmonic-to-noise energy ratio (linear).
    pub harmonic_to_noise: Option<f64>,
}

impl SpectralMetrics {
    pub fn compute(signal: &Signal, contour: &PitchContour, config: &AnalysisConfig) -> Self {
        let samples = signal.samples();
        let sr = signal.sample_rate() as f64;
        let frame_size = config.frame_size;

        let min_lag = (sr / config.pitch_ceiling_hz).ceil() as usize;
        let max_lag = (sr / config.pitch_floor_hz).floor() as usize;
        if samples.len() < frame_size || max_lag >= frame_size {
            return Self::default();
        }

        let window = hann_window(frame_size);
        let window_acf = autocorrelation_by_lag(&window, max_lag);

        // FFT-based autocorrelation: zero-pad to 2x to keep it linear.
        let n = (frame_size * 2).next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let ifft = planner.plan_fft_inverse(n);

        let mut hnr_sum = 0.0;
        let mut nh_sum = 0.0;
        let mut hn_sum = 0.0;
        let mut measured = 0usize;
        let mut skipped = 0usize;

        for frame in contour.frames() {
            let Some(f0) = frame.frequency else { continue };

            let center = (frame.time * sr).round() as isize;
            let start = center - (frame_size / 2) as isize;
            if start < 0 || start as usize + frame_size > samples.len() {
                skipped += 1;
                continue;
            }
            let start = start as usize;

            let mut buf: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n];
            for (i, (&s, &w)) in samples[start..start + frame_size]
                .iter()
                .zip(window.iter())
                .enumerate()
            {
                buf[i] = Complex::new(s as f64 * w, 0.0);
            }

            fft.process(&mut buf);
            for c in buf.iter_mut() {
                *c = Complex::new(c.norm_sqr(), 0.0);
            }
            ifft.process(&mut buf);

            let r0 = buf[0].re;
            if r0 <= 0.0 {
                skipped += 1;
                continue;
            }

            // Search the normalized autocorrelation near the period lag.
            let expected = sr / f0;
            let lo = ((expected * 0.8) as usize).max(min_lag);
            let hi = ((expected * 1.25).ceil() as usize).min(max_lag);
            let mut best = 0.0f64;
            for lag in lo..=hi {
                if window_acf[lag] <= 0.0 {
                    continue;
                }
                let r = (buf[lag].re / r0) / (window_acf[lag] / window_acf[0]);
                if r > best {
                    best = r;
                }
            }

            if best <= 0.0 {
                skipped += 1;
                continue;
            }
            let r = best.min(MAX_PERIODIC_FRACTION);

            hnr_sum += 10.0 * (r / (1.0 - r)).log10();
            nh_sum += (1.0 - r) / r;
            hn_sum += r / (1.0 - r);
            measured += 1;
        }

        if measured == 0 {
            if skipped > 0 {
                warn!("Harmonicity not measurable: {} frames skipped", skipped);
            }
            return Self::default();
        }

        debug!(
            "Harmonicity: {} frames measured, {} skipped",
            measured, skipped
        );
        let m = measured as f64;
        Self {
            hnr: Some(hnr_sum / m),
            noise_to_harmonic: Some(nh_sum / m),
            harmonic_to_noise: Some(hn_sum / m),
        }
    }
}

fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Time-domain autocorrelation of a short sequence up to `max_lag`.
fn autocorrelation_by_lag(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    (0..=max_lag.min(n - 1))
        .map(|lag| {
            values[..n - lag]
                .iter()
                .zip(values[lag..].iter())
                .map(|(&a, &b)| a * b)
                .sum()
        })
        .collect()
}
