//! Jitter and shimmer: cycle-to-cycle perturbation of period and amplitude.
//!
//! Both families are computed from the pulse train. Periods outside the
//! plausible pitch band break the measurement chain — differences are never
//! taken across a gap, only within contiguous runs of valid cycles.
//!
//! All ratio metrics are reported as plain ratios (0.01 = 1%).

use tracing::debug;

use crate::audio::Signal;
use crate::config::AnalysisConfig;
use crate::pitch::PulseTrain;

/// Jitter/shimmer measurements; `None` where too few cycles were usable.
#[derive(Debug, Clone, Default)]
pub struct PerturbationMetrics {
    pub jitter_local: Option<f64>,
    pub jitter_abs: Option<f64>,
    pub jitter_rap: Option<f64>,
    pub jitter_ppq5: Option<f64>,
    pub jitter_ddp: Option<f64>,
    pub shimmer_local: Option<f64>,
    pub shimmer_db: Option<f64>,
    pub shimmer_apq3: Option<f64>,
    pub shimmer_apq5: Option<f64>,
    pub shimmer_apq11: Option<f64>,
    pub shimmer_dda: Option<f64>,
}

/// One contiguous run of valid cycles: periods plus per-cycle peak amplitude.
struct CycleChain {
    periods: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl PerturbationMetrics {
    pub fn compute(pulses: &PulseTrain, signal: &Signal, config: &AnalysisConfig) -> Self {
        let chains = cycle_chains(pulses, signal, config);
        let total_periods: usize = chains.iter().map(|c| c.periods.len()).sum();
        if total_periods < 2 {
            debug!(
                "Perturbation metrics undefined: {} usable periods",
                total_periods
            );
            return Self::default();
        }

        let mean_period = mean(chains.iter().flat_map(|c| c.periods.iter().copied()));
        let mean_amp = mean(chains.iter().flat_map(|c| c.amplitudes.iter().copied()));

        let jitter_abs = mean_abs_consecutive_diff(&chains, |c| &c.periods);
        let jitter_local = ratio(jitter_abs, mean_period);
        let jitter_rap = ratio(window_deviation(&chains, |c| &c.periods, 3), mean_period);
        let jitter_ppq5 = ratio(window_deviation(&chains, |c| &c.periods, 5), mean_period);
        // Derived identity per the feature contract: 2x the mean absolute
        // difference of successive period differences, normalized.
        let jitter_ddp = ratio(second_difference(&chains), mean_period).map(|v| 2.0 * v);

        let shimmer_local = ratio(mean_abs_consecutive_diff(&chains, |c| &c.amplitudes), mean_amp);
        let shimmer_db = amplitude_db_perturbation(&chains);
        let shimmer_apq3 = ratio(window_deviation(&chains, |c| &c.amplitudes, 3), mean_amp);
        let shimmer_apq5 = ratio(window_deviation(&chains, |c| &c.amplitudes, 5), mean_amp);
        let shimmer_apq11 = ratio(window_deviation(&chains, |c| &c.amplitudes, 11), mean_amp);
        let shimmer_dda = shimmer_apq3.map(|v| 3.0 * v);

        Self {
            jitter_local,
            jitter_abs,
            jitter_rap,
            jitter_ppq5,
            jitter_ddp,
            shimmer_local,
            shimmer_db,
            shimmer_apq3,
            shimmer_apq5,
            shimmer_apq11,
            shimmer_dda,
        }
    }
}

/// Split the pulse train into chains of band-valid cycles.
///
/// A cycle's amplitude is the peak sample between its two pulses. An
/// out-of-band interval (voicing gap between runs, octave slip) ends the
/// current chain.
fn cycle_chains(pulses: &PulseTrain, signal: &Signal, config: &AnalysisConfig) -> Vec<CycleChain> {
    let min_period = 1.0 / config.pitch_ceiling_hz;
    let max_period = 1.0 / config.pitch_floor_hz;
    let samples = signal.samples();
    let sr = signal.sample_rate() as f64;

    let mut chains = Vec::new();
    let mut current = CycleChain {
        periods: Vec::new(),
        amplitudes: Vec::new(),
    };

    for pair in pulses.pulses().windows(2) {
        let period = pair[1] - pair[0];
        if period < min_period || period > max_period {
            if !current.periods.is_empty() {
                chains.push(std::mem::replace(
                    &mut current,
                    CycleChain {
                        periods: Vec::new(),
                        amplitudes: Vec::new(),
                    },
                ));
            }
            continue;
        }

        let i0 = (pair[0] * sr).round().max(0.0) as usize;
        let i1 = ((pair[1] * sr).round() as usize).min(samples.len());
        let amp = samples[i0.min(samples.len())..i1]
            .iter()
            .fold(0.0f32, |m, &s| m.max(s.abs())) as f64;

        current.periods.push(period);
        current.amplitudes.push(amp);
    }
    if !current.periods.is_empty() {
        chains.push(current);
    }
    chains
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn ratio(numerator: Option<f64>, denominator: f64) -> Option<f64> {
    match numerator {
        Some(v) if denominator > 0.0 => Some(v / denominator),
        _ => None,
    }
}

/// Mean |x_i - x_{i-1}| over consecutive pairs within each chain.
fn mean_abs_consecutive_diff(
    chains: &[CycleChain],
    values: impl Fn(&CycleChain) -> &Vec<f64>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for chain in chains {
        for pair in values(chain).windows(2) {
            sum += (pair[1] - pair[0]).abs();
            n += 1;
        }
    }
    (n > 0).then(|| sum / n as f64)
}

/// Mean absolute deviation of each value from its centered window mean.
fn window_deviation(
    chains: &[CycleChain],
    values: impl Fn(&CycleChain) -> &Vec<f64>,
    window: usize,
) -> Option<f64> {
    let half = window / 2;
    let mut sum = 0.0;
    let mut n = 0usize;
    for chain in chains {
        let xs = values(chain);
        if xs.len() < window {
            continue;
        }
        for i in half..xs.len() - half {
            let local = &xs[i - half..=i + half];
            let local_mean = local.iter().sum::<f64>() / window as f64;
            sum += (xs[i] - local_mean).abs();
            n += 1;
        }
    }
    (n > 0).then(|| sum / n as f64)
}

/// Mean absolute difference of successive period differences.
fn second_difference(chains: &[CycleChain]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for chain in chains {
        let diffs: Vec<f64> = chain.periods.windows(2).map(|p| p[1] - p[0]).collect();
        for pair in diffs.windows(2) {
            sum += (pair[1] - pair[0]).abs();
            n += 1;
        }
    }
    (n > 0).then(|| sum / n as f64)
}

/// Mean |20 log10(A_{i+1} / A_i)| over consecutive cycle pairs.
fn amplitude_db_perturbation(chains: &[CycleChain]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for chain in chains {
        for pair in chain.amplitudes.windows(2) {
            if pair[0] > 0.0 && pair[1] > 0.0 {
                sum += (20.0 * (pair[1] / pair[0]).log10()).abs();
                n += 1;
            }
        }
    }
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn constant_signal(level: f32, n: usize) -> Signal {
        Signal::new(vec![level; n], 16_000)
    }

    fn sine_signal(freq: f32, sample_rate: u32, duration_s: f32) -> Signal {
        let n = (sample_rate as f32 * duration_s) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        Signal::new(samples, sample_rate)
    }

    fn train_with_periods(periods: &[f64]) -> PulseTrain {
        let mut t = 0.1;
        let mut pulses = vec![t];
        for &p in periods {
            t += p;
            pulses.push(t);
        }
        PulseTrain::new(pulses)
    }

    #[test]
    fn test_constant_periods_zero_jitter() {
        let config = AnalysisConfig::default();
        let train = train_with_periods(&[0.005; 40]);
        let signal = constant_signal(0.5, 16_000);

        let m = PerturbationMetrics::compute(&train, &signal, &config);
        assert!(m.jitter_local.unwrap() < 1e-9);
        assert!(m.jitter_abs.unwrap() < 1e-12);
        assert!(m.jitter_rap.unwrap() < 1e-9);
        assert!(m.jitter_ddp.unwrap() < 1e-9);
        // Constant signal: every cycle peaks at the same level.
        assert!(m.shimmer_local.unwrap() < 1e-9);
        assert!(m.shimmer_db.unwrap() < 1e-9);
    }

    #[test]
    fn test_alternating_periods_known_jitter() {
        let config = AnalysisConfig::default();
        let periods: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 0.010 } else { 0.011 })
            .collect();
        let train = train_with_periods(&periods);
        let signal = constant_signal(0.5, 16_000);

        let m = PerturbationMetrics::compute(&train, &signal, &config);
        // |dT| = 1 ms everywhere, mean period 10.5 ms -> ~0.0952
        let jitter = m.jitter_local.unwrap();
        assert!(
            (jitter - 0.001 / 0.0105).abs() < 0.005,
            "Expected ~0.095, got {jitter:.4}"
        );
        assert!((m.jitter_abs.unwrap() - 0.001).abs() < 1e-6);
        assert!(m.jitter_ddp.unwrap() > m.jitter_rap.unwrap());
    }

    #[test]
    fn test_out_of_band_period_breaks_chain() {
        let config = AnalysisConfig::default();
        // A 100 ms gap (below the 75 Hz floor) separates two steady runs at
        // different rates; no difference may be taken across it.
        let mut pulses = Vec::new();
        let mut t = 0.0;
        for _ in 0..10 {
            pulses.push(t);
            t += 0.005;
        }
        t += 0.1;
        for _ in 0..10 {
            pulses.push(t);
            t += 0.008;
        }
        let train = PulseTrain::new(pulses);
        let signal = constant_signal(0.5, 16_000);

        let m = PerturbationMetrics::compute(&train, &signal, &config);
        assert!(
            m.jitter_local.unwrap() < 1e-9,
            "Gap must not contribute a perturbation"
        );
    }

    #[test]
    fn test_too_few_pulses_reports_none() {
        let config = AnalysisConfig::default();
        let signal = constant_signal(0.5, 16_000);

        for pulses in [vec![], vec![0.1], vec![0.1, 0.105]] {
            let m = PerturbationMetrics::compute(&PulseTrain::new(pulses), &signal, &config);
            assert!(m.jitter_local.is_none());
            assert!(m.shimmer_local.is_none());
            assert!(m.shimmer_apq11.is_none());
        }
    }

    #[test]
    fn test_steady_tone_low_perturbation_end_to_end() {
        let config = AnalysisConfig::default();
        let signal = sine_signal(200.0, 16_000, 1.0);
        let contour = crate::pitch::track_contour(&signal, &config);
        let train = crate::pitch::mark_pulses(&signal, &contour, &config);

        let m = PerturbationMetrics::compute(&train, &signal, &config);
        assert!(
            m.jitter_local.unwrap() < 0.02,
            "Pure tone jitter should be near zero, got {:?}",
            m.jitter_local
        );
        assert!(
            m.shimmer_local.unwrap() < 0.05,
            "Pure tone shimmer should be near zero, got {:?}",
            m.shimmer_local
        );
    }

    #[test]
    fn test_amplitude_modulation_raises_shimmer() {
        let config = AnalysisConfig::default();
        // 200 Hz carrier whose amplitude alternates cycle by cycle.
        let sr = 16_000u32;
        let n = sr as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let cycle = i / 80; // 80 samples per 200 Hz cycle
                let amp = if cycle % 2 == 0 { 0.5 } else { 0.25 };
                amp * (2.0 * PI * 200.0 * i as f32 / sr as f32).sin()
            })
            .collect();
        let signal = Signal::new(samples, sr);
        let train = train_with_periods(&vec![0.005; 150]);

        let m = PerturbationMetrics::compute(&train, &signal, &config);
        assert!(
            m.shimmer_local.unwrap() > 0.2,
            "Alternating amplitude should show strong shimmer, got {:?}",
            m.shimmer_local
        );
        assert!(m.shimmer_db.unwrap() > 1.0);
    }
}
