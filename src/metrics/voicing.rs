//! Voicing continuity: unvoiced fraction, voice breaks and pulse counts.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::pitch::{PitchContour, PulseTrain};

/// Voicing measurements over contour and pulse train.
#[derive(Debug, Clone, Default)]
pub struct VoicingMetrics {
    /// Fraction of contour frames that are unvoiced; 1.0 for an empty or
    /// fully unvoiced contour.
    pub fraction_unvoiced: f64,
    /// Count of unvoiced gaps longer than the break threshold, strictly
    /// between the first and last voiced frame.
    pub num_voice_breaks: usize,
    /// Total break duration over the voiced span duration.
    pub degree_voice_breaks: f64,
    pub pulse_count: usize,
    /// `pulse_count - 1` when there is more than one pulse, else 0.
    pub period_count: usize,
    pub mean_period: Option<f64>,
    pub sd_period: Option<f64>,
}

impl VoicingMetrics {
    pub fn compute(contour: &PitchContour, pulses: &PulseTrain, config: &AnalysisConfig) -> Self {
        let frames = contour.frames();
        let total = frames.len();
        let voiced = frames.iter().filter(|f| f.frequency.is_some()).count();
        let fraction_unvoiced = if total == 0 {
            1.0
        } else {
            (total - voiced) as f64 / total as f64
        };

        let (num_voice_breaks, degree_voice_breaks) = voice_breaks(contour, config);

        // Period statistics use only in-band gaps; pulse walking can leave
        // stray gaps at run boundaries that are not glottal cycles. The
        // period count itself stays pulse_count - 1 regardless.
        let min_period = 1.0 / config.pitch_ceiling_hz;
        let max_period = 1.0 / config.pitch_floor_hz;
        let periods: Vec<f64> = pulses
            .periods()
            .into_iter()
            .filter(|&p| p >= min_period && p <= max_period)
            .collect();

        let (mean_period, sd_period) = if periods.is_empty() {
            (None, None)
        } else {
            let mean = periods.iter().sum::<f64>() / periods.len() as f64;
            let variance =
                periods.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / periods.len() as f64;
            (Some(mean), Some(variance.sqrt()))
        };

        debug!(
            "Voicing: {:.1}% unvoiced, {} breaks, {} pulses",
            fraction_unvoiced * 100.0,
            num_voice_breaks,
            pulses.len()
        );

        Self {
            fraction_unvoiced,
            num_voice_breaks,
            degree_voice_breaks,
            pulse_count: pulses.len(),
            period_count: pulses.len().saturating_sub(1),
            mean_period,
            sd_period,
        }
    }
}

/// Count and total up unvoiced gaps longer than the break threshold that
/// lie strictly inside the voiced span of the contour. Leading and
/// trailing silence is not a break.
fn voice_breaks(contour: &PitchContour, config: &AnalysisConfig) -> (usize, f64) {
    let frames = contour.frames();
    let first = frames.iter().position(|f| f.frequency.is_some());
    let last = frames.iter().rposition(|f| f.frequency.is_some());
    let (Some(first), Some(last)) = (first, last) else {
        return (0, 0.0);
    };
    if last <= first {
        return (0, 0.0);
    }

    let step = contour.time_step();
    let min_break = config.voice_break_min_s();
    let mut breaks = 0usize;
    let mut break_duration = 0.0f64;

    let mut gap_start: Option<usize> = None;
    for i in first..=last {
        match (frames[i].frequency.is_none(), gap_start) {
            (true, None) => gap_start = Some(i),
            (false, Some(s)) => {
                let duration = (i - s) as f64 * step;
                if duration > min_break {
                    breaks += 1;
                    break_duration += duration;
                }
                gap_start = None;
            }
            _ => {}
        }
    }

    let span = (last - first + 1) as f64 * step;
    (breaks, break_duration / span)
}
