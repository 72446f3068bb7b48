//! Perturbation, spectral and voicing metrics.
//!
//! Every metric function degrades instead of failing: a value that cannot
//! be measured (too few pulses, zero-energy frames) comes back as `None`
//! and the assembler substitutes 0.0. Degradation is observable through
//! logs, never through pipeline errors.

mod perturbation;
mod spectral;
mod voicing;

pub use perturbation::PerturbationMetrics;
pub use spectral::SpectralMetrics;
pub use voicing::VoicingMetrics;
