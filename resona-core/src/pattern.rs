//! Harmonic pattern generation.
//!
//! A pattern set is four harmonics of a fixed 432 Hz fundamental, produced
//! atomically by one generator call. Harmonic *i* (1-indexed) carries
//! `frequency = 432·i` and `amplitude = intensity · 0.7^(i-1)`; its phase is
//! drawn from the rotating [`ResonanceSeed`](crate::seed::ResonanceSeed) and
//! its resonance mixes a fixed sinusoidal profile with a small seed-derived
//! perturbation.
//!
//! The set is a fixed array, so this module stays allocation-free.

use crate::dsp::{clamp01, sinf};
use crate::seed::ResonanceSeed;

/// Fundamental frequency of the harmonic series, in Hz.
pub const BASE_FREQUENCY: f32 = 432.0;

/// Number of harmonics in one pattern set.
pub const HARMONIC_COUNT: usize = 4;

/// Per-harmonic amplitude falloff factor.
const AMPLITUDE_FALLOFF: f32 = 0.7;

/// One sinusoidal component used to additively modulate audio samples.
///
/// Immutable once produced. `amplitude` and `resonance` live in [0, 1]
/// (given a caller-clamped intensity), `phase` in [0, 2π).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HarmonicPattern {
    /// Hz, positive.
    pub frequency: f32,
    /// Linear amplitude scale in [0, 1].
    pub amplitude: f32,
    /// Radians in [0, 2π).
    pub phase: f32,
    /// Resonance weighting in [0, 1].
    pub resonance: f32,
}

impl HarmonicPattern {
    /// The `(frequency, phase)` identity of this harmonic. Two harmonics with
    /// equal key are the same learning subject across embed/reverse cycles.
    #[inline]
    pub fn key(&self) -> PatternKey {
        PatternKey::new(self.frequency, self.phase)
    }
}

/// Hashable `(frequency, phase)` pair, keyed on the exact f32 bit patterns so
/// it can index `HashMap`s without tolerance games.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternKey {
    frequency_bits: u32,
    phase_bits: u32,
}

impl PatternKey {
    #[inline]
    pub fn new(frequency: f32, phase: f32) -> Self {
        Self {
            frequency_bits: frequency.to_bits(),
            phase_bits: phase.to_bits(),
        }
    }

    /// Frequency in Hz (for diagnostics/logging).
    #[inline]
    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency_bits)
    }

    /// Phase in radians (for diagnostics/logging).
    #[inline]
    pub fn phase(&self) -> f32 {
        f32::from_bits(self.phase_bits)
    }
}

/// An ordered set of [`HARMONIC_COUNT`] harmonics from one generator call.
///
/// Iteration order is the accumulation order during embed and reverse; both
/// passes must walk the set the same way to keep the floating-point rounding
/// consistent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatternSet {
    harmonics: [HarmonicPattern; HARMONIC_COUNT],
}

impl PatternSet {
    /// Assemble a set from explicit harmonics. The generator is the usual
    /// producer; this exists for calibration rigs and tests that need exact
    /// field values.
    #[inline]
    pub fn new(harmonics: [HarmonicPattern; HARMONIC_COUNT]) -> Self {
        Self { harmonics }
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, HarmonicPattern> {
        self.harmonics.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[HarmonicPattern] {
        &self.harmonics
    }

    #[inline]
    pub fn len(&self) -> usize {
        HARMONIC_COUNT
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a HarmonicPattern;
    type IntoIter = core::slice::Iter<'a, HarmonicPattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.harmonics.iter()
    }
}

/// Parameter validation failures from [`PatternGenerator::generate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// `sample_rate` was zero.
    InvalidSampleRate,
    /// `duration` was not strictly positive.
    InvalidDuration,
}

impl core::fmt::Display for PatternError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSampleRate => write!(f, "sample rate must be positive"),
            Self::InvalidDuration => write!(f, "duration must be positive"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatternError {}

/// Deterministic generator owning an evolving seed.
///
/// Two generators constructed from equal seeds produce identical pattern
/// sequences; the seed rotates on every phase draw, so successive calls on
/// one generator diverge predictably.
#[derive(Copy, Clone, Debug)]
pub struct PatternGenerator {
    seed: ResonanceSeed,
}

impl PatternGenerator {
    #[inline]
    pub fn new(seed: ResonanceSeed) -> Self {
        Self { seed }
    }

    /// Produce one pattern set.
    ///
    /// `sample_rate` and `duration` are validated at the boundary; the
    /// harmonics themselves are defined in normalized chunk time, so neither
    /// enters the math. `intensity` is propagated as given — callers wanting
    /// [0, 1] amplitudes pre-clamp it; only the derived resonance is clamped
    /// here, to preserve the documented amplitude scaling.
    pub fn generate(
        &mut self,
        intensity: f32,
        sample_rate: u32,
        duration: f32,
    ) -> Result<PatternSet, PatternError> {
        if sample_rate == 0 {
            return Err(PatternError::InvalidSampleRate);
        }
        if !(duration > 0.0) {
            return Err(PatternError::InvalidDuration);
        }

        let mut amplitude = intensity;
        let mut harmonics = [HarmonicPattern {
            frequency: 0.0,
            amplitude: 0.0,
            phase: 0.0,
            resonance: 0.0,
        }; HARMONIC_COUNT];

        for (i, slot) in harmonics.iter_mut().enumerate() {
            let frequency = BASE_FREQUENCY * (i + 1) as f32;
            let base = sinf(frequency / BASE_FREQUENCY) * 0.5 + 0.5;
            // influence is read before the phase draw rotates the seed
            let resonance = clamp01(base * intensity + self.seed.influence());
            let phase = self.seed.next_phase();

            *slot = HarmonicPattern {
                frequency,
                amplitude,
                phase,
                resonance,
            };
            amplitude *= AMPLITUDE_FALLOFF;
        }

        Ok(PatternSet { harmonics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::TAU;

    fn generator(seed: u64) -> PatternGenerator {
        PatternGenerator::new(ResonanceSeed::from_u64(seed))
    }

    #[test]
    fn harmonic_series_and_falloff() {
        let set = generator(11).generate(0.8, 48_000, 0.1).unwrap();
        let freqs: Vec<f32> = set.iter().map(|p| p.frequency).collect();
        assert_eq!(freqs, vec![432.0, 864.0, 1296.0, 1728.0]);

        let amps: Vec<f32> = set.iter().map(|p| p.amplitude).collect();
        assert!((amps[0] - 0.8).abs() < 1e-6);
        assert!(amps.windows(2).all(|w| w[1] < w[0]), "amps={amps:?}");
    }

    #[test]
    fn fields_stay_bounded_for_unit_intensities() {
        for step in 0..=10 {
            let intensity = step as f32 / 10.0;
            let set = generator(5).generate(intensity, 44_100, 1.0).unwrap();
            for p in &set {
                assert!((0.0..=1.0).contains(&p.amplitude), "{p:?}");
                assert!((0.0..=1.0).contains(&p.resonance), "{p:?}");
                assert!((0.0..TAU).contains(&p.phase), "{p:?}");
                assert!(p.frequency > 0.0);
            }
        }
    }

    #[test]
    fn equal_seeds_give_equal_sets() {
        let a = generator(1234).generate(0.5, 48_000, 0.25).unwrap();
        let b = generator(1234).generate(0.5, 48_000, 0.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn successive_calls_diverge() {
        let mut g = generator(1234);
        let a = g.generate(0.5, 48_000, 0.25).unwrap();
        let b = g.generate(0.5, 48_000, 0.25).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert_eq!(
            generator(1).generate(0.5, 0, 1.0),
            Err(PatternError::InvalidSampleRate)
        );
        assert_eq!(
            generator(1).generate(0.5, 48_000, 0.0),
            Err(PatternError::InvalidDuration)
        );
        assert_eq!(
            generator(1).generate(0.5, 48_000, -2.0),
            Err(PatternError::InvalidDuration)
        );
    }

    #[test]
    fn key_identity_follows_frequency_and_phase() {
        let set = generator(77).generate(0.6, 48_000, 0.5).unwrap();
        let p = set.as_slice()[0];
        assert_eq!(p.key(), PatternKey::new(p.frequency, p.phase));
        assert_ne!(p.key(), set.as_slice()[1].key());
    }
}
