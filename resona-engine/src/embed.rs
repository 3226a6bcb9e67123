//! Additive pattern embedding.
//!
//! The forward pass: for every sample, sum one sinusoidal delta per harmonic
//! and saturate back into the i16 range. Stateless and deterministic — given
//! the same pattern set and buffer length the output is identical, so the
//! pass parallelizes trivially across disjoint sample ranges.

use resona_core::dsp::{clamp_i16, sinf, I16_FULL_SCALE, TAU};
use resona_core::pattern::PatternSet;

/// Embed `patterns` into `samples` in place.
///
/// `start_index` is the absolute position of `samples[0]` within the stream,
/// so chunked drivers keep a continuous time base. The per-sample time is
/// normalized against the chunk length; the reverse pass must be driven with
/// the same chunking to line up.
///
/// Deltas accumulate in i32 in pattern order (the same order the reverser
/// walks), and each sample is clamped once after all patterns are applied.
pub fn embed(patterns: &PatternSet, samples: &mut [i16], start_index: usize) {
    if samples.is_empty() {
        return;
    }
    let len = samples.len() as f32;

    for (i, sample) in samples.iter_mut().enumerate() {
        let t = ((start_index + i) as f32 / len) * TAU;
        let mut acc = i32::from(*sample);

        for p in patterns {
            let modulation = sinf(t * p.frequency + p.phase);
            acc += (modulation * p.amplitude * p.resonance * I16_FULL_SCALE).floor() as i32;
        }

        *sample = clamp_i16(acc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resona_core::pattern::{HarmonicPattern, PatternGenerator, HARMONIC_COUNT};
    use resona_core::seed::ResonanceSeed;

    fn full_scale_set() -> PatternSet {
        let mut harmonics = [HarmonicPattern {
            frequency: 432.0,
            amplitude: 1.0,
            phase: 0.0,
            resonance: 1.0,
        }; HARMONIC_COUNT];
        for (i, h) in harmonics.iter_mut().enumerate() {
            h.frequency = 432.0 * (i + 1) as f32;
        }
        PatternSet::new(harmonics)
    }

    #[test]
    fn full_scale_embedding_never_escapes_i16() {
        // Pathological alignment: amplitude and resonance pinned to 1.0 on
        // all four harmonics, phases all zero. Accumulation is i32, so the
        // only way out of range would be a missing clamp.
        let mut samples = vec![0i16; 4096];
        embed(&full_scale_set(), &mut samples, 0);
        let peak = samples.iter().map(|s| i32::from(*s).abs()).max().unwrap();
        assert!(peak <= i32::from(i16::MAX) + 1, "peak={peak}");
        assert!(peak > 30_000, "expected near-full-scale content, peak={peak}");
    }

    #[test]
    fn embedding_is_deterministic() {
        let mut g = PatternGenerator::new(ResonanceSeed::from_u64(21));
        let set = g.generate(0.6, 48_000, 0.1).unwrap();

        let mut a = vec![0i16; 1024];
        let mut b = vec![0i16; 1024];
        embed(&set, &mut a, 0);
        embed(&set, &mut b, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn start_index_shifts_the_time_base() {
        let mut g = PatternGenerator::new(ResonanceSeed::from_u64(22));
        let set = g.generate(0.6, 48_000, 0.1).unwrap();

        let mut a = vec![0i16; 512];
        let mut b = vec![0i16; 512];
        embed(&set, &mut a, 0);
        embed(&set, &mut b, 512);
        assert_ne!(a, b);
    }

    #[test]
    fn silence_stays_silent_at_zero_intensity() {
        let mut g = PatternGenerator::new(ResonanceSeed::from_u64(23));
        let set = g.generate(0.0, 48_000, 0.1).unwrap();

        let mut samples = vec![0i16; 256];
        embed(&set, &mut samples, 0);
        assert!(samples.iter().all(|s| *s == 0));
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let mut g = PatternGenerator::new(ResonanceSeed::from_u64(24));
        let set = g.generate(0.5, 48_000, 0.1).unwrap();
        let mut samples: Vec<i16> = Vec::new();
        embed(&set, &mut samples, 0);
    }
}
