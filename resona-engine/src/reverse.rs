//! Pattern removal with per-key cached state.
//!
//! The backward pass subtracts the harmonic deltas again, weighted by the
//! corrector's learned correction factor and by a small quantum adjustment
//! sampled from the corrector's jitter buffer. Removal is deliberately not an
//! exact inverse of embedding: the phase snapshot carries a temporal offset,
//! and the quantum adjustment applies only here. The residual is bounded and
//! shrinks as the corrector trains.
//!
//! One [`ResonanceState`] per `(frequency, phase)` key, created lazily on the
//! first reverse call that references the key and immutable afterwards.
//! Repeat chunks reuse the cached snapshot; they never re-derive it.

use std::collections::HashMap;

use core::f32::consts::PI;

use resona_core::dsp::{clamp_i16, mean, sinf, I16_FULL_SCALE, TAU};
use resona_core::pattern::{HarmonicPattern, PatternKey, PatternSet, BASE_FREQUENCY, HARMONIC_COUNT};

use crate::corrector::AdaptiveCorrector;

/// Number of jitter values sampled into each state snapshot.
pub const QUANTUM_STATE_LEN: usize = 4;

/// Weight of the quantum adjustment on the removal delta.
const QUANTUM_ADJUST_WEIGHT: f32 = 0.01;

/// Immutable per-key snapshot taken when a key is first reversed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResonanceState {
    phase: f32,
    amplitude: f32,
    temporal_offset: f32,
    quantum_state: [f32; QUANTUM_STATE_LEN],
}

impl ResonanceState {
    fn for_pattern(pattern: &HarmonicPattern, corrector: &AdaptiveCorrector) -> Self {
        // Evenly strided picks out of the corrector's jitter buffer. A key
        // the corrector has never trained degrades to zeros, which makes the
        // quantum adjustment exactly unity.
        let quantum_state = match corrector.quantum_field(pattern.key()) {
            Some(field) => {
                let stride = field.len() / QUANTUM_STATE_LEN;
                core::array::from_fn(|i| field[i * stride])
            }
            None => [0.0; QUANTUM_STATE_LEN],
        };

        Self {
            phase: pattern.phase,
            amplitude: pattern.amplitude,
            temporal_offset: sinf(pattern.frequency / BASE_FREQUENCY) * PI,
            quantum_state,
        }
    }

    /// Phase offset added during removal, `sin(frequency/432)·π`.
    #[inline]
    pub fn temporal_offset(&self) -> f32 {
        self.temporal_offset
    }

    #[inline]
    pub fn quantum_state(&self) -> &[f32] {
        &self.quantum_state
    }

    /// `1 + avg(quantum_state)·0.01`, within a percent of unity.
    #[inline]
    fn quantum_adjust(&self) -> f32 {
        1.0 + mean(self.quantum_state.iter().copied()) * QUANTUM_ADJUST_WEIGHT
    }
}

/// Flattened per-harmonic parameters for one reverse pass.
#[derive(Copy, Clone)]
struct RemovalPass {
    frequency: f32,
    phase: f32,
    temporal_offset: f32,
    amplitude: f32,
    resonance: f32,
    correction: f32,
    quantum_adjust: f32,
}

/// Owner of the cached per-key snapshots.
pub struct Reverser {
    states: HashMap<PatternKey, ResonanceState>,
}

impl Reverser {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Remove `patterns` from `samples` in place, consulting `corrector` for
    /// the current per-key correction factors.
    ///
    /// Chunking and `start_index` must mirror the embed pass. Corrections are
    /// snapshot once per call; retraining the corrector between chunks takes
    /// effect on the next call.
    pub fn reverse(
        &mut self,
        patterns: &PatternSet,
        samples: &mut [i16],
        start_index: usize,
        corrector: &AdaptiveCorrector,
    ) {
        if samples.is_empty() {
            return;
        }

        // Resolve per-key state up front; creation happens at most once per
        // key for the lifetime of this reverser.
        for p in patterns {
            self.states.entry(p.key()).or_insert_with(|| {
                tracing::debug!(frequency = f64::from(p.frequency), "caching resonance state");
                ResonanceState::for_pattern(p, corrector)
            });
        }

        let harmonics = patterns.as_slice();
        let passes: [RemovalPass; HARMONIC_COUNT] = core::array::from_fn(|i| {
            let p = &harmonics[i];
            let state = &self.states[&p.key()];
            RemovalPass {
                frequency: p.frequency,
                phase: state.phase,
                temporal_offset: state.temporal_offset,
                amplitude: state.amplitude,
                resonance: p.resonance,
                correction: corrector.correction(p.key()),
                quantum_adjust: state.quantum_adjust(),
            }
        });

        let len = samples.len() as f32;
        for (i, sample) in samples.iter_mut().enumerate() {
            let t = ((start_index + i) as f32 / len) * TAU;
            let mut acc = i32::from(*sample);

            for pass in &passes {
                let modulation = sinf(t * pass.frequency + pass.phase + pass.temporal_offset);
                let delta = pass.quantum_adjust
                    * modulation
                    * pass.amplitude
                    * pass.correction
                    * pass.resonance
                    * I16_FULL_SCALE;
                acc -= delta.floor() as i32;
            }

            *sample = clamp_i16(acc);
        }
    }

    /// The cached snapshot for `key`, if this reverser has seen it.
    #[inline]
    pub fn cached_state(&self, key: PatternKey) -> Option<&ResonanceState> {
        self.states.get(&key)
    }

    /// Number of keys with a cached snapshot.
    #[inline]
    pub fn cached_keys(&self) -> usize {
        self.states.len()
    }
}

impl Default for Reverser {
    fn default() -> Self {
        Self::new()
    }
}
