//! Rotating filter network — two stereo bandpass pairs whose centres sweep in
//! quadrature and push each other apart through their output energy.

use std::f32::consts::PI;

use super::filter::TptBandpass;
use super::math::clamp;
use super::modulation::{BlockCoefficients, PHASE_OFFSET};

/// Lowest filter centre, Hz.
pub const MIN_CUTOFF: f32 = 20.0;
/// Highest filter centre, Hz.
pub const MAX_CUTOFF: f32 = 18000.0;

/// Initial inertia-filtered centres after `reset`.
pub const INITIAL_FC_A: f32 = 400.0;
pub const INITIAL_FC_B: f32 = 600.0;

/// Smoothing rate of the energy followers driving cross-modulation.
const CROSS_MOD_SMOOTHING: f32 = 0.001;

/// Outputs of the four stages for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairOutput {
    pub a_l: f32,
    pub a_r: f32,
    pub b_l: f32,
    pub b_r: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterNetwork {
    a_l: TptBandpass,
    a_r: TptBandpass,
    b_l: TptBandpass,
    b_r: TptBandpass,
    smoothed_fc_a: f32,
    smoothed_fc_b: f32,
    cross_mod_a: f32,
    cross_mod_b: f32,
}

impl Default for FilterNetwork {
    fn default() -> Self {
        FilterNetwork {
            a_l: TptBandpass::new(),
            a_r: TptBandpass::new(),
            b_l: TptBandpass::new(),
            b_r: TptBandpass::new(),
            smoothed_fc_a: INITIAL_FC_A,
            smoothed_fc_b: INITIAL_FC_B,
            cross_mod_a: 0.0,
            cross_mod_b: 0.0,
        }
    }
}

impl FilterNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Run one sample of `input` through both pairs.
    ///
    /// `phi` is the spectral rotation phase in radians, `drift` the current
    /// `(drift_a, drift_b)`. Cutoffs are updated before filtering; the
    /// cross-modulation nudge is applied after all four stages ran and only
    /// affects the next sample.
    #[inline]
    pub fn process(&mut self, input: f32, phi: f32, drift: (f32, f32), coeffs: &BlockCoefficients) -> PairOutput {
        let mod_a = phi.sin();
        let mod_b = (phi + PHASE_OFFSET).sin();

        let mut fc_a = coeffs.base_centre * (mod_a * coeffs.sweep_octaves).exp2();
        let mut fc_b = coeffs.base_centre * (mod_b * coeffs.sweep_octaves).exp2();

        fc_a *= 1.0 + drift.0 * coeffs.drift_amount;
        fc_b *= 1.0 + drift.1 * coeffs.drift_amount;

        fc_a = clamp(fc_a, MIN_CUTOFF, MAX_CUTOFF);
        fc_b = clamp(fc_b, MIN_CUTOFF, MAX_CUTOFF);

        let a = coeffs.inertia;
        self.smoothed_fc_a = clamp(a * self.smoothed_fc_a + (1.0 - a) * fc_a, MIN_CUTOFF, MAX_CUTOFF);
        self.smoothed_fc_b = clamp(a * self.smoothed_fc_b + (1.0 - a) * fc_b, MIN_CUTOFF, MAX_CUTOFF);

        let sr = coeffs.sample_rate;
        let out = PairOutput {
            a_l: self.a_l.step(input, self.smoothed_fc_a, coeffs.resonance_a, sr),
            a_r: self.a_r.step(input, self.smoothed_fc_a, coeffs.resonance_a, sr),
            b_l: self.b_l.step(input, self.smoothed_fc_b, coeffs.resonance_b, sr),
            b_r: self.b_r.step(input, self.smoothed_fc_b, coeffs.resonance_b, sr),
        };

        let energy_a = 0.5 * (out.a_l.abs() + out.a_r.abs());
        let energy_b = 0.5 * (out.b_l.abs() + out.b_r.abs());

        self.cross_mod_a += CROSS_MOD_SMOOTHING * (energy_a - self.cross_mod_a);
        self.cross_mod_b += CROSS_MOD_SMOOTHING * (energy_b - self.cross_mod_b);

        // Each centre is pushed by the other pair's energy.
        self.smoothed_fc_a *= 1.0 + coeffs.cross_amount * self.cross_mod_b;
        self.smoothed_fc_b *= 1.0 + coeffs.cross_amount * self.cross_mod_a;

        self.smoothed_fc_a = clamp(self.smoothed_fc_a, MIN_CUTOFF, MAX_CUTOFF);
        self.smoothed_fc_b = clamp(self.smoothed_fc_b, MIN_CUTOFF, MAX_CUTOFF);

        out
    }

    /// Inertia-filtered centres `(a, b)` in Hz.
    pub fn cutoffs(&self) -> (f32, f32) {
        (self.smoothed_fc_a, self.smoothed_fc_b)
    }

    /// Energy followers `(a, b)`.
    pub fn cross_mod(&self) -> (f32, f32) {
        (self.cross_mod_a, self.cross_mod_b)
    }

    /// Stage states in the order A-left, A-right, B-left, B-right.
    pub fn stages(&self) -> [TptBandpass; 4] {
        [self.a_l, self.a_r, self.b_l, self.b_r]
    }
}

/// Spectral phase in [0, 1) to radians.
#[inline]
pub fn phase_to_radians(phase: f32) -> f32 {
    phase * 2.0 * PI
}
