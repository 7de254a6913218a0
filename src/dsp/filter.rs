//! TPT state-variable bandpass — the scalar stage of the rotating filter network.

use std::f32::consts::PI;

/// Highest usable cutoff as a fraction of the sample rate (0.98 · Nyquist).
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Smallest resonance accepted; keeps the damping factor `1/R` finite.
const MIN_RESONANCE: f32 = 1.0e-3;

/// A two-pole bandpass using the topology-preserving-transform state-variable
/// structure (trapezoidal integration, zero-delay feedback).
///
/// Cutoff and resonance are supplied on every call, so the stage holds only
/// its two integrator states and is safe to modulate at audio rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TptBandpass {
    s1: f32,
    s2: f32,
}

impl TptBandpass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one sample and return the bandpass output.
    #[inline]
    pub fn step(&mut self, input: f32, cutoff: f32, resonance: f32, sample_rate: f32) -> f32 {
        let cutoff = cutoff.max(0.0).min(sample_rate * MAX_CUTOFF_RATIO);
        let resonance = resonance.max(MIN_RESONANCE);

        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / resonance;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;

        let v1 = a1 * self.s1 + a2 * (input - self.s2);
        let v2 = self.s2 + g * v1;

        self.s1 = 2.0 * v1 - self.s1;
        self.s2 = 2.0 * v2 - self.s2;

        if !(self.s1.is_finite() && self.s2.is_finite()) {
            self.reset();
            return 0.0;
        }

        v1
    }

    /// Clear both integrators.
    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Integrator states `(s1, s2)`.
    pub fn state(&self) -> (f32, f32) {
        (self.s1, self.s2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_response(freq: f32, cutoff: f32, resonance: f32) -> f32 {
        let sr = 48000.0;
        let mut f = TptBandpass::new();
        let mut peak = 0.0_f32;
        for i in 0..9600 {
            let x = (2.0 * PI * freq * i as f32 / sr).sin();
            let y = f.step(x, cutoff, resonance, sr);
            if i > 4800 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn centre_gain_equals_resonance() {
        // The band output is not normalised: its peak gain is R.
        let unity = peak_response(1000.0, 1000.0, 1.0);
        assert!((unity - 1.0).abs() < 0.05, "centre gain should be ~1, got {unity}");
        let boosted = peak_response(1000.0, 1000.0, 3.0);
        assert!((boosted - 3.0).abs() < 0.15, "centre gain should be ~3, got {boosted}");
    }

    #[test]
    fn blocks_dc() {
        let mut f = TptBandpass::new();
        let mut out = 1.0;
        for _ in 0..48000 {
            out = f.step(1.0, 500.0, 1.0, 48000.0);
        }
        assert!(out.abs() < 1e-3, "bandpass should reject DC, got {out}");
    }

    #[test]
    fn higher_resonance_narrows_band() {
        let selectivity = |r: f32| peak_response(3000.0, 1000.0, r) / peak_response(1000.0, 1000.0, r);
        let wide = selectivity(0.5);
        let narrow = selectivity(6.0);
        assert!(
            narrow < wide,
            "off-centre response should drop with resonance: wide={wide} narrow={narrow}"
        );
    }

    #[test]
    fn stable_near_nyquist() {
        let sr = 22050.0;
        let mut f = TptBandpass::new();
        for i in 0..20000 {
            let x = if i % 37 == 0 { 1.0 } else { -0.3 };
            // 18 kHz is above Nyquist here; the stage must clamp internally.
            let y = f.step(x, 18000.0, 6.5, sr);
            assert!(y.is_finite() && y.abs() < 50.0, "unstable output {y} at {i}");
        }
    }

    #[test]
    fn filter_output_finite_under_modulation() {
        let mut f = TptBandpass::new();
        for i in 0..10000 {
            let input = if i % 100 == 0 { 1.0 } else { 0.0 };
            let cutoff = 20.0 + (i % 500) as f32 * 30.0;
            let out = f.step(input, cutoff, 4.0, 44100.0);
            assert!(out.is_finite(), "Filter output not finite at sample {i}");
        }
    }

    #[test]
    fn non_finite_input_resets_state() {
        let mut f = TptBandpass::new();
        f.step(1.0, 1000.0, 1.0, 48000.0);
        let out = f.step(f32::INFINITY, 1000.0, 1.0, 48000.0);
        assert_eq!(out, 0.0);
        assert_eq!(f.state(), (0.0, 0.0));
    }

    #[test]
    fn reset_clears_integrators() {
        let mut f = TptBandpass::new();
        f.step(0.5, 800.0, 2.0, 44100.0);
        assert_ne!(f.state(), (0.0, 0.0));
        f.reset();
        assert_eq!(f.state(), (0.0, 0.0));
    }
}
