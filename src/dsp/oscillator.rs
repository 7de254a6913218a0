//! Rotor oscillator bank: a detuned sine pair, a reserved third rotor and the sub.

use std::f32::consts::PI;

use super::math::wrap_phase;

/// Fundamental of the rotor tones.
pub const BASE_FREQ: f32 = 55.0;

/// Detune ratio of rotor B against rotor A.
const ROTOR_B_RATIO: f32 = 1.01;

/// Raw sine outputs for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorSample {
    pub sine_a: f32,
    pub sine_b: f32,
    pub sub: f32,
}

/// Phase accumulators, stored as a fraction of a cycle in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorBank {
    pub base_freq: f32,
    phase_a: f32,
    phase_b: f32,
    /// Advanced every sample but not mixed into the output.
    phase_c: f32,
    phase_sub: f32,
}

impl Default for OscillatorBank {
    fn default() -> Self {
        Self::new(BASE_FREQ)
    }
}

impl OscillatorBank {
    pub fn new(base_freq: f32) -> Self {
        OscillatorBank {
            base_freq,
            phase_a: 0.0,
            phase_b: 0.0,
            phase_c: 0.0,
            phase_sub: 0.0,
        }
    }

    /// Advance all accumulators by one sample and return the sines.
    ///
    /// `instability` scales how far the drift values pull the two rotors;
    /// rotor B responds to its drift with opposite sign.
    #[inline]
    pub fn next(&mut self, instability: f32, drift_a: f32, drift_b: f32, sample_rate: f32) -> RotorSample {
        let freq_a = self.base_freq * (1.0 + instability * drift_a);
        let freq_b = self.base_freq * ROTOR_B_RATIO * (1.0 - instability * drift_b);
        let freq_c = self.base_freq * 0.5;

        self.phase_a = wrap_phase(self.phase_a + freq_a / sample_rate);
        self.phase_b = wrap_phase(self.phase_b + freq_b / sample_rate);
        self.phase_c = wrap_phase(self.phase_c + freq_c / sample_rate);

        let sine_a = (2.0 * PI * self.phase_a).sin();
        let sine_b = (2.0 * PI * self.phase_b).sin();

        self.phase_sub = wrap_phase(self.phase_sub + (self.base_freq * 0.5) / sample_rate);
        let sub = (2.0 * PI * self.phase_sub).sin();

        RotorSample { sine_a, sine_b, sub }
    }

    /// Reset all phases to zero.
    pub fn reset(&mut self) {
        self.phase_a = 0.0;
        self.phase_b = 0.0;
        self.phase_c = 0.0;
        self.phase_sub = 0.0;
    }

    /// Phases `[a, b, c, sub]`.
    pub fn phases(&self) -> [f32; 4] {
        [self.phase_a, self.phase_b, self.phase_c, self.phase_sub]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_sample_advances_one_increment() {
        let mut bank = OscillatorBank::default();
        let s = bank.next(0.0, 0.0, 0.0, 44100.0);
        let [a, b, c, sub] = bank.phases();
        assert_relative_eq!(a, 55.0 / 44100.0);
        assert_relative_eq!(b, 55.0 * 1.01 / 44100.0, epsilon = 1e-9);
        assert_relative_eq!(c, 27.5 / 44100.0);
        assert_eq!(c, sub);
        assert_relative_eq!(s.sine_a, (2.0 * PI * a).sin());
    }

    #[test]
    fn phases_stay_in_unit_interval() {
        let mut bank = OscillatorBank::new(5000.0);
        for i in 0..100_000 {
            let drift = ((i % 200) as f32 / 100.0) - 1.0;
            let s = bank.next(0.003, drift, -drift, 11025.0);
            for p in bank.phases() {
                assert!((0.0..1.0).contains(&p), "phase {p} out of range at {i}");
            }
            assert!(s.sine_a.abs() <= 1.0 && s.sine_b.abs() <= 1.0 && s.sub.abs() <= 1.0);
        }
    }

    #[test]
    fn rotors_drift_in_opposite_directions() {
        let mut plain = OscillatorBank::default();
        let mut drifted = OscillatorBank::default();
        plain.next(0.0, 0.0, 0.0, 48000.0);
        drifted.next(0.003, 1.0, 1.0, 48000.0);
        let [pa, pb, _, _] = plain.phases();
        let [da, db, _, _] = drifted.phases();
        assert!(da > pa, "rotor A should speed up");
        assert!(db < pb, "rotor B should slow down");
    }

    #[test]
    fn sub_runs_an_octave_below() {
        let mut bank = OscillatorBank::default();
        for _ in 0..1000 {
            bank.next(0.0, 0.0, 0.0, 48000.0);
        }
        let [a, _, _, sub] = bank.phases();
        assert_relative_eq!(wrap_phase(sub * 2.0), a, epsilon = 1e-3);
    }

    #[test]
    fn reset_zeroes_phases() {
        let mut bank = OscillatorBank::default();
        bank.next(0.0, 0.0, 0.0, 48000.0);
        bank.reset();
        assert_eq!(bank.phases(), [0.0; 4]);
    }
}
