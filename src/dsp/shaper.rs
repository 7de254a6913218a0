//! Waveshaper stage: wavefold, grind, sub layer, drive and stress.
//!
//! Turns the raw rotor sines into the single excitation signal that feeds
//! all four filter stages.

use super::modulation::BlockCoefficients;
use super::oscillator::RotorSample;

/// Two cascaded tanh folds of rotor A.
#[inline]
pub fn fold(sine_a: f32, fold_amount: f32, fold_drive: f32) -> f32 {
    let folded = (sine_a * fold_amount).tanh();
    (folded * fold_drive).tanh()
}

/// Square-law "grind" of the oscillator mix, sign preserved.
#[inline]
pub fn grind(x: f32) -> f32 {
    x * x.abs()
}

/// Full shaping chain for one sample.
#[inline]
pub fn shape(rotors: RotorSample, coeffs: &BlockCoefficients) -> f32 {
    let folded = fold(rotors.sine_a, coeffs.fold_amount, coeffs.fold_drive);

    let mut osc = rotors.sine_a * 0.3 + rotors.sine_b * 0.2 + folded * 0.5;
    let high = coeffs.regimes.high;
    osc = osc * (1.0 - high) + grind(osc) * high;

    osc += rotors.sub * coeffs.sub_gain;

    let driven = (osc * coeffs.pre_gain).tanh() * coeffs.post_trim;
    (driven * coeffs.stress).tanh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::params::Params;
    use approx::assert_relative_eq;

    fn rotors(a: f32, b: f32, sub: f32) -> RotorSample {
        RotorSample {
            sine_a: a,
            sine_b: b,
            sub,
        }
    }

    #[test]
    fn silence_in_silence_out() {
        let c = BlockCoefficients::derive(&Params::default(), 0.35, 48000.0);
        assert_eq!(shape(rotors(0.0, 0.0, 0.0), &c), 0.0);
    }

    #[test]
    fn grind_keeps_sign() {
        assert_eq!(grind(-0.5), -0.25);
        assert_eq!(grind(0.5), 0.25);
    }

    #[test]
    fn fold_is_bounded() {
        for i in -100..=100 {
            let x = i as f32 / 100.0;
            assert!(fold(x, 5.0, 3.5).abs() < 1.0);
        }
    }

    #[test]
    fn zero_knobs_reduce_to_plain_mix() {
        let c = BlockCoefficients::derive(&Params::zero(), 0.0, 48000.0);
        let (a, b) = (0.6_f32, -0.3_f32);
        let folded = (a.tanh() * 1.5).tanh();
        let osc: f32 = a * 0.3 + b * 0.2 + folded * 0.5;
        let expected = osc.tanh().tanh();
        assert_relative_eq!(shape(rotors(a, b, 0.9), &c), expected, epsilon = 1e-6);
    }

    #[test]
    fn output_bounded_by_stress_tanh() {
        let p = Params {
            load: 1.0,
            body: 1.0,
            mass: 1.0,
            ..Params::default()
        };
        let c = BlockCoefficients::derive(&p, 1.0, 48000.0);
        for i in -10..=10 {
            let x = i as f32 / 10.0;
            let y = shape(rotors(x, -x, x), &c);
            assert!(y.abs() < 1.0, "stressed output {y} escaped tanh range");
        }
    }
}
