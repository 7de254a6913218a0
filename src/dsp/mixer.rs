//! Stereo crossfade and the post chain (diode clip, grit, damping).

use super::math::clamp;
use super::modulation::BlockCoefficients;
use super::network::PairOutput;

/// Crossfade weights `(left, right)` toward pair A. The right channel runs
/// half a turn behind the left.
#[inline]
pub fn stereo_weights(phi: f32, width: f32) -> (f32, f32) {
    let left = 0.5 + 0.5 * width * phi.sin();
    let right = 0.5 + 0.5 * width * (phi + std::f32::consts::PI).sin();
    (clamp(left, 0.0, 1.0), clamp(right, 0.0, 1.0))
}

/// Crossfade the two filter pairs into one stereo frame.
#[inline]
pub fn mix(pairs: PairOutput, phi: f32, width: f32) -> (f32, f32) {
    let (w_l, w_r) = stereo_weights(phi, width);
    (
        pairs.a_l * w_l + pairs.b_l * (1.0 - w_l),
        pairs.a_r * w_r + pairs.b_r * (1.0 - w_r),
    )
}

/// Asymmetric soft clip: the negative half is driven `asym` times harder.
#[inline]
pub fn diode_clip(x: f32, drive: f32, asym: f32) -> f32 {
    if x >= 0.0 {
        x / (1.0 + drive * x.abs())
    } else {
        x / (1.0 + drive * asym * x.abs())
    }
}

/// Odd-harmonic grit: `x + (x³ − x)·amount`.
#[inline]
pub fn grit(x: f32, amount: f32) -> f32 {
    x + (x * x * x - x) * amount
}

/// Saturation and one-pole damping applied to each channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostProcessor {
    damp_l: f32,
    damp_r: f32,
}

impl PostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.damp_l = 0.0;
        self.damp_r = 0.0;
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32, coeffs: &BlockCoefficients) -> (f32, f32) {
        let out_l = grit(diode_clip(left, coeffs.diode_drive, coeffs.diode_asym), coeffs.grit_amount);
        let out_r = grit(diode_clip(right, coeffs.diode_drive, coeffs.diode_asym), coeffs.grit_amount);

        let g = coeffs.damp_coeff;
        self.damp_l += g * (out_l - self.damp_l);
        self.damp_r += g * (out_r - self.damp_r);

        if !(self.damp_l.is_finite() && self.damp_r.is_finite()) {
            self.reset();
        }

        let mix = coeffs.damp_mix;
        (
            out_l * (1.0 - mix) + self.damp_l * mix,
            out_r * (1.0 - mix) + self.damp_r * mix,
        )
    }

    /// Damping filter states `(left, right)`.
    pub fn damping(&self) -> (f32, f32) {
        (self.damp_l, self.damp_r)
    }
}
