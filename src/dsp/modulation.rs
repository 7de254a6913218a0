//! Block-rate coefficient derivation and the wear drift generator.
//!
//! Everything that depends only on the knob values is computed once per block
//! into a [`BlockCoefficients`] value; the sample loop then consumes that
//! value without touching the parameters again.

use std::f32::consts::{FRAC_PI_2, PI};

use rand::Rng;

use super::math::{clamp, db_to_gain, linear_map};
use super::params::Params;

/// Per-sample smoothing rate of the drift values toward their targets.
/// Not scaled by sample rate.
pub const DRIFT_SMOOTHING: f32 = 0.0005;

/// Phase offset between the two rotating filter centres.
pub const PHASE_OFFSET: f32 = FRAC_PI_2;

/// Torque: how far `rotation_smoothed` moves toward the knob per block.
/// Low mass responds fast.
pub fn torque_speed(mass: f32) -> f32 {
    linear_map(mass, 0.2, 0.01)
}

/// One block-rate step of the rotation inertia.
pub fn smooth_rotation(current: f32, target: f32, mass: f32) -> f32 {
    current + torque_speed(mass) * (target - current)
}

/// Drift retarget interval in samples for a given wear.
pub fn drift_interval(wear: f32, sample_rate: f64) -> u64 {
    let speed_hz = linear_map(wear, 0.1, 2.0) as f64;
    ((sample_rate / speed_hz).round() as u64).max(1)
}

/// Body split into three overlapping regimes, each ramping over a third of
/// the knob's travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRegimes {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl BodyRegimes {
    pub fn from_body(body: f32) -> Self {
        BodyRegimes {
            low: clamp(body * 3.0, 0.0, 1.0),
            mid: clamp(body * 3.0 - 1.0, 0.0, 1.0),
            high: clamp(body * 3.0 - 2.0, 0.0, 1.0),
        }
    }

    /// Crossfade of the per-regime base resonances.
    pub fn resonance(&self) -> f32 {
        let res_low = linear_map(self.low, 0.25, 1.0);
        let res_mid = linear_map(self.mid, 1.0, 3.5);
        let res_high = linear_map(self.high, 3.5, 6.5);

        res_low * (1.0 - self.mid) + res_mid * (1.0 - self.high) + res_high * self.high
    }
}

/// Rates, ranges and coefficients derived from the knobs once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockCoefficients {
    pub sample_rate: f32,

    // Wear drift
    pub drift_amount: f32,
    pub drift_interval: u64,
    pub instability: f32,

    // Rotation
    pub rotation_rate: f32,
    pub sweep_octaves: f32,
    pub width: f32,

    // Filter network
    pub base_centre: f32,
    /// One-pole inertia coefficient applied to the cutoff targets.
    pub inertia: f32,
    pub regimes: BodyRegimes,
    pub resonance_a: f32,
    pub resonance_b: f32,
    pub cross_amount: f32,

    // Waveshaper
    pub fold_amount: f32,
    pub fold_drive: f32,
    pub sub_gain: f32,
    pub pre_gain: f32,
    pub post_trim: f32,
    pub stress: f32,

    // Post
    pub diode_drive: f32,
    pub diode_asym: f32,
    pub grit_amount: f32,
    pub damp_mix: f32,
    pub damp_coeff: f32,
}

impl BlockCoefficients {
    /// Derive the block coefficients. `rotation_smoothed` must already have
    /// been advanced for this block.
    pub fn derive(params: &Params, rotation_smoothed: f32, sample_rate: f64) -> Self {
        let sr = sample_rate as f32;
        let Params {
            rotation: _,
            body,
            load,
            mass,
            wear,
        } = *params;

        let regimes = BodyRegimes::from_body(body);

        // Load pulls resonance down to keep the drive stage in check.
        let resonance = regimes.resonance() * linear_map(load, 1.0, 0.65);
        let q_skew = regimes.high * 0.35;

        let tau_seconds = linear_map(mass, 0.02, 0.60);
        let damp_cut = linear_map(mass, 10000.0, 1200.0);

        BlockCoefficients {
            sample_rate: sr,

            drift_amount: linear_map(wear, 0.0, 0.15),
            drift_interval: drift_interval(wear, sample_rate),
            instability: linear_map(wear, 0.0, 0.003),

            rotation_rate: linear_map(rotation_smoothed, 0.0005, 0.03) * linear_map(mass, 1.0, 0.35),
            sweep_octaves: linear_map(rotation_smoothed, 0.2, 3.0) * linear_map(mass, 1.0, 0.45),
            width: linear_map(rotation_smoothed, 0.05, 1.0),

            base_centre: linear_map(body, 80.0, 1200.0),
            inertia: (-1.0 / (tau_seconds * sr)).exp(),
            regimes,
            resonance_a: resonance * (1.0 + q_skew),
            resonance_b: resonance * (1.0 - q_skew),
            cross_amount: regimes.high * linear_map(mass, 0.4, 0.1),

            fold_amount: 1.0 + load * 4.0,
            fold_drive: 1.5 + body * 2.0,
            sub_gain: linear_map(mass, 0.0, 0.35),
            pre_gain: db_to_gain(linear_map(load, 0.0, 24.0)),
            post_trim: linear_map(load, 1.0, 0.25),
            stress: 1.0 + regimes.high * 0.6,

            diode_drive: linear_map(wear, 0.5, 6.0),
            diode_asym: linear_map(regimes.high, 1.0, 2.2),
            grit_amount: body * 0.02,
            damp_mix: linear_map(mass, 0.0, 0.65),
            damp_coeff: 1.0 - (-2.0 * PI * damp_cut / sr).exp(),
        }
    }
}

/// Slow random perturbation shared by the oscillators and filter centres.
///
/// Targets are redrawn whenever the running sample counter hits a multiple
/// of the retarget interval; the counter keeps running across blocks.
#[derive(Debug, Clone)]
pub struct DriftGenerator<R> {
    seed_rng: R,
    rng: R,
    counter: u64,
    pub drift_a: f32,
    pub drift_b: f32,
    pub target_a: f32,
    pub target_b: f32,
}

impl<R: Rng + Clone> DriftGenerator<R> {
    pub fn new(rng: R) -> Self {
        DriftGenerator {
            seed_rng: rng.clone(),
            rng,
            counter: 0,
            drift_a: 0.0,
            drift_b: 0.0,
            target_a: 0.0,
            target_b: 0.0,
        }
    }

    /// Zero the drift state and rewind the random stream to its seed.
    pub fn reset(&mut self) {
        self.rng = self.seed_rng.clone();
        self.counter = 0;
        self.drift_a = 0.0;
        self.drift_b = 0.0;
        self.target_a = 0.0;
        self.target_b = 0.0;
    }

    /// Advance one sample and return `(drift_a, drift_b)`.
    #[inline]
    pub fn tick(&mut self, interval: u64) -> (f32, f32) {
        if self.counter % interval.max(1) == 0 {
            self.target_a = self.rng.random_range(-1.0..=1.0);
            self.target_b = self.rng.random_range(-1.0..=1.0);
        }
        self.counter = self.counter.wrapping_add(1);

        self.drift_a += DRIFT_SMOOTHING * (self.target_a - self.drift_a);
        self.drift_b += DRIFT_SMOOTHING * (self.target_b - self.drift_b);
        (self.drift_a, self.drift_b)
    }

    /// Samples elapsed since the last reset.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}
