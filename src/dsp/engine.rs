//! Audio Engine — the AXIS generator.
//!
//! Owns the oscillator bank, waveshaper, rotating filter network and post
//! chain, plus the seeded random stream that drives the wear drift. Each call
//! to [`AxisEngine::process`] derives its block coefficients once, then runs
//! the per-sample path without allocating.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::math::wrap_phase;
use super::mixer::{PostProcessor, mix};
use super::modulation::{BlockCoefficients, DriftGenerator, smooth_rotation};
use super::network::{FilterNetwork, phase_to_radians};
use super::oscillator::OscillatorBank;
use super::params::{ParamId, Params};
use super::shaper::shape;

/// Sample rate used before `prepare`, and in place of an invalid rate.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Read-only view of every continuous state variable, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub sample_rate: f64,
    pub params: Params,
    pub phase_a: f32,
    pub phase_b: f32,
    pub phase_c: f32,
    pub phase_sub: f32,
    pub spectral_phase: f32,
    pub rotation_smoothed: f32,
    pub smoothed_fc_a: f32,
    pub smoothed_fc_b: f32,
    pub damp_l: f32,
    pub damp_r: f32,
    pub cross_mod_a: f32,
    pub cross_mod_b: f32,
    pub drift_a: f32,
    pub drift_b: f32,
    pub drift_target_a: f32,
    pub drift_target_b: f32,
    /// Samples since the last `prepare`.
    pub drift_counter: u64,
    /// Integrator states `(s1, s2)`: A-left, A-right, B-left, B-right.
    pub filter_states: [(f32, f32); 4],
}

impl EngineState {
    /// True when no floating-point field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        let scalars = [
            self.phase_a,
            self.phase_b,
            self.phase_c,
            self.phase_sub,
            self.spectral_phase,
            self.rotation_smoothed,
            self.smoothed_fc_a,
            self.smoothed_fc_b,
            self.damp_l,
            self.damp_r,
            self.cross_mod_a,
            self.cross_mod_b,
            self.drift_a,
            self.drift_b,
            self.drift_target_a,
            self.drift_target_b,
        ];
        self.sample_rate.is_finite()
            && scalars.iter().all(|v| v.is_finite())
            && self
                .filter_states
                .iter()
                .all(|(s1, s2)| s1.is_finite() && s2.is_finite())
    }
}

/// The generator. `R` is the random source consumed by drift retargeting.
#[derive(Debug, Clone)]
pub struct AxisEngine<R = ChaCha8Rng> {
    sample_rate: f64,
    params: Params,
    rotation_smoothed: f32,
    spectral_phase: f32,
    oscillators: OscillatorBank,
    network: FilterNetwork,
    post: PostProcessor,
    drift: DriftGenerator<R>,
}

impl AxisEngine<ChaCha8Rng> {
    /// Engine seeded with 0.
    pub fn new(sample_rate: f64) -> Self {
        Self::with_seed(sample_rate, 0)
    }

    pub fn with_seed(sample_rate: f64, seed: u64) -> Self {
        Self::with_rng(sample_rate, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng + Clone> AxisEngine<R> {
    /// Build an engine around an explicit random source and prepare it.
    pub fn with_rng(sample_rate: f64, rng: R) -> Self {
        let mut engine = AxisEngine {
            sample_rate: DEFAULT_SAMPLE_RATE,
            params: Params::default(),
            rotation_smoothed: 0.0,
            spectral_phase: 0.0,
            oscillators: OscillatorBank::default(),
            network: FilterNetwork::new(),
            post: PostProcessor::new(),
            drift: DriftGenerator::new(rng),
        };
        engine.prepare(sample_rate);
        engine
    }

    /// Reset all continuous state and adopt a new sample rate.
    ///
    /// Parameter values are kept. The random stream is rewound to its seed,
    /// so a prepared engine always renders the same sequence for the same
    /// parameters.
    pub fn prepare(&mut self, sample_rate: f64) {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            log::warn!("invalid sample rate {sample_rate}, using {DEFAULT_SAMPLE_RATE}");
            DEFAULT_SAMPLE_RATE
        };
        log::debug!("preparing engine at {sample_rate} Hz");

        self.sample_rate = sample_rate;
        self.rotation_smoothed = 0.0;
        self.spectral_phase = 0.0;
        self.oscillators.reset();
        self.network.reset();
        self.post.reset();
        self.drift.reset();
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_rotation(&mut self, value: f32) {
        self.params.set_rotation(value);
    }

    pub fn set_body(&mut self, value: f32) {
        self.params.set_body(value);
    }

    pub fn set_load(&mut self, value: f32) {
        self.params.set_load(value);
    }

    pub fn set_mass(&mut self, value: f32) {
        self.params.set_mass(value);
    }

    pub fn set_wear(&mut self, value: f32) {
        self.params.set_wear(value);
    }

    pub fn set_param(&mut self, id: ParamId, value: f32) {
        self.params.set(id, value);
    }

    /// Replace all five parameters (each clamped).
    pub fn set_params(&mut self, params: Params) {
        self.params = params.clamped();
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Coefficients the next block would use, without advancing any state.
    pub fn block_coefficients(&self) -> BlockCoefficients {
        let rotation = smooth_rotation(self.rotation_smoothed, self.params.rotation, self.params.mass);
        BlockCoefficients::derive(&self.params, rotation, self.sample_rate)
    }

    /// Render `num_samples` frames into `buffer`, overwriting its contents.
    ///
    /// Channels 0 and 1 receive left and right. With a single channel the
    /// right sample is written over the left one. `num_samples` is limited
    /// to the shortest channel; zero leaves the engine untouched.
    pub fn process(&mut self, buffer: &mut [&mut [f32]], num_samples: usize) {
        let available = buffer.iter().map(|ch| ch.len()).min().unwrap_or(0);
        let num_samples = num_samples.min(available);
        if num_samples == 0 {
            return;
        }

        for channel in buffer.iter_mut() {
            channel.fill(0.0);
        }

        let coeffs = self.begin_block();

        match buffer {
            [left, right, ..] => {
                for i in 0..num_samples {
                    let (l, r) = self.tick(coeffs);
                    left[i] = l;
                    right[i] = r;
                }
            }
            [mono] => {
                for sample in mono.iter_mut().take(num_samples) {
                    let (_, r) = self.tick(coeffs);
                    *sample = r;
                }
            }
            [] => {}
        }
    }

    /// Render one block into separate left/right slices of equal length.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        let num_samples = left.len().min(right.len());
        self.process(&mut [left, right], num_samples);
    }

    /// Snapshot of the continuous state.
    pub fn state(&self) -> EngineState {
        let [phase_a, phase_b, phase_c, phase_sub] = self.oscillators.phases();
        let (smoothed_fc_a, smoothed_fc_b) = self.network.cutoffs();
        let (cross_mod_a, cross_mod_b) = self.network.cross_mod();
        let (damp_l, damp_r) = self.post.damping();

        EngineState {
            sample_rate: self.sample_rate,
            params: self.params,
            phase_a,
            phase_b,
            phase_c,
            phase_sub,
            spectral_phase: self.spectral_phase,
            rotation_smoothed: self.rotation_smoothed,
            smoothed_fc_a,
            smoothed_fc_b,
            damp_l,
            damp_r,
            cross_mod_a,
            cross_mod_b,
            drift_a: self.drift.drift_a,
            drift_b: self.drift.drift_b,
            drift_target_a: self.drift.target_a,
            drift_target_b: self.drift.target_b,
            drift_counter: self.drift.counter(),
            filter_states: self.network.stages().map(|s| s.state()),
        }
    }

    /// Advance the rotation inertia and derive this block's coefficients.
    fn begin_block(&mut self) -> BlockCoefficients {
        self.rotation_smoothed = smooth_rotation(self.rotation_smoothed, self.params.rotation, self.params.mass);
        BlockCoefficients::derive(&self.params, self.rotation_smoothed, self.sample_rate)
    }

    /// One output frame.
    #[inline]
    fn tick(&mut self, coeffs: BlockCoefficients) -> (f32, f32) {
        let drift = self.drift.tick(coeffs.drift_interval);

        self.spectral_phase = wrap_phase(self.spectral_phase + coeffs.rotation_rate / coeffs.sample_rate);
        let phi = phase_to_radians(self.spectral_phase);

        let rotors = self
            .oscillators
            .next(coeffs.instability, drift.0, drift.1, coeffs.sample_rate);
        let excitation = shape(rotors, &coeffs);

        let pairs = self.network.process(excitation, phi, drift, &coeffs);
        let (left, right) = mix(pairs, phi, coeffs.width);

        self.post.process(left, right, &coeffs)
    }
}
