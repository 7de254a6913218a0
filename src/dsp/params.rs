//! The five AXIS control parameters.
//!
//! `Params` is the plain value snapshot the engine reads each block. `ParamId`
//! and `ParamSpec` describe the parameters the way a host exposes them, and
//! `SharedParams` lets a control thread publish knob values that the audio
//! thread picks up once per block.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AxisError;

use super::engine::AxisEngine;
use super::math::clamp;

/// Identifies one of the five parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    Rotation,
    Mass,
    Body,
    Load,
    Wear,
}

impl ParamId {
    /// All parameters, in host layout order.
    pub const ALL: [ParamId; 5] = [
        ParamId::Rotation,
        ParamId::Mass,
        ParamId::Body,
        ParamId::Load,
        ParamId::Wear,
    ];

    /// Stable host identifier used for automation.
    pub fn id(self) -> &'static str {
        match self {
            ParamId::Rotation => "ROTATION",
            ParamId::Mass => "MASS",
            ParamId::Body => "BODY",
            ParamId::Load => "LOAD",
            ParamId::Wear => "WEAR",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Rotation => "Rotation",
            ParamId::Mass => "Mass",
            ParamId::Body => "Body",
            ParamId::Load => "Load",
            ParamId::Wear => "Wear",
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Rotation => 0.35,
            ParamId::Mass => 0.5,
            ParamId::Body => 0.5,
            ParamId::Load => 0.4,
            ParamId::Wear => 0.2,
        }
    }

    /// Look up a parameter by its host identifier (case-insensitive).
    pub fn from_id(id: &str) -> Option<ParamId> {
        ParamId::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id))
    }

    fn index(self) -> usize {
        match self {
            ParamId::Rotation => 0,
            ParamId::Mass => 1,
            ParamId::Body => 2,
            ParamId::Load => 3,
            ParamId::Wear => 4,
        }
    }
}

/// Control skew applied by hosts: knob travel is `value^SKEW`, which gives
/// finer resolution near zero.
pub const UI_SKEW: f32 = 0.5;

/// Serializable descriptor of a parameter, as handed to a host or UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub id: String,
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub skew: f32,
}

impl From<ParamId> for ParamSpec {
    fn from(p: ParamId) -> Self {
        ParamSpec {
            id: p.id().to_string(),
            name: p.name().to_string(),
            min: 0.0,
            max: 1.0,
            default: p.default_value(),
            skew: UI_SKEW,
        }
    }
}

impl ParamSpec {
    /// Map a parameter value to knob travel in [0, 1].
    pub fn to_normalized(&self, value: f32) -> f32 {
        let proportion = clamp((value - self.min) / (self.max - self.min), 0.0, 1.0);
        proportion.powf(self.skew)
    }

    /// Map knob travel in [0, 1] back to a parameter value.
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let proportion = clamp(normalized, 0.0, 1.0).powf(1.0 / self.skew);
        self.min + proportion * (self.max - self.min)
    }
}

/// Host parameter layout: one descriptor per parameter, in host order.
pub fn parameter_layout() -> Vec<ParamSpec> {
    ParamId::ALL.into_iter().map(ParamSpec::from).collect()
}

/// The five knob values, each clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub rotation: f32,
    pub body: f32,
    pub load: f32,
    pub mass: f32,
    pub wear: f32,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            rotation: ParamId::Rotation.default_value(),
            body: ParamId::Body.default_value(),
            load: ParamId::Load.default_value(),
            mass: ParamId::Mass.default_value(),
            wear: ParamId::Wear.default_value(),
        }
    }
}

impl Params {
    /// All five parameters at zero.
    pub fn zero() -> Self {
        Params {
            rotation: 0.0,
            body: 0.0,
            load: 0.0,
            mass: 0.0,
            wear: 0.0,
        }
    }

    /// Parse a JSON object such as `{"rotation": 0.8, "wear": 0.1}`.
    /// Missing fields keep their defaults; values are clamped.
    pub fn from_json(json: &str) -> Result<Self, AxisError> {
        let parsed: Params = serde_json::from_str(json)?;
        Ok(parsed.clamped())
    }

    /// Copy with every field clamped to [0, 1].
    pub fn clamped(self) -> Self {
        let mut p = Params::zero();
        for id in ParamId::ALL {
            p.set(id, self.get(id));
        }
        p
    }

    pub fn set_rotation(&mut self, value: f32) {
        self.rotation = clamp(value, 0.0, 1.0);
    }

    pub fn set_body(&mut self, value: f32) {
        self.body = clamp(value, 0.0, 1.0);
    }

    pub fn set_load(&mut self, value: f32) {
        self.load = clamp(value, 0.0, 1.0);
    }

    pub fn set_mass(&mut self, value: f32) {
        self.mass = clamp(value, 0.0, 1.0);
    }

    pub fn set_wear(&mut self, value: f32) {
        self.wear = clamp(value, 0.0, 1.0);
    }

    pub fn set(&mut self, id: ParamId, value: f32) {
        match id {
            ParamId::Rotation => self.set_rotation(value),
            ParamId::Mass => self.set_mass(value),
            ParamId::Body => self.set_body(value),
            ParamId::Load => self.set_load(value),
            ParamId::Wear => self.set_wear(value),
        }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Rotation => self.rotation,
            ParamId::Mass => self.mass,
            ParamId::Body => self.body,
            ParamId::Load => self.load,
            ParamId::Wear => self.wear,
        }
    }
}

/// Lock-free parameter mailbox shared between a control thread and the
/// audio thread. Each knob is a single atomic word, so readers see either
/// the old or the new value, never a torn one.
#[derive(Debug)]
pub struct SharedParams {
    knobs: [AtomicF32; 5],
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::from_params(Params::default())
    }
}

impl SharedParams {
    pub fn from_params(params: Params) -> Self {
        let params = params.clamped();
        SharedParams {
            knobs: ParamId::ALL.map(|id| AtomicF32::new(params.get(id))),
        }
    }

    /// Publish a new value (clamped to [0, 1]).
    pub fn set(&self, id: ParamId, value: f32) {
        self.knobs[id.index()].store(clamp(value, 0.0, 1.0), Ordering::Relaxed);
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.knobs[id.index()].load(Ordering::Relaxed)
    }

    /// Current values as a plain snapshot.
    pub fn snapshot(&self) -> Params {
        let mut p = Params::zero();
        for id in ParamId::ALL {
            p.set(id, self.get(id));
        }
        p
    }

    /// Hand the current values to the engine. Call once per block, before
    /// `process`, on the audio thread.
    pub fn apply_to<R: Rng + Clone>(&self, engine: &mut AxisEngine<R>) {
        engine.set_params(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn setters_clamp_to_unit_interval() {
        let mut p = Params::default();
        p.set_rotation(1.7);
        p.set_body(-0.2);
        p.set_load(0.3);
        p.set_mass(f32::NAN);
        p.set_wear(2.0);
        assert_eq!(p.rotation, 1.0);
        assert_eq!(p.body, 0.0);
        assert_eq!(p.load, 0.3);
        assert_eq!(p.mass, 0.0);
        assert_eq!(p.wear, 1.0);
    }

    #[test]
    fn defaults_match_host_layout() {
        let p = Params::default();
        assert_eq!(p.rotation, 0.35);
        assert_eq!(p.mass, 0.5);
        assert_eq!(p.body, 0.5);
        assert_eq!(p.load, 0.4);
        assert_eq!(p.wear, 0.2);
    }

    #[test]
    fn layout_order_and_ids() {
        let layout = parameter_layout();
        let ids: Vec<&str> = layout.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["ROTATION", "MASS", "BODY", "LOAD", "WEAR"]);
        assert!(layout.iter().all(|s| s.min == 0.0 && s.max == 1.0));
    }

    #[test]
    fn from_id_is_case_insensitive() {
        assert_eq!(ParamId::from_id("wear"), Some(ParamId::Wear));
        assert_eq!(ParamId::from_id("ROTATION"), Some(ParamId::Rotation));
        assert_eq!(ParamId::from_id("speed"), None);
    }

    #[test]
    fn skewed_normalisation_inverts() {
        let spec = ParamSpec::from(ParamId::Load);
        assert_relative_eq!(spec.to_normalized(0.25), 0.5, epsilon = 1e-6);
        assert_relative_eq!(spec.from_normalized(0.5), 0.25, epsilon = 1e-6);
        for i in 0..=10 {
            let v = i as f32 / 10.0;
            assert_relative_eq!(spec.from_normalized(spec.to_normalized(v)), v, epsilon = 1e-5);
        }
    }

    #[test]
    fn json_fills_missing_fields_and_clamps() {
        let p = Params::from_json(r#"{"rotation": 0.9, "wear": 3.0}"#).unwrap();
        assert_eq!(p.rotation, 0.9);
        assert_eq!(p.wear, 1.0);
        assert_eq!(p.body, 0.5);
        assert_eq!(p.mass, 0.5);
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(Params::from_json("not json"), Err(AxisError::Config(_))));
    }

    #[test]
    fn shared_params_publish_across_threads() {
        let shared = Arc::new(SharedParams::default());
        let writer = Arc::clone(&shared);
        std::thread::spawn(move || {
            writer.set(ParamId::Body, 0.9);
            writer.set(ParamId::Wear, -1.0);
        })
        .join()
        .unwrap();
        let snap = shared.snapshot();
        assert_eq!(snap.body, 0.9);
        assert_eq!(snap.wear, 0.0);
        assert_eq!(snap.rotation, 0.35);
    }

    #[test]
    fn apply_to_updates_engine() {
        let shared = SharedParams::from_params(Params::zero());
        shared.set(ParamId::Mass, 0.1);
        let mut engine = AxisEngine::new(48000.0);
        shared.apply_to(&mut engine);
        assert_eq!(engine.params(), Params { mass: 0.1, ..Params::zero() });
    }
}
