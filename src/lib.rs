pub mod dsp;
pub mod error;

pub use dsp::engine::AxisEngine;
pub use dsp::params::{ParamId, Params, SharedParams};
pub use dsp::renderer::RenderConfig;
pub use error::AxisError;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// WASM-exposed: return the axis-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the five parameter descriptors in host order.
#[wasm_bindgen]
pub fn parameter_layout() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&dsp::params::parameter_layout()).map_err(to_js_error)
}

/// WASM-exposed: render a JSON `RenderConfig` to a 16-bit stereo WAV byte array.
#[wasm_bindgen]
pub fn render_axis_wav(config_json: &str) -> Result<Vec<u8>, JsValue> {
    let config = RenderConfig::from_json(config_json).map_err(to_js_error)?;
    dsp::renderer::render_wav(&config).map_err(to_js_error)
}

/// WASM-exposed: render a JSON `RenderConfig` to interleaved stereo f32 samples.
#[wasm_bindgen]
pub fn render_axis_samples(config_json: &str) -> Result<Vec<f32>, JsValue> {
    let config = RenderConfig::from_json(config_json).map_err(to_js_error)?;
    dsp::renderer::render_interleaved(&config).map_err(to_js_error)
}

/// Real-time node for an AudioWorklet: one engine, fed one quantum at a time.
#[wasm_bindgen]
pub struct AxisNode {
    engine: AxisEngine,
}

#[wasm_bindgen]
impl AxisNode {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64, seed: u32) -> AxisNode {
        AxisNode {
            engine: AxisEngine::with_seed(sample_rate, seed as u64),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.engine.prepare(sample_rate);
    }

    pub fn set_rotation(&mut self, value: f32) {
        self.engine.set_rotation(value);
    }

    pub fn set_body(&mut self, value: f32) {
        self.engine.set_body(value);
    }

    pub fn set_load(&mut self, value: f32) {
        self.engine.set_load(value);
    }

    pub fn set_mass(&mut self, value: f32) {
        self.engine.set_mass(value);
    }

    pub fn set_wear(&mut self, value: f32) {
        self.engine.set_wear(value);
    }

    /// Set a parameter by host identifier (`"ROTATION"`, `"WEAR"`, …).
    pub fn set_param(&mut self, id: &str, value: f32) -> Result<(), JsValue> {
        let id = ParamId::from_id(id).ok_or_else(|| JsValue::from_str(&format!("unknown parameter '{id}'")))?;
        self.engine.set_param(id, value);
        Ok(())
    }

    /// Fill one render quantum. Both slices are overwritten.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.engine.process_stereo(left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_matches_engine() {
        let mut node = AxisNode::new(48000.0, 3);
        let mut engine = AxisEngine::with_seed(48000.0, 3);
        node.set_wear(0.7);
        node.set_rotation(0.9);
        engine.set_wear(0.7);
        engine.set_rotation(0.9);

        let mut a = ([0.0_f32; 128], [0.0_f32; 128]);
        let mut b = ([0.0_f32; 128], [0.0_f32; 128]);
        for _ in 0..4 {
            node.process(&mut a.0, &mut a.1);
            engine.process_stereo(&mut b.0, &mut b.1);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn version_is_set() {
        assert_eq!(core_version(), VERSION);
        assert!(!VERSION.is_empty());
    }
}
