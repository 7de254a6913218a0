//! The AXIS signal path.
//!
//! Knob values are turned into block coefficients once per host block; the
//! sample loop runs rotor oscillators through the waveshaper, the rotating
//! filter network and the post chain. The same engine drives the WebAudio
//! node (via WASM) and the offline WAV renderer.

pub mod engine;
pub mod filter;
pub mod math;
pub mod mixer;
pub mod modulation;
pub mod network;
pub mod oscillator;
pub mod params;
pub mod renderer;
pub mod shaper;
