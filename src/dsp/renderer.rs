//! Offline renderer: drives a fresh engine block by block and encodes the
//! result to WAV.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use super::engine::AxisEngine;
use super::params::Params;
use crate::error::{AxisError, Result};

/// Longest render accepted, in frames (ten minutes at 48 kHz).
pub const MAX_RENDER_FRAMES: usize = 48_000 * 600;

/// Settings for an offline render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sample_rate: u32,
    pub seconds: f64,
    /// Host block size; rotation inertia advances once per block.
    pub block_size: usize,
    pub seed: u64,
    pub params: Params,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            sample_rate: 48000,
            seconds: 2.0,
            block_size: 512,
            seed: 0,
            params: Params::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: RenderConfig = serde_json::from_str(json)?;
        config.params = config.params.clamped();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AxisError::InvalidSampleRate(self.sample_rate as f64));
        }
        if !(self.seconds.is_finite() && self.seconds > 0.0)
            || self.seconds * self.sample_rate as f64 > MAX_RENDER_FRAMES as f64
        {
            return Err(AxisError::InvalidDuration(self.seconds));
        }
        if self.block_size == 0 {
            return Err(AxisError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }

    /// Number of frames the render will produce.
    pub fn frames(&self) -> usize {
        (self.seconds * self.sample_rate as f64).round() as usize
    }
}

/// Planar stereo output of a render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    pub sample_rate: u32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Interleave as L, R, L, R, …
    pub fn interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Largest absolute sample over both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }
}

/// Render `config.seconds` of audio with a freshly prepared engine.
pub fn render(config: &RenderConfig) -> Result<StereoBuffer> {
    config.validate()?;
    let frames = config.frames();
    log::debug!(
        "rendering {frames} frames at {} Hz in blocks of {}",
        config.sample_rate,
        config.block_size
    );

    let mut engine = AxisEngine::with_seed(config.sample_rate as f64, config.seed);
    engine.set_params(config.params);

    let mut out = StereoBuffer {
        sample_rate: config.sample_rate,
        left: vec![0.0; frames],
        right: vec![0.0; frames],
    };
    for (left, right) in out
        .left
        .chunks_mut(config.block_size)
        .zip(out.right.chunks_mut(config.block_size))
    {
        engine.process_stereo(left, right);
    }

    Ok(out)
}

/// Render and return interleaved stereo `f32` samples.
pub fn render_interleaved(config: &RenderConfig) -> Result<Vec<f32>> {
    Ok(render(config)?.interleaved())
}

/// Render to a 16-bit stereo PCM WAV file held in memory.
pub fn render_wav(config: &RenderConfig) -> Result<Vec<u8>> {
    let buffer = render(config)?;
    encode_wav(&buffer)
}

/// Encode a stereo buffer as 16-bit PCM WAV bytes. Samples are clamped to
/// [-1, 1] before quantisation.
pub fn encode_wav(buffer: &StereoBuffer) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::with_capacity(44 + buffer.len() * 4);
    let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for (&l, &r) in buffer.left.iter().zip(&buffer.right) {
        writer.write_sample(to_i16(l))?;
        writer.write_sample(to_i16(r))?;
    }
    writer.finalize()?;

    Ok(bytes)
}

fn to_i16(sample: f32) -> i16 {
    let clamped = if sample.is_finite() { sample.clamp(-1.0, 1.0) } else { 0.0 };
    (clamped * i16::MAX as f32) as i16
}
