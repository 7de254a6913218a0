use thiserror::Error;

/// Errors from configuration and offline rendering.
///
/// The real-time path (`AxisEngine::process`) never fails; it sanitises its
/// inputs instead.
#[derive(Debug, Error)]
pub enum AxisError {
    #[error("invalid sample rate {0} (must be finite and > 0)")]
    InvalidSampleRate(f64),

    #[error("invalid block size {0} (must be > 0)")]
    InvalidBlockSize(usize),

    #[error("invalid duration {0}s (must be finite and > 0)")]
    InvalidDuration(f64),

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AxisError>;
