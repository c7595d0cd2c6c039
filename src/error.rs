//! Construction errors
//!
//! Every misconfiguration is caught when a vocoder (or one of its stages) is
//! built. Once built, processing is total and never fails.

/// Error types for vocoder construction
#[derive(Debug, Clone, PartialEq)]
pub enum VocoderError {
    /// Fewer than two channels requested
    InvalidChannelCount(usize),
    /// `min_freq` not positive, or `max_freq` not above it
    InvalidFrequencyRange { min_freq: f64, max_freq: f64 },
    /// Q must be positive and finite
    InvalidQ(f64),
    /// Sample rate must be positive, and above twice the highest channel
    InvalidSampleRate { sample_rate: f64, max_freq: f64 },
    /// Envelope time constant must be finite and non-negative
    InvalidSmoothing(f64),
    /// Shaping exponent must exceed 1
    InvalidShaping(f64),
    /// A gain setting is out of range or not finite
    InvalidGain { name: &'static str, value: f64 },
    /// Too few channels to split into a non-empty low and high band
    ClassifierBands { channels: usize },
    /// The filter primitive rejected its parameters
    Filter(String),
    /// Arity of an associative operator must be at least 2
    InvalidArity(usize),
}

impl std::fmt::Display for VocoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VocoderError::InvalidChannelCount(n) => {
                write!(f, "Invalid channel count {} (need at least 2)", n)
            }
            VocoderError::InvalidFrequencyRange { min_freq, max_freq } => write!(
                f,
                "Invalid frequency range {} Hz..{} Hz (need 0 < min < max)",
                min_freq, max_freq
            ),
            VocoderError::InvalidQ(q) => write!(f, "Invalid Q {} (must be positive)", q),
            VocoderError::InvalidSampleRate {
                sample_rate,
                max_freq,
            } => write!(
                f,
                "Invalid sample rate {} Hz for highest channel at {} Hz",
                sample_rate, max_freq
            ),
            VocoderError::InvalidSmoothing(tau) => {
                write!(f, "Invalid envelope smoothing {} s", tau)
            }
            VocoderError::InvalidShaping(p) => {
                write!(f, "Invalid shaping exponent {} (must exceed 1)", p)
            }
            VocoderError::InvalidGain { name, value } => {
                write!(f, "Invalid {} {}", name, value)
            }
            VocoderError::ClassifierBands { channels } => write!(
                f,
                "Voiced/unvoiced classification needs at least 4 channels, got {}",
                channels
            ),
            VocoderError::Filter(msg) => write!(f, "Filter construction failed: {}", msg),
            VocoderError::InvalidArity(n) => {
                write!(f, "Invalid operator arity {} (need at least 2)", n)
            }
        }
    }
}

impl std::error::Error for VocoderError {}
