//! Vocoder Settings
//!
//! [`VocoderSettings`] is the full, immutable configuration of one vocoder
//! instance. It serializes with camelCase keys, and any key left out of a
//! serialized document takes its default:
//!
//! ```json
//! { "nrChannels": 20, "q": 5.0 }
//! ```

use crate::error::VocoderError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNELS: usize = 14;
pub const DEFAULT_MIN_FREQ: f64 = 70.0;
pub const DEFAULT_MAX_FREQ: f64 = 10000.0;
pub const DEFAULT_Q: f64 = 3.0;
/// Envelope attack/release time constant in seconds
pub const DEFAULT_ENVELOPE_SMOOTHING: f64 = 0.02;
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
/// Tuned by ear: each channel is boosted by `factor * sqrt(nr_channels)`
pub const DEFAULT_GAIN_FACTOR: f64 = 3.0;
/// Tuned by ear: envelope exponent that pushes the noise floor toward zero
pub const DEFAULT_SHAPING_EXPONENT: f64 = 1.5;
/// Level of the noise mixed into the carrier during unvoiced passages
pub const DEFAULT_NOISE_GAIN: f64 = 0.5;
pub const DEFAULT_NOISE_SEED: u64 = 0x5eed_c0de_da7a_b0b5;

/// Minimum channel count for voiced/unvoiced classification
pub const MIN_CLASSIFIER_CHANNELS: usize = 4;

/// Configuration of a vocoder instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VocoderSettings {
    /// Number of channels the modulator and carrier are split into
    pub nr_channels: usize,
    /// Cutoff of the lowest (lowpass) channel in Hz
    pub min_freq: f64,
    /// Cutoff of the highest (highpass) channel in Hz
    pub max_freq: f64,
    /// Quality factor shared by all channel filters
    pub q: f64,
    /// Envelope follower time constant in seconds
    pub envelope_smoothing: f64,
    pub sample_rate: f64,
    /// Loudness compensation factor, see [`DEFAULT_GAIN_FACTOR`]
    pub gain_factor: f64,
    /// Envelope shaping exponent; `None` leaves envelopes linear
    pub shaping_exponent: Option<f64>,
    /// Mix noise into the carrier when the modulator sounds unvoiced
    pub voiced_unvoiced: bool,
    pub noise_gain: f64,
    pub noise_seed: u64,
}

impl Default for VocoderSettings {
    fn default() -> Self {
        Self {
            nr_channels: DEFAULT_CHANNELS,
            min_freq: DEFAULT_MIN_FREQ,
            max_freq: DEFAULT_MAX_FREQ,
            q: DEFAULT_Q,
            envelope_smoothing: DEFAULT_ENVELOPE_SMOOTHING,
            sample_rate: DEFAULT_SAMPLE_RATE,
            gain_factor: DEFAULT_GAIN_FACTOR,
            shaping_exponent: Some(DEFAULT_SHAPING_EXPONENT),
            voiced_unvoiced: true,
            noise_gain: DEFAULT_NOISE_GAIN,
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl VocoderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, nr_channels: usize) -> Self {
        self.nr_channels = nr_channels;
        self
    }

    pub fn with_frequency_range(mut self, min_freq: f64, max_freq: f64) -> Self {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn with_envelope_smoothing(mut self, seconds: f64) -> Self {
        self.envelope_smoothing = seconds;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_gain_factor(mut self, factor: f64) -> Self {
        self.gain_factor = factor;
        self
    }

    pub fn with_shaping(mut self, exponent: Option<f64>) -> Self {
        self.shaping_exponent = exponent;
        self
    }

    pub fn with_voiced_unvoiced(mut self, enabled: bool) -> Self {
        self.voiced_unvoiced = enabled;
        self
    }

    pub fn with_noise(mut self, gain: f64, seed: u64) -> Self {
        self.noise_gain = gain;
        self.noise_seed = seed;
        self
    }

    /// Check the fields that determine the channel layout.
    pub fn validate_layout(&self) -> Result<(), VocoderError> {
        if self.nr_channels < 2 {
            return Err(VocoderError::InvalidChannelCount(self.nr_channels));
        }
        // also rejects NaN
        let range_ok = self.min_freq > 0.0
            && self.max_freq > self.min_freq
            && self.max_freq.is_finite();
        if !range_ok {
            return Err(VocoderError::InvalidFrequencyRange {
                min_freq: self.min_freq,
                max_freq: self.max_freq,
            });
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return Err(VocoderError::InvalidQ(self.q));
        }
        Ok(())
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), VocoderError> {
        self.validate_layout()?;

        if !(self.sample_rate.is_finite() && self.max_freq < self.sample_rate / 2.0) {
            return Err(VocoderError::InvalidSampleRate {
                sample_rate: self.sample_rate,
                max_freq: self.max_freq,
            });
        }
        if !(self.envelope_smoothing >= 0.0 && self.envelope_smoothing.is_finite()) {
            return Err(VocoderError::InvalidSmoothing(self.envelope_smoothing));
        }
        if let Some(p) = self.shaping_exponent {
            if !(p > 1.0 && p.is_finite()) {
                return Err(VocoderError::InvalidShaping(p));
            }
        }
        if !(self.gain_factor > 0.0 && self.gain_boost().is_finite()) {
            return Err(VocoderError::InvalidGain {
                name: "gain factor",
                value: self.gain_factor,
            });
        }
        if !(self.noise_gain >= 0.0 && self.noise_gain.is_finite()) {
            return Err(VocoderError::InvalidGain {
                name: "noise gain",
                value: self.noise_gain,
            });
        }
        if self.voiced_unvoiced && self.nr_channels < MIN_CLASSIFIER_CHANNELS {
            return Err(VocoderError::ClassifierBands {
                channels: self.nr_channels,
            });
        }
        Ok(())
    }

    /// Per-channel gain that keeps loudness steady as the channel count grows
    pub fn gain_boost(&self) -> f64 {
        self.gain_factor * (self.nr_channels as f64).sqrt()
    }

    /// Serialize to JSON string
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string; missing keys take their defaults
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
