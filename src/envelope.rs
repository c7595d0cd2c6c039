//! Envelope Following
//!
//! Each channel's envelope is `shape(smooth(|x|))`:
//!
//! 1. full-wave rectification
//! 2. one-pole smoothing; one time constant for both attack and release
//! 3. optional `env ^ p` shaping (`p > 1`), which squashes low levels harder
//!    than high ones and keeps the noise floor from being heard
//!
//! The stages are composed with the module combinators, so a single channel
//! is just `Rectifier.then(OnePole).then(Shaper)`.

use crate::combinator::{Chain, Module, ModuleExt};
use crate::error::VocoderError;
use crate::primitives::{pow, OnePole, Rectifier};

/// Optional power-law shaping of a non-negative envelope
#[derive(Debug, Clone, Copy)]
pub struct Shaper {
    exponent: Option<f64>,
}

impl Shaper {
    pub fn new(exponent: Option<f64>) -> Result<Self, VocoderError> {
        match exponent {
            Some(p) if !(p > 1.0 && p.is_finite()) => Err(VocoderError::InvalidShaping(p)),
            _ => Ok(Self { exponent }),
        }
    }

    pub fn exponent(&self) -> Option<f64> {
        self.exponent
    }
}

impl Module for Shaper {
    type In = f64;
    type Out = f64;

    #[inline]
    fn tick(&mut self, envelope: f64) -> f64 {
        match self.exponent {
            Some(p) => pow(envelope, p),
            None => envelope,
        }
    }

    fn reset(&mut self) {}
}

/// Envelope of a single signal
pub type ChannelEnvelope = Chain<Chain<Rectifier, OnePole>, Shaper>;

/// Build the envelope follower for one signal.
///
/// `time_constant` is in seconds; zero disables smoothing.
pub fn channel_envelope(
    time_constant: f64,
    sample_rate: f64,
    shaping: Option<f64>,
) -> Result<ChannelEnvelope, VocoderError> {
    if !(time_constant >= 0.0 && time_constant.is_finite()) {
        return Err(VocoderError::InvalidSmoothing(time_constant));
    }
    let shaper = Shaper::new(shaping)?;
    Ok(Rectifier
        .then(OnePole::from_time_constant(time_constant, sample_rate))
        .then(shaper))
}

/// Per-channel envelope followers, one state record per channel
pub struct EnvelopeFollower {
    channels: Vec<ChannelEnvelope>,
}

impl EnvelopeFollower {
    pub fn new(
        nr_channels: usize,
        time_constant: f64,
        sample_rate: f64,
        shaping: Option<f64>,
    ) -> Result<Self, VocoderError> {
        let channels = (0..nr_channels)
            .map(|_| channel_envelope(time_constant, sample_rate, shaping))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { channels })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Advance every channel by one sample: `envelopes[k]` follows `bands[k]`.
    #[inline]
    pub fn follow(&mut self, bands: &[f64], envelopes: &mut [f64]) {
        debug_assert_eq!(bands.len(), self.channels.len());
        debug_assert_eq!(envelopes.len(), self.channels.len());
        for ((follower, &band), env) in self
            .channels
            .iter_mut()
            .zip(bands.iter())
            .zip(envelopes.iter_mut())
        {
            *env = follower.tick(band);
        }
    }

    pub fn reset(&mut self) {
        for follower in &mut self.channels {
            follower.reset();
        }
    }
}
