//! Voiced/Unvoiced Classification
//!
//! Vowels and other voiced sounds carry most of their energy in the low
//! channels; fricatives and other unvoiced sounds in the high ones. The
//! classifier compares the mean envelope of the lowest third of the channels
//! with that of the highest quarter:
//!
//! ```text
//! voiced = mean(env[0 .. n/3]) >= mean(env[n - n/4 .. n])
//! ```

use crate::error::VocoderError;
use crate::extend::AssociativeExtend;
use crate::primitives::{add, div, ge};
use crate::settings::MIN_CLASSIFIER_CHANNELS;
use std::ops::Range;

type Sum = AssociativeExtend<fn(&[f64]) -> f64>;

/// Decides, per sample, whether the modulator sounds voiced
pub struct VoicedUnvoicedClassifier {
    low: Range<usize>,
    high: Range<usize>,
    sum: Sum,
    scratch: Vec<f64>,
}

impl VoicedUnvoicedClassifier {
    /// Classifier for `nr_channels` envelopes ordered low to high.
    ///
    /// Needs at least 4 channels so both bands are non-empty.
    pub fn new(nr_channels: usize) -> Result<Self, VocoderError> {
        let low_len = nr_channels / 3;
        let high_len = nr_channels / 4;
        if nr_channels < MIN_CLASSIFIER_CHANNELS || low_len == 0 || high_len == 0 {
            return Err(VocoderError::ClassifierBands {
                channels: nr_channels,
            });
        }
        Ok(Self {
            low: 0..low_len,
            high: nr_channels - high_len..nr_channels,
            sum: AssociativeExtend::with_default_arity(add as fn(&[f64]) -> f64),
            scratch: Vec::with_capacity(low_len.max(high_len)),
        })
    }

    /// Channels averaged into the low-band amplitude
    pub fn low_band(&self) -> Range<usize> {
        self.low.clone()
    }

    /// Channels averaged into the high-band amplitude
    pub fn high_band(&self) -> Range<usize> {
        self.high.clone()
    }

    /// `true` when the low band is at least as loud as the high band.
    pub fn classify(&mut self, envelopes: &[f64]) -> bool {
        debug_assert!(envelopes.len() >= self.high.end);
        let low = self.mean(self.low.clone(), envelopes);
        let high = self.mean(self.high.clone(), envelopes);
        ge(low, high)
    }

    fn mean(&mut self, band: Range<usize>, envelopes: &[f64]) -> f64 {
        let count = band.len() as f64;
        self.scratch.clear();
        self.scratch.extend_from_slice(&envelopes[band]);
        let total = self.sum.reduce_in_place(&mut self.scratch).unwrap_or(0.0);
        div(total, count)
    }
}
