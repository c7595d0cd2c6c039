//! Channel Planning
//!
//! Works out, once per vocoder, which filter each channel uses and where it
//! sits in frequency. Frequencies are exponentially spaced from `min_freq`
//! to `max_freq`:
//!
//! ```text
//! base    = (max_freq / min_freq) ^ (1 / (n - 1))
//! offset  = ln(min_freq) / ln(base)
//! fc(k)   = base ^ (offset + k)
//! ```
//!
//! so that `fc(0) == min_freq` and `fc(n - 1) == max_freq`. The first channel
//! is a lowpass, the last a highpass, and everything in between a bandpass.

use crate::error::VocoderError;
use crate::primitives::FilterType;
use crate::settings::VocoderSettings;
use serde::{Deserialize, Serialize};

/// Layout of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub index: usize,
    /// Cutoff (lowpass/highpass) or center (bandpass) frequency in Hz
    pub frequency: f64,
    pub filter_type: FilterType,
    pub q: f64,
    /// Gain applied to the filter output
    pub gain_boost: f64,
}

impl ChannelSpec {
    /// Nominal bandwidth in Hz
    pub fn bandwidth(&self) -> f64 {
        self.frequency / self.q
    }
}

/// The channel layout of one vocoder, lowest channel first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPlan {
    channels: Vec<ChannelSpec>,
}

impl ChannelPlan {
    /// Compute the layout for `settings`.
    ///
    /// Only the layout fields (`nr_channels`, frequency range, `q`) are
    /// checked here.
    pub fn new(settings: &VocoderSettings) -> Result<Self, VocoderError> {
        settings.validate_layout()?;

        let n = settings.nr_channels;
        let base = libm::pow(settings.max_freq / settings.min_freq, 1.0 / (n - 1) as f64);
        let offset = libm::log(settings.min_freq) / libm::log(base);
        let gain_boost = settings.gain_boost();

        let channels = (0..n)
            .map(|k| {
                let spec = ChannelSpec {
                    index: k,
                    frequency: libm::pow(base, offset + k as f64),
                    filter_type: filter_type_for(k, n),
                    q: settings.q,
                    gain_boost,
                };
                log::debug!(
                    "vocoder channel {}: {:?} fc={} q={} bandwidth={}",
                    k,
                    spec.filter_type,
                    spec.frequency.round(),
                    spec.q,
                    spec.bandwidth().round()
                );
                spec
            })
            .collect();

        Ok(Self { channels })
    }

    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelSpec> {
        self.channels.iter()
    }

    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.channels.iter().map(|c| c.frequency)
    }
}

/// Positional filter choice: lowpass and highpass at the edges, bandpass between.
fn filter_type_for(index: usize, nr_channels: usize) -> FilterType {
    if index == 0 {
        FilterType::Lowpass
    } else if index + 1 == nr_channels {
        FilterType::Highpass
    } else {
        FilterType::Bandpass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_bounds() {
        let plan = ChannelPlan::new(&VocoderSettings::default()).unwrap();
        let freqs: Vec<f64> = plan.frequencies().collect();
        assert_eq!(freqs.len(), 14);
        assert_relative_eq!(freqs[0], 70.0, max_relative = 1e-6);
        assert_relative_eq!(freqs[13], 10000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_frequencies_strictly_increase() {
        for n in [2, 3, 4, 7, 14, 32, 100] {
            for (lo, hi) in [(20.0, 20000.0), (70.0, 10000.0), (100.0, 101.0)] {
                let settings = VocoderSettings::new()
                    .with_channels(n)
                    .with_frequency_range(lo, hi);
                let plan = ChannelPlan::new(&settings).unwrap();
                let freqs: Vec<f64> = plan.frequencies().collect();
                assert!(
                    freqs.windows(2).all(|w| w[0] < w[1]),
                    "n={} range={}..{}",
                    n,
                    lo,
                    hi
                );
                assert_relative_eq!(freqs[0], lo, max_relative = 1e-6);
                assert_relative_eq!(freqs[n - 1], hi, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_spacing_is_geometric() {
        let plan = ChannelPlan::new(&VocoderSettings::default()).unwrap();
        let freqs: Vec<f64> = plan.frequencies().collect();
        let ratio = freqs[1] / freqs[0];
        for w in freqs.windows(2) {
            assert_relative_eq!(w[1] / w[0], ratio, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_filter_types_by_position() {
        let plan = ChannelPlan::new(&VocoderSettings::new().with_channels(6)).unwrap();
        let types: Vec<FilterType> = plan.iter().map(|c| c.filter_type).collect();
        assert_eq!(types[0], FilterType::Lowpass);
        assert_eq!(types[5], FilterType::Highpass);
        assert!(types[1..5].iter().all(|t| *t == FilterType::Bandpass));

        let plan = ChannelPlan::new(
            &VocoderSettings::new()
                .with_channels(2)
                .with_voiced_unvoiced(false),
        )
        .unwrap();
        assert_eq!(plan.channels()[0].filter_type, FilterType::Lowpass);
        assert_eq!(plan.channels()[1].filter_type, FilterType::Highpass);
    }

    #[test]
    fn test_gain_boost_shared_by_all_channels() {
        let plan = ChannelPlan::new(&VocoderSettings::default()).unwrap();
        let expected = 3.0 * 14.0_f64.sqrt();
        for (k, c) in plan.iter().enumerate() {
            assert_eq!(c.index, k);
            assert_eq!(c.q, 3.0);
            assert_relative_eq!(c.gain_boost, expected);
        }
    }

    #[test]
    fn test_bandwidth() {
        let plan = ChannelPlan::new(&VocoderSettings::default()).unwrap();
        assert_relative_eq!(plan.channels()[0].bandwidth(), 70.0 / 3.0, max_relative = 1e-6);
    }

    #[test]
    fn test_invalid_layouts_rejected() {
        assert!(ChannelPlan::new(&VocoderSettings::new().with_channels(1)).is_err());
        let inverted = VocoderSettings::new().with_frequency_range(70.0, 50.0);
        assert!(ChannelPlan::new(&inverted).is_err());
        assert!(ChannelPlan::new(&VocoderSettings::new().with_q(0.0)).is_err());
    }
}
