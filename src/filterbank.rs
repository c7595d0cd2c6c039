//! Channel Filter Bank
//!
//! One [`ChannelFilter`] per [`ChannelSpec`], all fed the same input. Filter
//! memory belongs to the bank, so analysing the modulator and synthesizing
//! the carrier takes two banks built from the same plan.

use crate::combinator::Module;
use crate::error::VocoderError;
use crate::plan::{ChannelPlan, ChannelSpec};
use crate::primitives::{mul, Filter};

/// A filter bound to one channel, scaled by the channel's gain boost
pub struct ChannelFilter {
    spec: ChannelSpec,
    filter: Filter,
}

impl ChannelFilter {
    pub fn new(spec: ChannelSpec, sample_rate: f64) -> Result<Self, VocoderError> {
        let filter = Filter::new(spec.filter_type, spec.frequency, spec.q, sample_rate)?;
        Ok(Self { spec, filter })
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }
}

impl Module for ChannelFilter {
    type In = f64;
    type Out = f64;

    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        mul(&[self.spec.gain_boost, self.filter.tick(input)])
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}

/// Splits one signal into per-channel signals
pub struct ChannelFilterBank {
    filters: Vec<ChannelFilter>,
}

impl ChannelFilterBank {
    /// Build a fresh bank (with cleared memory) for `plan`.
    pub fn new(plan: &ChannelPlan, sample_rate: f64) -> Result<Self, VocoderError> {
        let filters = plan
            .iter()
            .map(|spec| ChannelFilter::new(*spec, sample_rate))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelFilter> {
        self.filters.get(index)
    }

    /// Advance every channel by one sample, writing channel `k` to `outputs[k]`.
    #[inline]
    pub fn tick_into(&mut self, input: f64, outputs: &mut [f64]) {
        debug_assert_eq!(outputs.len(), self.filters.len());
        for (filter, out) in self.filters.iter_mut().zip(outputs.iter_mut()) {
            *out = filter.tick(input);
        }
    }

    /// Filter a whole block, returning one output block per channel.
    pub fn apply(&mut self, input: &[f64]) -> Vec<Vec<f64>> {
        self.filters
            .iter_mut()
            .map(|filter| {
                let mut out = vec![0.0; input.len()];
                filter.process(input, &mut out);
                out
            })
            .collect()
    }

    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
