//! # Vocoder: Multi-Band Channel Vocoder
//!
//! `vocoder` imposes the spectral envelope of a *modulator* (usually a voice)
//! onto a *carrier* (usually a synthesizer). Both signals are split into the
//! same set of exponentially spaced frequency channels; the amplitude
//! envelope of each modulator channel drives the level of the matching
//! carrier channel, and the channels are summed back together.
//!
//! ## Architecture
//!
//! - **Combinators** ([`combinator`]) - the [`Module`] trait every stage
//!   implements, plus `then` / `map` / `fanout` composition
//! - **Primitives** ([`primitives`]) - filters, one-pole smoothing, noise and
//!   the bounded-arity arithmetic the vocoder is built from
//! - **Associative extension** ([`mod@extend`]) - lifts bounded-arity operators
//!   to any number of operands
//! - **Vocoder stages** - [`plan`], [`filterbank`], [`envelope`],
//!   [`classifier`], assembled by [`vocoder`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vocoder::prelude::*;
//!
//! let settings = VocoderSettings::default().with_channels(16);
//! let mut voc = Vocoder::new(settings).unwrap();
//!
//! let voice = vec![0.0; 512];
//! let synth = vec![0.0; 512];
//! let mut out = vec![0.0; 512];
//! voc.process(&voice, &synth, &mut out);
//! ```

pub mod classifier;
pub mod combinator;
pub mod envelope;
pub mod error;
pub mod extend;
pub mod filterbank;
pub mod plan;
pub mod primitives;
pub mod settings;
pub mod vocoder;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::combinator::{Chain, Fanout, Map, Module, ModuleExt};

    pub use crate::primitives::{Filter, FilterType, OnePole, Rectifier, WhiteNoise};

    pub use crate::extend::{extend, AssociativeExtend, DEFAULT_ARITY};

    pub use crate::classifier::VoicedUnvoicedClassifier;
    pub use crate::envelope::{channel_envelope, ChannelEnvelope, EnvelopeFollower, Shaper};
    pub use crate::filterbank::{ChannelFilter, ChannelFilterBank};
    pub use crate::plan::{ChannelPlan, ChannelSpec};
    pub use crate::vocoder::{StereoVocoder, Vocoder};

    pub use crate::error::VocoderError;
    pub use crate::settings::VocoderSettings;
}

// Re-export key types at crate root for convenience
pub use prelude::*;
