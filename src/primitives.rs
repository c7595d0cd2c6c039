//! Signal Primitives
//!
//! The small set of building blocks the vocoder is assembled from:
//!
//! - [`Filter`] - a second-order lowpass / bandpass / highpass section
//!   (backed by the `biquad` crate)
//! - [`OnePole`] - one-pole smoothing with a precomputed pole
//! - [`Rectifier`] - full-wave rectification
//! - [`WhiteNoise`] - seeded uniform white noise
//! - Scalar helpers: [`add`], [`mul`], [`div`], [`pow`], [`ge`], [`select`]
//!
//! `add` and `mul` model primitives with a bounded operand count
//! ([`PRIMITIVE_ARITY`]); use [`crate::extend::AssociativeExtend`] to go beyond it.

use crate::combinator::Module;
use crate::error::VocoderError;
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Maximum operand count of [`add`] and [`mul`]
pub const PRIMITIVE_ARITY: usize = 8;

/// Response shape of a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Lowpass,
    Bandpass,
    Highpass,
}

/// Second-order filter section
///
/// Each instance owns its own delay memory, so one instance must only ever
/// see one input signal.
pub struct Filter {
    kind: FilterType,
    frequency: f64,
    q: f64,
    coeffs: Coefficients<f64>,
    state: DirectForm2Transposed<f64>,
}

impl Filter {
    /// Build a filter with cutoff (lowpass/highpass) or center (bandpass)
    /// frequency `frequency` in Hz.
    pub fn new(
        kind: FilterType,
        frequency: f64,
        q: f64,
        sample_rate: f64,
    ) -> Result<Self, VocoderError> {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(VocoderError::Filter(format!("sample rate {} Hz", sample_rate)));
        }
        if !(frequency > 0.0 && frequency.is_finite()) {
            return Err(VocoderError::Filter(format!("frequency {} Hz", frequency)));
        }

        let response = match kind {
            FilterType::Lowpass => biquad::Type::LowPass,
            FilterType::Bandpass => biquad::Type::BandPass,
            FilterType::Highpass => biquad::Type::HighPass,
        };
        let coeffs =
            Coefficients::<f64>::from_params(response, sample_rate.hz(), frequency.hz(), q)
                .map_err(|e| {
                    VocoderError::Filter(format!("{:?} at {} Hz: {:?}", kind, frequency, e))
                })?;

        Ok(Self {
            kind,
            frequency,
            q,
            coeffs,
            state: DirectForm2Transposed::<f64>::new(coeffs),
        })
    }

    pub fn lowpass(frequency: f64, q: f64, sample_rate: f64) -> Result<Self, VocoderError> {
        Self::new(FilterType::Lowpass, frequency, q, sample_rate)
    }

    pub fn bandpass(frequency: f64, q: f64, sample_rate: f64) -> Result<Self, VocoderError> {
        Self::new(FilterType::Bandpass, frequency, q, sample_rate)
    }

    pub fn highpass(frequency: f64, q: f64, sample_rate: f64) -> Result<Self, VocoderError> {
        Self::new(FilterType::Highpass, frequency, q, sample_rate)
    }

    pub fn kind(&self) -> FilterType {
        self.kind
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn q(&self) -> f64 {
        self.q
    }
}

impl Module for Filter {
    type In = f64;
    type Out = f64;

    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        self.state.run(input)
    }

    fn reset(&mut self) {
        self.state = DirectForm2Transposed::<f64>::new(self.coeffs);
    }
}

/// One-pole smoother: `y[n] = (1 - pole) * x[n] + pole * y[n-1]`
///
/// The same pole governs rising and falling edges.
#[derive(Debug, Clone)]
pub struct OnePole {
    pole: f64,
    state: f64,
}

impl OnePole {
    pub fn new(pole: f64) -> Self {
        Self { pole, state: 0.0 }
    }

    /// Smoother whose step response reaches `1 - 1/e` after `time_constant`
    /// seconds. A zero time constant passes the input through.
    pub fn from_time_constant(time_constant: f64, sample_rate: f64) -> Self {
        Self::new(tau_to_pole(time_constant, sample_rate))
    }

    pub fn pole(&self) -> f64 {
        self.pole
    }
}

/// Convert a time constant in seconds to a per-sample pole coefficient
pub fn tau_to_pole(time_constant: f64, sample_rate: f64) -> f64 {
    if time_constant <= 0.0 {
        return 0.0;
    }
    libm::exp(-1.0 / (time_constant * sample_rate))
}

impl Module for OnePole {
    type In = f64;
    type Out = f64;

    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        self.state = (1.0 - self.pole) * input + self.pole * self.state;
        self.state
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// Full-wave rectifier
#[derive(Debug, Clone, Copy, Default)]
pub struct Rectifier;

impl Module for Rectifier {
    type In = f64;
    type Out = f64;

    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        input.abs()
    }

    fn reset(&mut self) {}
}

/// Uniform white noise in [-1, 1)
///
/// Seeded, so two generators with the same seed produce the same stream.
pub struct WhiteNoise {
    seed: u64,
    rng: StdRng,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Module for WhiteNoise {
    type In = ();
    type Out = f64;

    #[inline]
    fn tick(&mut self, _input: ()) -> f64 {
        self.rng.gen_range(-1.0..1.0)
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

/// Sum of up to [`PRIMITIVE_ARITY`] operands
#[inline]
pub fn add(operands: &[f64]) -> f64 {
    debug_assert!(operands.len() <= PRIMITIVE_ARITY);
    operands.iter().sum()
}

/// Product of up to [`PRIMITIVE_ARITY`] operands
#[inline]
pub fn mul(operands: &[f64]) -> f64 {
    debug_assert!(operands.len() <= PRIMITIVE_ARITY);
    operands.iter().product()
}

#[inline]
pub fn div(x: f64, n: f64) -> f64 {
    x / n
}

#[inline]
pub fn pow(x: f64, p: f64) -> f64 {
    libm::pow(x, p)
}

#[inline]
pub fn ge(a: f64, b: f64) -> bool {
    a >= b
}

#[inline]
pub fn select(cond: bool, a: f64, b: f64) -> f64 {
    if cond {
        a
    } else {
        b
    }
}
