//! The Vocoder
//!
//! Per sample:
//!
//! ```text
//! modulator ─► analysis bank ─► envelope followers ─► env[k] ───────┐
//!                                       │                           │
//!                                       ▼ (optional)                ▼
//! carrier ─► [+ noise when unvoiced] ─► synthesis bank ─► car[k] ─► env[k] * car[k]
//!                                                                   │
//!                                                         sum over k (extended add)
//!                                                                   ▼
//!                                                                output
//! ```
//!
//! All per-channel buffers are allocated when the vocoder is built; `tick`
//! and `process` never allocate.

use crate::classifier::VoicedUnvoicedClassifier;
use crate::combinator::Module;
use crate::envelope::EnvelopeFollower;
use crate::error::VocoderError;
use crate::extend::AssociativeExtend;
use crate::filterbank::ChannelFilterBank;
use crate::plan::ChannelPlan;
use crate::primitives::{add, mul, select, WhiteNoise};
use crate::settings::VocoderSettings;

type Sum = AssociativeExtend<fn(&[f64]) -> f64>;

/// A multi-band channel vocoder
///
/// ```rust
/// use vocoder::prelude::*;
///
/// let mut voc = Vocoder::new(VocoderSettings::default()).unwrap();
/// let modulator = vec![0.0; 64];
/// let carrier = vec![0.5; 64];
/// let mut output = vec![0.0; 64];
/// voc.process(&modulator, &carrier, &mut output);
/// assert!(output.iter().all(|y| *y == 0.0));
/// ```
pub struct Vocoder {
    settings: VocoderSettings,
    plan: ChannelPlan,
    analysis: ChannelFilterBank,
    synthesis: ChannelFilterBank,
    envelopes: EnvelopeFollower,
    classifier: Option<VoicedUnvoicedClassifier>,
    noise: WhiteNoise,
    sum: Sum,
    bands: Vec<f64>,
    levels: Vec<f64>,
    carriers: Vec<f64>,
    products: Vec<f64>,
    voiced: bool,
}

impl Vocoder {
    /// Build a vocoder, rejecting invalid settings.
    pub fn new(settings: VocoderSettings) -> Result<Self, VocoderError> {
        if let Err(e) = settings.validate() {
            log::warn!("rejecting vocoder settings: {}", e);
            return Err(e);
        }

        let plan = ChannelPlan::new(&settings)?;
        let n = plan.len();
        let analysis = ChannelFilterBank::new(&plan, settings.sample_rate)?;
        let synthesis = ChannelFilterBank::new(&plan, settings.sample_rate)?;
        let envelopes = EnvelopeFollower::new(
            n,
            settings.envelope_smoothing,
            settings.sample_rate,
            settings.shaping_exponent,
        )?;
        let classifier = if settings.voiced_unvoiced {
            Some(VoicedUnvoicedClassifier::new(n)?)
        } else {
            None
        };

        log::info!(
            "vocoder: {} channels {}..{} Hz, q={}, smoothing={}s, shaping={:?}, voiced/unvoiced={}",
            n,
            settings.min_freq,
            settings.max_freq,
            settings.q,
            settings.envelope_smoothing,
            settings.shaping_exponent,
            settings.voiced_unvoiced
        );

        Ok(Self {
            noise: WhiteNoise::new(settings.noise_seed),
            settings,
            plan,
            analysis,
            synthesis,
            envelopes,
            classifier,
            sum: AssociativeExtend::with_default_arity(add as fn(&[f64]) -> f64),
            bands: vec![0.0; n],
            levels: vec![0.0; n],
            carriers: vec![0.0; n],
            products: vec![0.0; n],
            voiced: true,
        })
    }

    pub fn settings(&self) -> &VocoderSettings {
        &self.settings
    }

    pub fn plan(&self) -> &ChannelPlan {
        &self.plan
    }

    /// Channel envelopes computed by the most recent sample
    pub fn channel_envelopes(&self) -> &[f64] {
        &self.levels
    }

    /// Classification of the most recent sample (always `true` when the
    /// classifier is disabled)
    pub fn last_voiced(&self) -> bool {
        self.voiced
    }

    /// Process one modulator/carrier sample pair.
    #[inline]
    pub fn tick(&mut self, modulator: f64, carrier: f64) -> f64 {
        self.analysis.tick_into(modulator, &mut self.bands);
        self.envelopes.follow(&self.bands, &mut self.levels);

        let carrier = match self.classifier.as_mut() {
            Some(classifier) => {
                self.voiced = classifier.classify(&self.levels);
                let noise = mul(&[self.settings.noise_gain, self.noise.tick(())]);
                let noisy = add(&[carrier, noise]);
                select(self.voiced, carrier, noisy)
            }
            None => carrier,
        };

        self.synthesis.tick_into(carrier, &mut self.carriers);
        for ((product, &level), &band) in self
            .products
            .iter_mut()
            .zip(self.levels.iter())
            .zip(self.carriers.iter())
        {
            *product = mul(&[level, band]);
        }

        self.sum.reduce_in_place(&mut self.products).unwrap_or(0.0)
    }

    /// Process a block. Only the first `min(modulator, carrier, output)`
    /// samples are touched.
    pub fn process(&mut self, modulator: &[f64], carrier: &[f64], output: &mut [f64]) {
        for ((out, &m), &c) in output.iter_mut().zip(modulator.iter()).zip(carrier.iter()) {
            *out = self.tick(m, c);
        }
    }

    /// Clear all filter, envelope, and noise state.
    pub fn reset(&mut self) {
        self.analysis.reset();
        self.synthesis.reset();
        self.envelopes.reset();
        self.noise.reset();
        self.levels.fill(0.0);
        self.voiced = true;
    }
}

impl Module for Vocoder {
    /// `(modulator, carrier)`
    type In = (f64, f64);
    type Out = f64;

    #[inline]
    fn tick(&mut self, (modulator, carrier): Self::In) -> f64 {
        Vocoder::tick(self, modulator, carrier)
    }

    fn reset(&mut self) {
        Vocoder::reset(self);
    }
}

/// Two independent vocoders, one per input channel, sharing one carrier
pub struct StereoVocoder {
    left: Vocoder,
    right: Vocoder,
}

impl StereoVocoder {
    pub fn new(settings: VocoderSettings) -> Result<Self, VocoderError> {
        Ok(Self {
            left: Vocoder::new(settings.clone())?,
            right: Vocoder::new(settings)?,
        })
    }

    pub fn left(&self) -> &Vocoder {
        &self.left
    }

    pub fn right(&self) -> &Vocoder {
        &self.right
    }

    #[inline]
    pub fn tick(&mut self, (left, right): (f64, f64), carrier: f64) -> (f64, f64) {
        (self.left.tick(left, carrier), self.right.tick(right, carrier))
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

impl Module for StereoVocoder {
    /// `((left modulator, right modulator), carrier)`
    type In = ((f64, f64), f64);
    type Out = (f64, f64);

    #[inline]
    fn tick(&mut self, (modulators, carrier): Self::In) -> Self::Out {
        StereoVocoder::tick(self, modulators, carrier)
    }

    fn reset(&mut self) {
        StereoVocoder::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_NOISE_SEED;
    use std::f64::consts::TAU;

    const SR: f64 = 44100.0;

    fn sine(freq: f64, amp: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amp * (TAU * freq * i as f64 / SR).sin())
            .collect()
    }

    fn plain_settings() -> VocoderSettings {
        VocoderSettings::new()
            .with_shaping(None)
            .with_voiced_unvoiced(false)
    }

    fn run(voc: &mut Vocoder, modulator: &[f64], carrier: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; modulator.len()];
        voc.process(modulator, carrier, &mut out);
        out
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert_eq!(
            Vocoder::new(VocoderSettings::new().with_channels(1)).err(),
            Some(VocoderError::InvalidChannelCount(1))
        );
        assert!(matches!(
            Vocoder::new(VocoderSettings::new().with_frequency_range(70.0, 50.0)).err(),
            Some(VocoderError::InvalidFrequencyRange { .. })
        ));
        assert!(matches!(
            Vocoder::new(VocoderSettings::new().with_channels(3)).err(),
            Some(VocoderError::ClassifierBands { channels: 3 })
        ));
        assert!(matches!(
            Vocoder::new(VocoderSettings::new().with_gain_factor(f64::INFINITY)).err(),
            Some(VocoderError::InvalidGain { .. })
        ));
        assert!(matches!(
            Vocoder::new(VocoderSettings::new().with_noise(f64::NAN, 7)).err(),
            Some(VocoderError::InvalidGain { .. })
        ));
    }

    #[test]
    fn test_silent_modulator_gives_silence() {
        let mut voc = Vocoder::new(VocoderSettings::default()).unwrap();
        let out = run(&mut voc, &vec![0.0; 2048], &sine(220.0, 1.0, 2048));
        assert!(out.iter().all(|y| *y == 0.0));
    }

    #[test]
    fn test_self_vocoding_approximates_input() {
        let settings = plain_settings().with_q(8.0);
        let mut voc = Vocoder::new(settings).unwrap();
        let freq = voc.plan().channels()[5].frequency;
        let x = sine(freq, 0.1, 44100);
        let y = run(&mut voc, &x, &x);

        let (x, y) = (&x[22050..], &y[22050..]);
        let dot: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        let xx: f64 = x.iter().map(|a| a * a).sum();
        let yy: f64 = y.iter().map(|b| b * b).sum();
        let correlation = dot / (xx.sqrt() * yy.sqrt());
        assert!(correlation > 0.9, "correlation {}", correlation);

        let gain = (yy / xx).sqrt();
        assert!(gain.is_finite() && gain > 1e-3 && gain < 1e4, "gain {}", gain);
    }

    #[test]
    fn test_output_follows_modulator_level() {
        let mut quiet = Vocoder::new(plain_settings()).unwrap();
        let mut loud = Vocoder::new(plain_settings()).unwrap();
        let carrier = sine(330.0, 0.5, 22050);
        let yq = run(&mut quiet, &sine(330.0, 0.05, 22050), &carrier);
        let yl = run(&mut loud, &sine(330.0, 0.5, 22050), &carrier);
        let energy = |ys: &[f64]| ys[11025..].iter().map(|y| y * y).sum::<f64>();
        assert!(energy(&yl[..]) > 50.0 * energy(&yq[..]));
    }

    #[test]
    fn test_voiced_unvoiced_detection() {
        let mut voc = Vocoder::new(VocoderSettings::default()).unwrap();
        let carrier = sine(110.0, 0.5, 8820);

        run(&mut voc, &sine(150.0, 0.5, 8820), &carrier);
        assert!(voc.last_voiced());

        run(&mut voc, &sine(9000.0, 0.5, 8820), &carrier);
        assert!(!voc.last_voiced());
    }

    #[test]
    fn test_unvoiced_passages_add_noise() {
        let hiss = sine(9000.0, 0.5, 8820);
        let mut with_noise = Vocoder::new(VocoderSettings::default()).unwrap();
        let mut without = Vocoder::new(VocoderSettings::new().with_voiced_unvoiced(false)).unwrap();
        // Silent carrier: anything coming out of `with_noise` is injected noise
        let carrier = vec![0.0; hiss.len()];
        let a = run(&mut with_noise, &hiss, &carrier);
        let b = run(&mut without, &hiss, &carrier);
        assert!(a.iter().any(|y| *y != 0.0));
        assert!(b.iter().all(|y| *y == 0.0));
    }

    #[test]
    fn test_voiced_passages_add_no_noise() {
        let vowel = sine(150.0, 0.5, 44100);
        let mut voc = Vocoder::new(VocoderSettings::default()).unwrap();

        // The onset may briefly classify as unvoiced; give its ringing time to die out
        let settle = 33075;
        let mut tail_peak: f64 = 0.0;
        for (i, x) in vowel.iter().enumerate() {
            let y = voc.tick(*x, 0.0);
            if i >= settle {
                assert!(voc.last_voiced(), "sample {} classified unvoiced", i);
                tail_peak = tail_peak.max(y.abs());
            }
        }
        assert!(tail_peak < 1e-12, "noise leaked into voiced output: {}", tail_peak);
    }

    #[test]
    fn test_deterministic_and_independent() {
        let m = sine(500.0, 0.3, 4096);
        let c = sine(9000.0, 0.3, 4096);

        let mut a = Vocoder::new(VocoderSettings::default()).unwrap();
        let mut b = Vocoder::new(VocoderSettings::default()).unwrap();
        let other_settings = VocoderSettings::new().with_noise(0.5, DEFAULT_NOISE_SEED + 1);
        let mut other = Vocoder::new(other_settings).unwrap();

        let ya = run(&mut a, &m, &c);
        // interleave b with an unrelated instance
        let yb: Vec<f64> = m
            .iter()
            .zip(&c)
            .map(|(&mi, &ci)| {
                other.tick(ci, mi);
                b.tick(mi, ci)
            })
            .collect();
        assert_eq!(ya, yb);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let m = sine(700.0, 0.3, 2048);
        let c = sine(9000.0, 0.3, 2048);
        let mut voc = Vocoder::new(VocoderSettings::default()).unwrap();
        let first = run(&mut voc, &m, &c);
        let continued = run(&mut voc, &m, &c);
        assert_ne!(first, continued);

        voc.reset();
        assert_eq!(run(&mut voc, &m, &c), first);
    }

    #[test]
    fn test_channel_envelopes_exposed() {
        let mut voc = Vocoder::new(plain_settings()).unwrap();
        run(&mut voc, &sine(1000.0, 0.5, 4410), &sine(100.0, 0.5, 4410));
        let envs = voc.channel_envelopes();
        assert_eq!(envs.len(), 14);
        assert!(envs.iter().all(|e| *e >= 0.0));
        assert!(envs.iter().any(|e| *e > 0.0));
    }

    #[test]
    fn test_many_channels() {
        let settings = VocoderSettings::new()
            .with_channels(100)
            .with_frequency_range(40.0, 16000.0);
        let mut voc = Vocoder::new(settings).unwrap();
        let y = run(&mut voc, &sine(440.0, 0.3, 4096), &sine(440.0, 0.3, 4096));
        assert!(y.iter().all(|v| v.is_finite()));
        assert!(y.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_module_impl_matches_inherent() {
        let mut a = Vocoder::new(VocoderSettings::default()).unwrap();
        let mut b = Vocoder::new(VocoderSettings::default()).unwrap();
        let m = sine(300.0, 0.4, 512);
        let c = sine(220.0, 0.4, 512);
        let pairs: Vec<(f64, f64)> = m.iter().copied().zip(c.iter().copied()).collect();
        let mut via_module = vec![0.0; pairs.len()];
        Module::process(&mut a, &pairs, &mut via_module);
        assert_eq!(via_module, run(&mut b, &m, &c));
    }

    #[test]
    fn test_stereo_channels_are_independent() {
        let mut stereo = StereoVocoder::new(VocoderSettings::default()).unwrap();
        let mut mono = Vocoder::new(VocoderSettings::default()).unwrap();
        let left = sine(200.0, 0.4, 2048);
        let right = vec![0.0; 2048];
        let carrier = sine(110.0, 0.4, 2048);

        for i in 0..2048 {
            let (l, r) = stereo.tick((left[i], right[i]), carrier[i]);
            assert_eq!(l, mono.tick(left[i], carrier[i]));
            assert_eq!(r, 0.0);
        }
        assert_eq!(stereo.left().plan(), stereo.right().plan());
    }
}
