//! Vocode Tone Example
//!
//! Vocodes a pulse-wave chord (root plus a fifth) with a synthetic "voice":
//! a buzzy vowel that alternates with bursts of hiss. Prints the output level
//! and the voiced/unvoiced decision for each 100 ms slice.
//!
//! Run with: cargo run --example vocode_tone

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use vocoder::prelude::*;

const SAMPLE_RATE: f64 = 44100.0;
const FIFTH: f64 = 1.498_307_076_876_681_5; // 2^(7/12)

/// Pulse oscillator: high while the phase is below `width`
struct Pulse {
    phase: f64,
    increment: f64,
    width: f64,
}

impl Pulse {
    fn new(freq: f64, width: f64) -> Self {
        Self {
            phase: 0.0,
            increment: freq / SAMPLE_RATE,
            width,
        }
    }
}

impl Module for Pulse {
    type In = ();
    type Out = f64;

    fn tick(&mut self, _: ()) -> f64 {
        let out = if self.phase < self.width { 1.0 } else { 0.0 };
        self.phase = (self.phase + self.increment).fract();
        out
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

fn main() {
    let settings = VocoderSettings::default().with_sample_rate(SAMPLE_RATE);
    let mut voc = Vocoder::new(settings).unwrap();

    for spec in voc.plan().iter() {
        println!(
            "channel {:2}: {:?} fc={:7.1} Hz bandwidth={:6.1} Hz",
            spec.index,
            spec.filter_type,
            spec.frequency,
            spec.bandwidth()
        );
    }

    // carrier: root and fifth, averaged
    let root = 110.0;
    let mut carrier = Pulse::new(root, 0.05)
        .fanout(Pulse::new(root * FIFTH, 0.1))
        .map(|(a, b)| 0.5 * (a + b));

    let mut rng = StdRng::seed_from_u64(1);
    let slice = (SAMPLE_RATE * 0.1) as usize;

    for s in 0..20 {
        let hiss = s % 4 == 3;
        let mut energy = 0.0;
        let mut voiced = 0;

        for i in 0..slice {
            let t = (s * slice + i) as f64 / SAMPLE_RATE;
            let modulator = if hiss {
                0.3 * rng.gen_range(-1.0..1.0_f64)
            } else {
                // crude vowel: a few harmonics with a formant around 700 Hz
                (1..12)
                    .map(|h| {
                        let f = 140.0 * h as f64;
                        let formant = 1.0 / (1.0 + ((f - 700.0) / 300.0).powi(2));
                        0.1 * formant * (TAU * f * t).sin()
                    })
                    .sum::<f64>()
            };

            let y = voc.tick(modulator, carrier.tick(()));
            energy += y * y;
            if voc.last_voiced() {
                voiced += 1;
            }
        }

        println!(
            "{:4} ms  {:6}  rms={:.4}  voiced={:3}%",
            s * 100,
            if hiss { "hiss" } else { "vowel" },
            (energy / slice as f64).sqrt(),
            voiced * 100 / slice
        );
    }
}
