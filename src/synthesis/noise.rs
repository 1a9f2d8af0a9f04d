//! Seeded noise engines.
//!
//! Every colour draws its randomness from a [`Pcg32`] seeded from an `i32`.
//! Two engines built with the same colour and seed produce identical streams.

use core::f32::consts::PI;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seed value meaning "no seed bound": the engine uses its default stream.
pub const UNSEEDED: i32 = -1;

const DEFAULT_STREAM_SEED: u64 = 0x5eed_0f_c0ffee;

/// Default centre frequency of green noise in Hz.
pub const GREEN_CENTER_HZ: f32 = 2000.0;

/// Band-pass Q giving the canonical green noise band.
pub const GREEN_STANDARD_BANDWIDTH: f32 = 0.707;

const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

// Direct pink synthesis with an auto-correlated generator (musicdsp #244).
const PINK_COEFF_A: [i32; 5] = [14055, 12759, 10733, 12273, 15716];
const PINK_COEFF_SUM: [i16; 5] = [22347, 27917, 29523, 29942, 30007];

const BROWN_STEP: f32 = 0.02;
const BROWN_LEAK_DIVISOR: f32 = 1.0 + BROWN_STEP;
const BROWN_MAKEUP: f32 = 3.5;

/// The noise colour produced by a generator.
///
/// The discriminants follow the host's enum order, Pink first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseColor {
    /// Spectral density proportional to 1/f.
    #[default]
    Pink = 0,
    /// Equal intensity at all frequencies.
    White = 1,
    /// Integrated white noise, strong low-frequency emphasis.
    Brown = 2,
    /// Energy concentrated around an adjustable centre frequency.
    Green = 3,
}

impl NoiseColor {
    /// Maps a host enum index to a colour. Unknown indices fall back to Pink.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => NoiseColor::White,
            2 => NoiseColor::Brown,
            3 => NoiseColor::Green,
            _ => NoiseColor::Pink,
        }
    }
}

fn rng_for_seed(seed: i32) -> Pcg32 {
    if seed == UNSEEDED {
        Pcg32::seed_from_u64(DEFAULT_STREAM_SEED)
    } else {
        Pcg32::seed_from_u64(seed as u32 as u64)
    }
}

/// Uniform white noise in `[-1, 1)`.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    rng: Pcg32,
}

impl WhiteNoise {
    pub fn new(seed: i32) -> Self {
        WhiteNoise {
            rng: rng_for_seed(seed),
        }
    }

    #[inline]
    pub fn generate(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        WhiteNoise::new(UNSEEDED)
    }
}

/// Pink noise from five randomly refreshed, weighted white sources.
///
/// Each sample one stage (chosen with decreasing probability) draws a new
/// random value; the running sum of all stages approximates a 1/f spectrum.
#[derive(Debug, Clone)]
pub struct PinkNoise {
    rng: Pcg32,
    contrib: [i32; 5],
    accum: i32,
}

impl PinkNoise {
    pub fn new(seed: i32) -> Self {
        PinkNoise {
            rng: rng_for_seed(seed),
            contrib: [0; 5],
            accum: 0,
        }
    }

    #[inline]
    pub fn generate(&mut self) -> f32 {
        let randu = (self.rng.next_u32() & 0x7fff) as i16;
        let randv = self.rng.next_u32() as u16 as i16 as i32;

        if let Some(stage) = PINK_COEFF_SUM.iter().position(|&sum| randu < sum) {
            self.accum = self.accum.wrapping_sub(self.contrib[stage]);
            self.contrib[stage] = randv * PINK_COEFF_A[stage];
            self.accum = self.accum.wrapping_add(self.contrib[stage]);
        }

        self.accum as f32 * (1.0 / 2_147_483_648.0)
    }
}

impl Default for PinkNoise {
    fn default() -> Self {
        PinkNoise::new(UNSEEDED)
    }
}

/// Brown noise: white noise through a leaky integrator.
#[derive(Debug, Clone)]
pub struct BrownNoise {
    white: WhiteNoise,
    state: f32,
}

impl BrownNoise {
    pub fn new(seed: i32) -> Self {
        BrownNoise {
            white: WhiteNoise::new(seed),
            state: 0.0,
        }
    }

    #[inline]
    pub fn generate(&mut self) -> f32 {
        let w = self.white.generate();
        self.state = (self.state + BROWN_STEP * w) / BROWN_LEAK_DIVISOR;
        self.state * BROWN_MAKEUP
    }
}

impl Default for BrownNoise {
    fn default() -> Self {
        BrownNoise::new(UNSEEDED)
    }
}

/// Normalised constant-skirt band-pass biquad coefficients.
///
/// `b1` is always zero for this shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPass {
    pub b0: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BandPass {
    /// Designs a band-pass around `center_hz` with quality `q`.
    ///
    /// Returns `None` for `q <= 0` (all-pass) or a centre outside
    /// `(0, sample_rate / 2)`.
    pub fn new(sample_rate: f32, center_hz: f32, q: f32) -> Option<Self> {
        if !(q > 0.0) || !(center_hz > 0.0 && center_hz < sample_rate / 2.0) {
            return None;
        }

        let w0 = 2.0 * PI * center_hz / sample_rate;
        let alpha = libm::sinf(w0) / (2.0 * q);
        let inv_a0 = 1.0 / (1.0 + alpha);

        Some(BandPass {
            b0: alpha * inv_a0,
            b2: -alpha * inv_a0,
            a1: -2.0 * libm::cosf(w0) * inv_a0,
            a2: (1.0 - alpha) * inv_a0,
        })
    }
}

/// Green noise: white noise band-limited around a centre frequency.
///
/// Without a band the raw white stream passes through unchanged.
#[derive(Debug, Clone)]
pub struct GreenNoise {
    white: WhiteNoise,
    band: Option<BandPass>,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl GreenNoise {
    /// Creates green noise at the default centre and standard bandwidth.
    pub fn new(seed: i32) -> Self {
        GreenNoise {
            white: WhiteNoise::new(seed),
            band: BandPass::new(DEFAULT_SAMPLE_RATE, GREEN_CENTER_HZ, GREEN_STANDARD_BANDWIDTH),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the band. Filter memory is kept so the change is click free.
    pub fn set_band(&mut self, band: Option<BandPass>) {
        self.band = band;
    }

    pub fn band(&self) -> Option<BandPass> {
        self.band
    }

    #[inline]
    pub fn generate(&mut self) -> f32 {
        let x = self.white.generate();
        let Some(c) = self.band else {
            return x;
        };

        let y = c.b0 * x + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

impl Default for GreenNoise {
    fn default() -> Self {
        GreenNoise::new(UNSEEDED)
    }
}

/// One concrete noise engine, selected by colour.
#[derive(Debug, Clone)]
pub enum NoiseGenerator {
    White(WhiteNoise),
    Pink(PinkNoise),
    Brown(BrownNoise),
    Green(GreenNoise),
}

impl NoiseGenerator {
    /// Builds a fresh engine. [`UNSEEDED`] selects the default stream.
    pub fn new(color: NoiseColor, seed: i32) -> Self {
        match color {
            NoiseColor::White => NoiseGenerator::White(WhiteNoise::new(seed)),
            NoiseColor::Pink => NoiseGenerator::Pink(PinkNoise::new(seed)),
            NoiseColor::Brown => NoiseGenerator::Brown(BrownNoise::new(seed)),
            NoiseColor::Green => NoiseGenerator::Green(GreenNoise::new(seed)),
        }
    }

    pub fn color(&self) -> NoiseColor {
        match self {
            NoiseGenerator::White(_) => NoiseColor::White,
            NoiseGenerator::Pink(_) => NoiseColor::Pink,
            NoiseGenerator::Brown(_) => NoiseColor::Brown,
            NoiseGenerator::Green(_) => NoiseColor::Green,
        }
    }

    /// Produces one sample.
    #[inline]
    pub fn generate(&mut self) -> f32 {
        match self {
            NoiseGenerator::White(g) => g.generate(),
            NoiseGenerator::Pink(g) => g.generate(),
            NoiseGenerator::Brown(g) => g.generate(),
            NoiseGenerator::Green(g) => g.generate(),
        }
    }

    /// Writes one sample into every slot of `block`.
    pub fn fill(&mut self, block: &mut [f32]) {
        match self {
            NoiseGenerator::White(g) => block.iter_mut().for_each(|s| *s = g.generate()),
            NoiseGenerator::Pink(g) => block.iter_mut().for_each(|s| *s = g.generate()),
            NoiseGenerator::Brown(g) => block.iter_mut().for_each(|s| *s = g.generate()),
            NoiseGenerator::Green(g) => block.iter_mut().for_each(|s| *s = g.generate()),
        }
    }

    /// Applies a band to green noise. Other colours ignore it.
    pub fn set_band(&mut self, band: Option<BandPass>) {
        if let NoiseGenerator::Green(g) = self {
            g.set_band(band);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spectrum::PowerSpectrum;
    use alloc::vec;
    use alloc::vec::Vec;

    fn render(color: NoiseColor, seed: i32, len: usize) -> Vec<f32> {
        let mut generator = NoiseGenerator::new(color, seed);
        let mut block = vec![0.0; len];
        generator.fill(&mut block);
        block
    }

    #[test]
    fn test_same_seed_same_stream() {
        for color in [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown, NoiseColor::Green] {
            assert_eq!(render(color, 1234, 256), render(color, 1234, 256));
            assert_ne!(render(color, 1234, 256), render(color, 1235, 256));
        }
    }

    #[test]
    fn test_unseeded_matches_default_construction() {
        let mut a = WhiteNoise::default();
        let mut b = NoiseGenerator::new(NoiseColor::White, UNSEEDED);
        for _ in 0..64 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_white_is_bounded_and_centred() {
        let block = render(NoiseColor::White, 7, 48000);
        assert!(block.iter().all(|s| (-1.0..1.0).contains(s)));
        let mean = block.iter().sum::<f32>() / block.len() as f32;
        assert!(mean.abs() < 0.02, "mean={}", mean);
    }

    #[test]
    fn test_pink_is_bounded_and_tilted() {
        let block = render(NoiseColor::Pink, 99, 1 << 16);
        assert!(block.iter().all(|s| (-1.0..=1.0).contains(s)));

        let spectrum = PowerSpectrum::analyze(&block, 48000.0);
        let low = spectrum.band_power_db(200.0, 400.0);
        let high = spectrum.band_power_db(6400.0, 12800.0);
        // 1/f falls 3 dB per octave, five octaves here.
        assert!(low - high > 6.0, "low={} high={}", low, high);
    }

    #[test]
    fn test_brown_falls_faster_than_pink() {
        let brown = PowerSpectrum::analyze(&render(NoiseColor::Brown, 5, 1 << 16), 48000.0);
        let pink = PowerSpectrum::analyze(&render(NoiseColor::Pink, 5, 1 << 16), 48000.0);

        let brown_tilt = brown.band_power_db(1000.0, 2000.0) - brown.band_power_db(8000.0, 16000.0);
        let pink_tilt = pink.band_power_db(1000.0, 2000.0) - pink.band_power_db(8000.0, 16000.0);
        assert!(brown_tilt > pink_tilt + 6.0, "brown={} pink={}", brown_tilt, pink_tilt);
    }

    #[test]
    fn test_green_concentrates_around_center() {
        let block = render(NoiseColor::Green, 3, 1 << 15);
        let spectrum = PowerSpectrum::analyze(&block, 48000.0);

        let center = spectrum.band_power_db(1800.0, 2200.0);
        let far = spectrum.band_power_db(12000.0, 16000.0);
        assert!(center - far > 9.0, "center={} far={}", center, far);
    }

    #[test]
    fn test_green_without_band_is_white() {
        let mut green = GreenNoise::new(11);
        green.set_band(None);
        let mut white = WhiteNoise::new(11);
        for _ in 0..32 {
            assert_eq!(green.generate(), white.generate());
        }
    }

    #[test]
    fn test_band_pass_rejects_degenerate_settings() {
        assert!(BandPass::new(48000.0, 2000.0, 0.0).is_none());
        assert!(BandPass::new(48000.0, 30000.0, 0.707).is_none());
        assert!(BandPass::new(48000.0, 0.0, 0.707).is_none());
        assert!(BandPass::new(48000.0, 2000.0, f32::NAN).is_none());
        assert!(BandPass::new(48000.0, 2000.0, 0.707).is_some());
    }

    #[test]
    fn test_color_from_index() {
        assert_eq!(NoiseColor::from_index(0), NoiseColor::Pink);
        assert_eq!(NoiseColor::from_index(1), NoiseColor::White);
        assert_eq!(NoiseColor::from_index(2), NoiseColor::Brown);
        assert_eq!(NoiseColor::from_index(3), NoiseColor::Green);
        assert_eq!(NoiseColor::from_index(200), NoiseColor::Pink);
        assert_eq!(NoiseColor::default(), NoiseColor::Pink);
        assert_eq!(NoiseGenerator::new(NoiseColor::Brown, 1).color(), NoiseColor::Brown);
    }
}
