//! Lagged control values for the noise generators.
//!
//! Each colour keeps a four slot history (index 0 newest, 3 oldest) for the
//! parameters it actually uses. Setters write through immediately to the
//! parameter pack and the working value; the history only moves on
//! [`NoiseModulator::update`], which the host calls once per block.

use crate::synthesis::noise::{BandPass, NoiseColor};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of slots in every parameter history.
pub const HISTORY_LEN: usize = 4;

const FREQUENCY_REST: f32 = 2000.0;

/// External control values for one noise instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameterPack {
    /// Centre frequency in Hz.
    pub frequency: f32,
    /// Output gain in dB.
    pub gain: f32,
    /// Band-pass quality for green noise, 0 passes everything.
    pub bandwidth: f32,
    /// Additional level trim in dB for brown and green noise.
    pub scale: f32,
    /// DC offset added after shaping for brown and green noise.
    pub offset: f32,
}

impl Default for NoiseParameterPack {
    fn default() -> Self {
        NoiseParameterPack {
            frequency: FREQUENCY_REST,
            gain: 0.0,
            bandwidth: 0.0,
            scale: 0.0,
            offset: 0.0,
        }
    }
}

/// Names one field of a [`NoiseParameterPack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseParameter {
    Frequency,
    Gain,
    Bandwidth,
    Scale,
    Offset,
}

/// Converts decibels to a linear factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    libm::powf(10.0, db / 20.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    current: f32,
    history: [f32; HISTORY_LEN],
}

impl Track {
    fn new(current: f32, rest: f32) -> Self {
        Track {
            current,
            history: [rest; HISTORY_LEN],
        }
    }

    fn clear(&mut self, rest: f32) {
        self.history = [rest; HISTORY_LEN];
    }

    fn shift(&mut self) {
        for i in (1..HISTORY_LEN).rev() {
            self.history[i] = self.history[i - 1];
        }
        self.history[0] = self.current;
    }

    fn smoothed(&self) -> f32 {
        self.history.iter().sum::<f32>() / HISTORY_LEN as f32
    }

    fn settled(&self) -> bool {
        self.history.iter().all(|&v| v == self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ToneTracks {
    frequency: Track,
    gain: Track,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ShapedTracks {
    tone: ToneTracks,
    scale: Track,
    offset: Track,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BandTracks {
    shaped: ShapedTracks,
    bandwidth: Track,
}

/// Per-colour history storage. Only the fields a colour uses exist.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Tracks {
    White(ToneTracks),
    Pink(ToneTracks),
    Brown(ShapedTracks),
    Green(BandTracks),
}

impl Tracks {
    fn new(color: NoiseColor, pack: &NoiseParameterPack) -> Self {
        let tone = ToneTracks {
            frequency: Track::new(pack.frequency, FREQUENCY_REST),
            gain: Track::new(pack.gain, 0.0),
        };
        let shaped = ShapedTracks {
            tone,
            scale: Track::new(pack.scale, 0.0),
            offset: Track::new(pack.offset, 0.0),
        };
        match color {
            NoiseColor::White => Tracks::White(tone),
            NoiseColor::Pink => Tracks::Pink(tone),
            NoiseColor::Brown => Tracks::Brown(shaped),
            NoiseColor::Green => Tracks::Green(BandTracks {
                shaped,
                bandwidth: Track::new(pack.bandwidth, 0.0),
            }),
        }
    }

    fn tone(&self) -> &ToneTracks {
        match self {
            Tracks::White(t) | Tracks::Pink(t) => t,
            Tracks::Brown(s) => &s.tone,
            Tracks::Green(b) => &b.shaped.tone,
        }
    }

    fn shaped(&self) -> Option<&ShapedTracks> {
        match self {
            Tracks::White(_) | Tracks::Pink(_) => None,
            Tracks::Brown(s) => Some(s),
            Tracks::Green(b) => Some(&b.shaped),
        }
    }

    fn track(&self, parameter: NoiseParameter) -> Option<&Track> {
        match parameter {
            NoiseParameter::Frequency => Some(&self.tone().frequency),
            NoiseParameter::Gain => Some(&self.tone().gain),
            NoiseParameter::Scale => self.shaped().map(|s| &s.scale),
            NoiseParameter::Offset => self.shaped().map(|s| &s.offset),
            NoiseParameter::Bandwidth => match self {
                Tracks::Green(b) => Some(&b.bandwidth),
                _ => None,
            },
        }
    }

    fn track_mut(&mut self, parameter: NoiseParameter) -> Option<&mut Track> {
        let (tone, shaped, bandwidth) = match self {
            Tracks::White(t) | Tracks::Pink(t) => (t, None, None),
            Tracks::Brown(s) => (&mut s.tone, Some((&mut s.scale, &mut s.offset)), None),
            Tracks::Green(b) => (
                &mut b.shaped.tone,
                Some((&mut b.shaped.scale, &mut b.shaped.offset)),
                Some(&mut b.bandwidth),
            ),
        };
        match parameter {
            NoiseParameter::Frequency => Some(&mut tone.frequency),
            NoiseParameter::Gain => Some(&mut tone.gain),
            NoiseParameter::Scale => shaped.map(|(scale, _)| scale),
            NoiseParameter::Offset => shaped.map(|(_, offset)| offset),
            NoiseParameter::Bandwidth => bandwidth,
        }
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(NoiseParameter, &mut Track)) {
        match self {
            Tracks::White(t) | Tracks::Pink(t) => {
                f(NoiseParameter::Frequency, &mut t.frequency);
                f(NoiseParameter::Gain, &mut t.gain);
            }
            Tracks::Brown(s) => {
                f(NoiseParameter::Frequency, &mut s.tone.frequency);
                f(NoiseParameter::Gain, &mut s.tone.gain);
                f(NoiseParameter::Scale, &mut s.scale);
                f(NoiseParameter::Offset, &mut s.offset);
            }
            Tracks::Green(b) => {
                f(NoiseParameter::Frequency, &mut b.shaped.tone.frequency);
                f(NoiseParameter::Gain, &mut b.shaped.tone.gain);
                f(NoiseParameter::Bandwidth, &mut b.bandwidth);
                f(NoiseParameter::Scale, &mut b.shaped.scale);
                f(NoiseParameter::Offset, &mut b.shaped.offset);
            }
        }
    }
}

/// Shaping values derived from the smoothed history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapingCoefficients {
    /// Linear output gain.
    pub gain: f32,
    /// Linear level trim, 1 for colours without a scale history.
    pub scale: f32,
    /// DC offset, 0 for colours without an offset history.
    pub offset: f32,
    /// Band-pass for green noise, `None` means all-pass.
    pub band: Option<BandPass>,
}

impl Default for ShapingCoefficients {
    fn default() -> Self {
        ShapingCoefficients {
            gain: 1.0,
            scale: 1.0,
            offset: 0.0,
            band: None,
        }
    }
}

/// Smooths the control values of one noise instance.
#[derive(Debug, Clone)]
pub struct NoiseModulator {
    sample_rate: f32,
    pack: NoiseParameterPack,
    color: NoiseColor,
    tracks: Tracks,
    coefficients: ShapingCoefficients,
}

impl NoiseModulator {
    /// Creates and initialises a modulator for `color`.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz, used for band design.
    /// * `pack` - Initial control values; they become the working values.
    /// * `color` - Selects which histories exist.
    pub fn new(sample_rate: f32, pack: NoiseParameterPack, color: NoiseColor) -> Self {
        let mut modulator = NoiseModulator {
            sample_rate,
            pack,
            color,
            tracks: Tracks::new(color, &pack),
            coefficients: ShapingCoefficients::default(),
        };
        modulator.init();
        modulator
    }

    /// Resets every history to its rest value and recomputes coefficients.
    ///
    /// Frequency rests at 2000 Hz, everything else at 0.
    pub fn init(&mut self) {
        self.tracks.for_each_mut(|parameter, track| {
            let rest = match parameter {
                NoiseParameter::Frequency => FREQUENCY_REST,
                _ => 0.0,
            };
            track.clear(rest);
        });
        self.set_coefficients();
    }

    /// Recomputes coefficients from the current history, then commits the
    /// working values into slot 0 and ages the rest by one slot.
    pub fn update(&mut self) {
        self.set_coefficients();
        self.tracks.for_each_mut(|_, track| track.shift());
        log::trace!(
            "noise modulator ({:?}) gain={} band={:?}",
            self.color,
            self.coefficients.gain,
            self.coefficients.band
        );
    }

    /// True once every history slot equals its working value.
    pub fn is_settled(&self) -> bool {
        let mut settled = true;
        for parameter in ALL_PARAMETERS {
            if let Some(track) = self.tracks.track(parameter) {
                settled &= track.settled();
            }
        }
        settled
    }

    fn set_coefficients(&mut self) {
        let tone = self.tracks.tone();
        let mut coefficients = ShapingCoefficients {
            gain: db_to_linear(tone.gain.smoothed()),
            ..ShapingCoefficients::default()
        };

        if let Some(shaped) = self.tracks.shaped() {
            coefficients.scale = db_to_linear(shaped.scale.smoothed());
            coefficients.offset = shaped.offset.smoothed();
        }

        if let Tracks::Green(b) = &self.tracks {
            coefficients.band = BandPass::new(
                self.sample_rate,
                b.shaped.tone.frequency.smoothed(),
                b.bandwidth.smoothed(),
            );
        }

        self.coefficients = coefficients;
    }

    fn write(&mut self, parameter: NoiseParameter, value: f32) {
        match parameter {
            NoiseParameter::Frequency => self.pack.frequency = value,
            NoiseParameter::Gain => self.pack.gain = value,
            NoiseParameter::Bandwidth => self.pack.bandwidth = value,
            NoiseParameter::Scale => self.pack.scale = value,
            NoiseParameter::Offset => self.pack.offset = value,
        }
        if let Some(track) = self.tracks.track_mut(parameter) {
            track.current = value;
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.write(NoiseParameter::Frequency, frequency);
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.write(NoiseParameter::Gain, gain);
    }

    /// Stored for every colour, smoothed only by green noise.
    pub fn set_bandwidth(&mut self, bandwidth: f32) {
        self.write(NoiseParameter::Bandwidth, bandwidth);
    }

    /// Stored for every colour, smoothed by brown and green noise.
    pub fn set_scale(&mut self, scale: f32) {
        self.write(NoiseParameter::Scale, scale);
    }

    /// Stored for every colour, smoothed by brown and green noise.
    pub fn set_offset(&mut self, offset: f32) {
        self.write(NoiseParameter::Offset, offset);
    }

    /// Replaces the whole pack and every working value.
    pub fn set_parameters(&mut self, pack: NoiseParameterPack) {
        self.set_frequency(pack.frequency);
        self.set_gain(pack.gain);
        self.set_bandwidth(pack.bandwidth);
        self.set_scale(pack.scale);
        self.set_offset(pack.offset);
    }

    pub fn parameters(&self) -> &NoiseParameterPack {
        &self.pack
    }

    pub fn frequency(&self) -> f32 {
        self.pack.frequency
    }

    pub fn gain(&self) -> f32 {
        self.pack.gain
    }

    pub fn bandwidth(&self) -> f32 {
        self.pack.bandwidth
    }

    pub fn scale(&self) -> f32 {
        self.pack.scale
    }

    pub fn offset(&self) -> f32 {
        self.pack.offset
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Takes effect on the next coefficient computation.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// History of `parameter`, or `None` when this colour does not track it.
    pub fn history(&self, parameter: NoiseParameter) -> Option<&[f32; HISTORY_LEN]> {
        self.tracks.track(parameter).map(|t| &t.history)
    }

    /// Mean of the history, or the pack value for untracked parameters.
    pub fn smoothed(&self, parameter: NoiseParameter) -> f32 {
        match self.tracks.track(parameter) {
            Some(track) => track.smoothed(),
            None => match parameter {
                NoiseParameter::Frequency => self.pack.frequency,
                NoiseParameter::Gain => self.pack.gain,
                NoiseParameter::Bandwidth => self.pack.bandwidth,
                NoiseParameter::Scale => self.pack.scale,
                NoiseParameter::Offset => self.pack.offset,
            },
        }
    }

    pub fn coefficients(&self) -> ShapingCoefficients {
        self.coefficients
    }
}

const ALL_PARAMETERS: [NoiseParameter; 5] = [
    NoiseParameter::Frequency,
    NoiseParameter::Gain,
    NoiseParameter::Bandwidth,
    NoiseParameter::Scale,
    NoiseParameter::Offset,
];
