use crate::core::frame_processor::NoiseSource;
use crate::core::parameter::{Parameter, SeedParameter};
use crate::synthesis::noise::{NoiseColor, NoiseGenerator, GREEN_CENTER_HZ, UNSEEDED};
use crate::synthesis::noise_modulator::{NoiseModulator, NoiseParameterPack, ShapingCoefficients};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static configuration of a noise node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    /// Start seed, [`UNSEEDED`] for the default stream.
    pub seed: i32,
    pub color: NoiseColor,
    /// Centre frequency in Hz.
    pub frequency: f32,
    /// Band-pass quality, green noise only. 0 passes everything, 0.707 is standard green.
    pub bandwidth: f32,
    /// Output gain in dB.
    pub gain: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        NoiseSettings {
            seed: UNSEEDED,
            color: NoiseColor::default(),
            frequency: GREEN_CENTER_HZ,
            bandwidth: 0.0,
            gain: 0.0,
        }
    }
}

/// Live inputs of a noise node.
///
/// Cloning hands out another reference to the same values, so a control
/// thread may write while the node reads them once per block.
#[derive(Debug, Clone)]
pub struct NoiseInputs {
    pub seed: SeedParameter,
    pub frequency: Parameter,
    pub bandwidth: Parameter,
    pub gain: Parameter,
}

impl NoiseInputs {
    pub fn from_settings(settings: &NoiseSettings) -> Self {
        NoiseInputs {
            seed: SeedParameter::new(settings.seed),
            frequency: Parameter::new(settings.frequency),
            bandwidth: Parameter::new(settings.bandwidth),
            gain: Parameter::new(settings.gain),
        }
    }
}

impl Default for NoiseInputs {
    fn default() -> Self {
        NoiseInputs::from_settings(&NoiseSettings::default())
    }
}

/// A noise generator node driven by a host once per block.
///
/// The colour is fixed at construction. Before each block the bound seed is
/// compared to the seed the engine was built with; a change rebuilds the
/// engine. Control values pass through a [`NoiseModulator`] so edits are
/// spread over several blocks.
pub struct AdvancedNoise {
    color: NoiseColor,
    inputs: NoiseInputs,
    generator: NoiseGenerator,
    modulator: NoiseModulator,
    old_seed: i32,
}

impl AdvancedNoise {
    /// Creates a new noise node.
    ///
    /// # Arguments
    /// * `color` - Noise colour, fixed for the node's lifetime.
    /// * `inputs` - Bound input values.
    /// * `sample_rate` - Sample rate in Hz.
    pub fn new(color: NoiseColor, inputs: NoiseInputs, sample_rate: f32) -> Self {
        let seed = inputs.seed.get();
        let pack = NoiseParameterPack {
            frequency: inputs.frequency.get(),
            gain: inputs.gain.get(),
            bandwidth: inputs.bandwidth.get(),
            ..NoiseParameterPack::default()
        };

        AdvancedNoise {
            color,
            generator: NoiseGenerator::new(color, seed),
            modulator: NoiseModulator::new(sample_rate, pack, color),
            inputs,
            old_seed: seed,
        }
    }

    pub fn from_settings(settings: &NoiseSettings, sample_rate: f32) -> Self {
        Self::new(settings.color, NoiseInputs::from_settings(settings), sample_rate)
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    /// Handles to the bound inputs.
    pub fn inputs(&self) -> &NoiseInputs {
        &self.inputs
    }

    pub fn modulator(&self) -> &NoiseModulator {
        &self.modulator
    }

    /// Seed the current engine was built with.
    pub fn active_seed(&self) -> i32 {
        self.old_seed
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.modulator.set_sample_rate(sample_rate);
    }

    fn reseed(&mut self, seed: i32) {
        self.generator = NoiseGenerator::new(self.color, seed);
        self.old_seed = seed;
    }

    fn check_and_reseed(&mut self) {
        let seed = self.inputs.seed.get();
        if seed != self.old_seed {
            log::debug!("{:?} noise reseeded: {} -> {}", self.color, self.old_seed, seed);
            self.reseed(seed);
        }
    }

    fn read_inputs(&mut self) {
        self.modulator.set_frequency(self.inputs.frequency.get());
        self.modulator.set_bandwidth(self.inputs.bandwidth.get());
        self.modulator.set_gain(self.inputs.gain.get());
    }
}

impl NoiseSource for AdvancedNoise {
    fn init(&mut self) {
        self.modulator.init();
    }

    fn reset(&mut self, output: &mut [f32]) {
        let seed = self.inputs.seed.get();
        self.reseed(seed);
        output.fill(0.0);
    }

    fn generate(&mut self, output: &mut [f32]) {
        self.read_inputs();
        self.modulator.update();
        self.check_and_reseed();

        let ShapingCoefficients {
            gain,
            scale,
            offset,
            band,
        } = self.modulator.coefficients();
        self.generator.set_band(band);

        let level = gain * scale;
        for sample in output.iter_mut() {
            *sample = self.generator.generate() * level + offset;
        }
    }
}
