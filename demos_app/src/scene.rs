use bachelordsp_core::core::dsp_chain::DspChain;
use bachelordsp_core::core::frame_processor::NoiseSource;
use bachelordsp_core::effects::filter::notch::NotchFilter;
use bachelordsp_core::effects::utility::volume::Volume;
use bachelordsp_core::synthesis::advanced_noise::{AdvancedNoise, NoiseInputs, NoiseSettings};

/// Something the audio backend can pull mono blocks from.
pub trait BlockSource: Send {
    fn fill(&mut self, block: &mut [f32]);

    /// Called when the stream restarts.
    fn restart(&mut self, block: &mut [f32]) {
        block.fill(0.0);
    }
}

/// Settings of the effect chain behind the noise node.
#[derive(Debug, Clone, Copy)]
pub struct ChainSettings {
    pub amplitude: f32,
    pub notch_hz: f32,
    pub notch_bandwidth: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        ChainSettings {
            amplitude: 0.5,
            notch_hz: 1000.0,
            notch_bandwidth: 0.9,
        }
    }
}

/// Noise node feeding a volume stage and a notch.
pub struct NoiseScene {
    noise: AdvancedNoise,
    chain: DspChain,
    noise_block: Vec<f32>,
}

impl NoiseScene {
    pub fn new(noise: &NoiseSettings, chain: &ChainSettings, sample_rate: f32) -> Self {
        let mut noise = AdvancedNoise::from_settings(noise, sample_rate);
        noise.init();

        let chain = DspChain::new(Volume::new(chain.amplitude), sample_rate).and(NotchFilter::new(
            sample_rate,
            chain.notch_hz,
            chain.notch_bandwidth,
        ));

        NoiseScene {
            noise,
            chain,
            noise_block: Vec::new(),
        }
    }

    /// Shared handles for steering the noise node from another thread.
    pub fn inputs(&self) -> NoiseInputs {
        self.noise.inputs().clone()
    }

    pub fn graph(&self) -> String {
        format!("{:?} noise\n  |\n  v\n{}", self.noise.color(), self.chain.get_graph())
    }
}

impl BlockSource for NoiseScene {
    fn fill(&mut self, block: &mut [f32]) {
        let frames = block.len();
        if self.noise_block.len() < frames {
            self.noise_block.resize(frames, 0.0);
        }

        let noise_block = &mut self.noise_block[..frames];
        self.noise.generate(noise_block);

        if let Err(err) = self.chain.process(noise_block, block, frames) {
            tracing::error!("chain failed: {}", err);
            block.fill(0.0);
        }
    }

    fn restart(&mut self, block: &mut [f32]) {
        self.noise.reset(block);
        self.chain.reset();
    }
}
