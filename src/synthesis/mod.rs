pub mod advanced_noise;
pub mod noise;
pub mod noise_modulator;
