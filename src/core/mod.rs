pub mod dsp_chain;
pub mod error;
pub mod frame_processor;
pub mod parameter;
pub mod spectrum;
