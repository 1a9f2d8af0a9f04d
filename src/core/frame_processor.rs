use crate::core::error::DspError;
use alloc::boxed::Box;
#[cfg(feature = "debug_visualize")]
use alloc::format;
use alloc::string::String;

/// Identifies the concrete stage behind a [`FrameProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    /// Linear gain stage.
    Volume,
    /// Second-order IIR notch.
    NotchFilter,
}

/// The core trait for block transforms.
///
/// `init` must be called once before the first `process`. After that `process`
/// may be called on successive blocks sharing the same parameter state.
pub trait FrameProcessor {
    /// Returns the fixed kind tag of the processor.
    fn kind(&self) -> ProcessorKind;

    /// Establishes the initial internal state.
    fn init(&mut self) {}

    /// Processes `num_samples` samples from `input` into `output`.
    ///
    /// # Arguments
    /// * `input` - The read-only input block.
    /// * `output` - The block receiving the processed samples.
    /// * `num_samples` - Number of samples to process.
    ///
    /// # Errors
    /// Returns [`DspError::BufferTooShort`] when either block holds fewer than
    /// `num_samples` samples. Nothing is written in that case.
    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize) -> Result<(), DspError>;

    /// Sets the sample rate.
    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    /// Clears any sample history without touching parameters.
    fn reset(&mut self) {}

    /// Returns the name of the processor.
    fn name(&self) -> &str {
        #[cfg(feature = "debug_visualize")]
        {
            match self.kind() {
                ProcessorKind::Volume => "Volume",
                ProcessorKind::NotchFilter => "NotchFilter",
            }
        }
        #[cfg(not(feature = "debug_visualize"))]
        {
            ""
        }
    }

    /// Returns an ASCII visualization of the processor structure.
    fn visualize(&self, indent: usize) -> String {
        #[cfg(feature = "debug_visualize")]
        {
            let spaces = " ".repeat(indent);
            format!("{}{}\n", spaces, self.name())
        }
        #[cfg(not(feature = "debug_visualize"))]
        {
            let _ = indent;
            String::new()
        }
    }
}

impl<T: FrameProcessor + ?Sized> FrameProcessor for Box<T> {
    fn kind(&self) -> ProcessorKind {
        (**self).kind()
    }

    fn init(&mut self) {
        (**self).init();
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize) -> Result<(), DspError> {
        (**self).process(input, output, num_samples)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        (**self).set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn visualize(&self, indent: usize) -> String {
        (**self).visualize(indent)
    }
}

/// Host lifecycle for generators that produce audio without an input block.
pub trait NoiseSource {
    /// One-time setup before the first block.
    fn init(&mut self) {}

    /// Handles a transport restart: forces a fresh generator and zeroes `output`.
    fn reset(&mut self, output: &mut [f32]);

    /// Fills every sample of `output`.
    fn generate(&mut self, output: &mut [f32]);
}
