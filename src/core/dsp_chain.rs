use super::error::DspError;
use super::frame_processor::FrameProcessor;
use alloc::boxed::Box;
#[cfg(feature = "debug_visualize")]
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// A chain of block processors.
///
/// The first stage reads the caller's input block, every later stage reads the
/// previous stage's result. All stages are initialised when they join.
pub struct DspChain {
    processors: Vec<Box<dyn FrameProcessor + Send>>,
    sample_rate: f32,
    scratch: Vec<f32>,
}

impl DspChain {
    /// Creates a new DspChain starting with the given processor.
    pub fn new(mut first: impl FrameProcessor + Send + 'static, sample_rate: f32) -> Self {
        first.set_sample_rate(sample_rate);
        first.init();
        DspChain {
            processors: vec![Box::new(first)],
            sample_rate,
            scratch: Vec::new(),
        }
    }

    /// Appends a processor to the chain.
    pub fn and(mut self, mut processor: impl FrameProcessor + Send + 'static) -> Self {
        processor.set_sample_rate(self.sample_rate);
        processor.init();
        self.processors.push(Box::new(processor));
        self
    }

    /// Number of stages in the chain.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Always false, a chain holds at least its first stage.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Runs `num_samples` samples through every stage in order.
    pub fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize) -> Result<(), DspError> {
        DspError::check_blocks(input, output, num_samples)?;

        if self.scratch.len() < num_samples {
            self.scratch.resize(num_samples, 0.0);
        }

        let mut stages = self.processors.iter_mut();
        if let Some(first) = stages.next() {
            first.process(input, output, num_samples)?;
        }
        for stage in stages {
            let scratch = &mut self.scratch[..num_samples];
            scratch.copy_from_slice(&output[..num_samples]);
            stage.process(scratch, output, num_samples)?;
        }
        Ok(())
    }

    /// Updates the sample rate of every stage.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for p in &mut self.processors {
            p.set_sample_rate(sample_rate);
        }
    }

    /// Clears the sample history of every stage.
    pub fn reset(&mut self) {
        for p in &mut self.processors {
            p.reset();
        }
    }

    /// Returns a graph visualization of the entire chain.
    pub fn get_graph(&self) -> String {
        #[cfg(feature = "debug_visualize")]
        {
            let mut output = String::new();
            output.push_str("DspChain Start\n  |\n  v\n");
            for (i, p) in self.processors.iter().enumerate() {
                output.push_str(&p.visualize(0));
                if i < self.processors.len() - 1 {
                    output.push_str(&format!("{}|\n{}v\n", "  ", "  "));
                }
            }
            output.push_str("  |\n  v\nOutput\n");
            output
        }
        #[cfg(not(feature = "debug_visualize"))]
        {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::filter::notch::NotchFilter;
    use crate::effects::utility::volume::Volume;

    #[test]
    fn test_chain_applies_stages_in_order() {
        let mut chain = DspChain::new(Volume::new(0.5), 48000.0).and(Volume::new(-2.0));
        let input = [1.0, 2.0, -1.0, 0.0, 4.0];
        let mut output = [0.0; 5];

        chain.process(&input, &mut output, 5).unwrap();

        assert_eq!(output, [-1.0, -2.0, 1.0, 0.0, -4.0]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_propagates_sample_rate_to_notch() {
        let notch = NotchFilter::new(0.0, 1000.0, 0.9);
        let mut chain = DspChain::new(Volume::new(1.0), 44100.0).and(notch);

        let mut impulse = [0.0; 16];
        impulse[0] = 1.0;
        let mut output = [0.0; 16];
        chain.process(&impulse, &mut output, 16).unwrap();

        let reference = NotchFilter::new(44100.0, 1000.0, 0.9);
        assert!((output[0] - reference.coefficients().b0).abs() < 1e-6);
    }

    #[test]
    fn test_chain_rejects_short_output() {
        let mut chain = DspChain::new(Volume::new(1.0), 48000.0);
        let input = [1.0; 8];
        let mut output = [0.0; 4];

        assert!(chain.process(&input, &mut output, 8).is_err());
        assert_eq!(output, [0.0; 4]);
    }
}
