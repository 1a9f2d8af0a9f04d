use crate::core::error::DspError;
use crate::core::frame_processor::{FrameProcessor, ProcessorKind};
use wide::f32x4;

/// A linear volume stage.
///
/// Multiplies every input sample by a single amplitude. Negative amplitudes
/// invert phase and zero mutes. No smoothing is applied between blocks.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    amplitude: f32,
}

impl Volume {
    /// Creates a new Volume processor.
    ///
    /// # Arguments
    /// * `amplitude` - The gain factor (linear).
    pub fn new(amplitude: f32) -> Self {
        Volume { amplitude }
    }

    /// Creates a new Volume processor from a decibel value.
    pub fn from_db(db: f32) -> Self {
        Volume {
            amplitude: libm::powf(10.0, db / 20.0),
        }
    }

    /// Sets the amplitude used by all following blocks.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Scales `buffer` in place.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        let gain_vec = f32x4::splat(self.amplitude);
        let (chunks, remainder) = buffer.as_chunks_mut::<4>();

        for chunk in chunks {
            let vec = f32x4::from(*chunk);
            *chunk = (vec * gain_vec).to_array();
        }

        for sample in remainder {
            *sample *= self.amplitude;
        }
    }
}

impl FrameProcessor for Volume {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Volume
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize) -> Result<(), DspError> {
        DspError::check_blocks(input, output, num_samples)?;

        let gain_vec = f32x4::splat(self.amplitude);
        let (in_chunks, in_rem) = input[..num_samples].as_chunks::<4>();
        let (out_chunks, out_rem) = output[..num_samples].as_chunks_mut::<4>();

        for (out_c, in_c) in out_chunks.iter_mut().zip(in_chunks.iter()) {
            let in_v = f32x4::from(*in_c);
            *out_c = (in_v * gain_vec).to_array();
        }

        for (out_s, in_s) in out_rem.iter_mut().zip(in_rem.iter()) {
            *out_s = self.amplitude * *in_s;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_amplitude() {
        let mut volume = Volume::new(0.5);
        volume.init();
        let input = [1.0, 1.0, 1.0, 1.0];
        let mut output = [0.0; 4];

        volume.process(&input, &mut output, 4).unwrap();

        assert_eq!(output, [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_linearity_over_odd_length() {
        let input = [0.25, -1.5, 3.0, 0.0, -0.125, 7.0, 1e-3];
        for amplitude in [0.0f32, 1.0, -1.0, 0.3, 12.5, -0.75] {
            let mut volume = Volume::new(amplitude);
            let mut output = [f32::NAN; 7];
            volume.process(&input, &mut output, input.len()).unwrap();

            for (y, x) in output.iter().zip(input.iter()) {
                assert_eq!(*y, amplitude * *x);
            }
        }
    }

    #[test]
    fn test_repeated_set_amplitude_is_idempotent() {
        let input = [0.1, 0.2, -0.3, 0.4, 0.5];
        let mut once = Volume::default();
        once.set_amplitude(0.8);
        let mut twice = Volume::default();
        twice.set_amplitude(0.8);
        twice.set_amplitude(0.8);

        let mut out_once = [0.0; 5];
        let mut out_twice = [0.0; 5];
        once.process(&input, &mut out_once, 5).unwrap();
        twice.process(&input, &mut out_twice, 5).unwrap();

        assert_eq!(out_once, out_twice);
    }

    #[test]
    fn test_partial_block_leaves_tail_untouched() {
        let mut volume = Volume::new(2.0);
        let input = [1.0; 6];
        let mut output = [9.0; 6];

        volume.process(&input, &mut output, 5).unwrap();

        assert_eq!(output, [2.0, 2.0, 2.0, 2.0, 2.0, 9.0]);
    }

    #[test]
    fn test_short_input_is_rejected() {
        let mut volume = Volume::new(1.0);
        let mut output = [0.0; 8];
        let err = volume.process(&[1.0; 4], &mut output, 8);
        assert!(err.is_err());
        assert_eq!(output, [0.0; 8]);
    }

    #[test]
    fn test_db_constructor_and_in_place() {
        let mut volume = Volume::from_db(-6.0);
        assert!((volume.amplitude() - 0.501187).abs() < 0.001);

        let mut buffer = [1.0, -1.0, 0.0, 0.5, 2.0];
        volume.set_amplitude(-1.0);
        volume.process_in_place(&mut buffer);
        assert_eq!(buffer, [-1.0, 1.0, -0.0, -0.5, -2.0]);
    }
}
