use crate::core::error::{CoefficientError, DspError};
use crate::core::frame_processor::{FrameProcessor, ProcessorKind};
use core::f32::consts::PI;

const OUTPUT_MAX: f32 = 32767.0;
const OUTPUT_MIN: f32 = -32768.0;

/// Active coefficient set of a [`NotchFilter`].
///
/// `b0`, `b1`, `b2` weight the current and two previous inputs, `a1` and `a2`
/// weight the two previous outputs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NotchCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl NotchCoefficients {
    /// Derives the coefficients for a notch at `cutoff_frequency`.
    ///
    /// # Errors
    /// Rejects negative frequencies, a cutoff above Nyquist and a bandwidth
    /// coefficient outside `(0, 1)`.
    pub fn derive(
        sampling_frequency: f32,
        cutoff_frequency: f32,
        bandwidth_coefficient: f32,
    ) -> Result<Self, CoefficientError> {
        if sampling_frequency < 0.0 || cutoff_frequency < 0.0 {
            return Err(CoefficientError::NegativeFrequency {
                sampling_frequency,
                cutoff_frequency,
            });
        }
        let nyquist = sampling_frequency / 2.0;
        if cutoff_frequency > nyquist {
            return Err(CoefficientError::AboveNyquist {
                cutoff_frequency,
                nyquist,
            });
        }
        // NaN fails both comparisons, so test for membership instead of exclusion.
        if !(bandwidth_coefficient > 0.0 && bandwidth_coefficient < 1.0) {
            return Err(CoefficientError::BandwidthOutOfRange(bandwidth_coefficient));
        }

        let bw = bandwidth_coefficient;
        let z = libm::cosf(2.0 * PI * cutoff_frequency / sampling_frequency);
        let b = (1.0 - bw) * (1.0 - bw) / (2.0 * (libm::fabsf(z) + 1.0)) + bw;

        Ok(NotchCoefficients {
            b0: b,
            b1: -2.0 * z * b,
            b2: b,
            a1: -2.0 * z * bw,
            a2: bw * bw,
        })
    }
}

/// A second-order IIR notch filter.
///
/// Attenuates a narrow band around the cutoff frequency. The bandwidth
/// coefficient sets the pole radius: values close to 1 give a narrow notch.
/// Output is saturated to the signed 16-bit range.
///
/// Every setter stores its value and recomputes the coefficients. An invalid
/// combination is rejected and the previous coefficients stay active; an
/// accepted one clears the sample history.
#[derive(Debug, Clone, Default)]
pub struct NotchFilter {
    sampling_frequency: f32,
    cutoff_frequency: f32,
    bandwidth_coefficient: f32,

    coefficients: NotchCoefficients,

    x: f32,
    x1: f32,
    x2: f32,
    y: f32,
    y1: f32,
    y2: f32,
}

impl NotchFilter {
    /// Creates a new NotchFilter.
    ///
    /// # Arguments
    /// * `sampling_frequency` - Sample rate in Hz.
    /// * `cutoff_frequency` - Centre of the notch in Hz.
    /// * `bandwidth_coefficient` - Notch width control in `(0, 1)`.
    pub fn new(sampling_frequency: f32, cutoff_frequency: f32, bandwidth_coefficient: f32) -> Self {
        let mut filter = NotchFilter {
            sampling_frequency,
            cutoff_frequency,
            bandwidth_coefficient,
            ..Default::default()
        };
        let _ = filter.set_coefficients();
        filter
    }

    pub fn set_sampling_frequency(&mut self, sampling_frequency: f32) -> Result<(), CoefficientError> {
        self.sampling_frequency = sampling_frequency;
        self.set_coefficients()
    }

    pub fn set_cutoff_frequency(&mut self, cutoff_frequency: f32) -> Result<(), CoefficientError> {
        self.cutoff_frequency = cutoff_frequency;
        self.set_coefficients()
    }

    pub fn set_bandwidth_coefficient(&mut self, bandwidth_coefficient: f32) -> Result<(), CoefficientError> {
        self.bandwidth_coefficient = bandwidth_coefficient;
        self.set_coefficients()
    }

    /// Sets all three parameters and recomputes once.
    pub fn set_values(
        &mut self,
        sampling_frequency: f32,
        cutoff_frequency: f32,
        bandwidth_coefficient: f32,
    ) -> Result<(), CoefficientError> {
        self.sampling_frequency = sampling_frequency;
        self.cutoff_frequency = cutoff_frequency;
        self.bandwidth_coefficient = bandwidth_coefficient;
        self.set_coefficients()
    }

    pub fn sampling_frequency(&self) -> f32 {
        self.sampling_frequency
    }

    pub fn cutoff_frequency(&self) -> f32 {
        self.cutoff_frequency
    }

    pub fn bandwidth_coefficient(&self) -> f32 {
        self.bandwidth_coefficient
    }

    /// Returns the coefficients currently used by `process`.
    pub fn coefficients(&self) -> NotchCoefficients {
        self.coefficients
    }

    fn set_coefficients(&mut self) -> Result<(), CoefficientError> {
        match NotchCoefficients::derive(
            self.sampling_frequency,
            self.cutoff_frequency,
            self.bandwidth_coefficient,
        ) {
            Ok(coefficients) => {
                self.coefficients = coefficients;
                self.clear_history();
                Ok(())
            }
            Err(err) => {
                log::debug!("notch filter keeps previous coefficients: {}", err);
                Err(err)
            }
        }
    }

    fn clear_history(&mut self) {
        self.x = 0.0;
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let c = self.coefficients;

        self.x2 = self.x1;
        self.x1 = self.x;
        self.x = input;

        self.y = c.b0 * self.x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.y2 = self.y1;
        self.y1 = self.y;

        // Saturate the written sample only; the recursion keeps the raw value.
        self.y.clamp(OUTPUT_MIN, OUTPUT_MAX)
    }
}

impl FrameProcessor for NotchFilter {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::NotchFilter
    }

    fn init(&mut self) {
        let _ = self.set_coefficients();
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize) -> Result<(), DspError> {
        DspError::check_blocks(input, output, num_samples)?;

        for (out, &sample) in output[..num_samples].iter_mut().zip(input[..num_samples].iter()) {
            *out = self.tick(sample);
        }
        Ok(())
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let _ = self.set_sampling_frequency(sample_rate);
    }

    fn reset(&mut self) {
        self.clear_history();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spectrum::PowerSpectrum;
    use alloc::vec;
    use alloc::vec::Vec;

    fn impulse(len: usize) -> Vec<f32> {
        let mut block = vec![0.0; len];
        block[0] = 1.0;
        block
    }

    fn expected_b(fs: f32, fc: f32, bw: f32) -> f32 {
        let z = libm::cosf(2.0 * PI * fc / fs);
        (1.0 - bw) * (1.0 - bw) / (2.0 * (libm::fabsf(z) + 1.0)) + bw
    }

    #[test]
    fn test_impulse_response_starts_with_b() {
        let mut filter = NotchFilter::new(44100.0, 1000.0, 0.9);
        filter.init();
        let input = impulse(64);
        let mut output = vec![0.0; 64];

        filter.process(&input, &mut output, 64).unwrap();

        let b = expected_b(44100.0, 1000.0, 0.9);
        assert!((output[0] - b).abs() < 1e-6);
        assert!((output[1] - filter.coefficients().b1 + filter.coefficients().a1 * output[0]).abs() < 1e-6);
        assert!(output.iter().all(|y| (-32768.0..=32767.0).contains(y)));

        let sign_changes = output.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
        assert!(sign_changes >= 2, "expected an oscillating response");
        assert!(output[63].abs() < output[2].abs());
    }

    #[test]
    fn test_cutoff_above_nyquist_keeps_coefficients() {
        let input: Vec<f32> = (0..32).map(|i| libm::sinf(i as f32 * 0.3)).collect();

        let mut reference = NotchFilter::new(48000.0, 2000.0, 0.8);
        let mut expected = vec![0.0; 32];
        reference.process(&input, &mut expected, 32).unwrap();

        let mut filter = NotchFilter::new(48000.0, 2000.0, 0.8);
        let before = filter.coefficients();
        let result = filter.set_cutoff_frequency(30000.0);

        assert_eq!(
            result,
            Err(CoefficientError::AboveNyquist {
                cutoff_frequency: 30000.0,
                nyquist: 24000.0,
            })
        );
        assert_eq!(filter.coefficients(), before);
        assert_eq!(filter.cutoff_frequency(), 30000.0);

        let mut output = vec![0.0; 32];
        filter.process(&input, &mut output, 32).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_rejections() {
        let mut filter = NotchFilter::new(48000.0, 1000.0, 0.5);
        let active = filter.coefficients();

        assert!(matches!(
            filter.set_sampling_frequency(-1.0),
            Err(CoefficientError::NegativeFrequency { .. })
        ));
        assert!(filter.set_values(48000.0, -5.0, 0.5).is_err());
        assert_eq!(
            filter.set_values(48000.0, 1000.0, 0.0),
            Err(CoefficientError::BandwidthOutOfRange(0.0))
        );
        assert!(filter.set_bandwidth_coefficient(1.0).is_err());
        assert!(filter.set_bandwidth_coefficient(f32::NAN).is_err());
        assert_eq!(filter.coefficients(), active);

        assert_eq!(filter.set_bandwidth_coefficient(0.5), Ok(()));
    }

    #[test]
    fn test_stored_rejected_value_applies_after_later_change() {
        let mut filter = NotchFilter::new(20000.0, 1000.0, 0.5);
        assert!(filter.set_cutoff_frequency(15000.0).is_err());
        assert_eq!(filter.set_sampling_frequency(48000.0), Ok(()));
        assert_eq!(
            filter.coefficients(),
            NotchCoefficients::derive(48000.0, 15000.0, 0.5).unwrap()
        );
    }

    #[test]
    fn test_accepted_update_flushes_history() {
        let mut filter = NotchFilter::new(44100.0, 1000.0, 0.9);
        let noise: Vec<f32> = (0..50).map(|i| if i % 3 == 0 { 0.7 } else { -0.4 }).collect();
        let mut scratch = vec![0.0; 50];
        filter.process(&noise, &mut scratch, 50).unwrap();

        filter.set_cutoff_frequency(1500.0).unwrap();

        let mut fresh = NotchFilter::new(44100.0, 1500.0, 0.9);
        let input = impulse(8);
        let mut after_update = vec![0.0; 8];
        let mut from_fresh = vec![0.0; 8];
        filter.process(&input, &mut after_update, 8).unwrap();
        fresh.process(&input, &mut from_fresh, 8).unwrap();

        assert_eq!(after_update, from_fresh);
        assert!((after_update[0] - fresh.coefficients().b0).abs() < 1e-7);
    }

    #[test]
    fn test_large_impulse_saturates() {
        let mut filter = NotchFilter::new(44100.0, 1000.0, 0.9);
        let mut input = vec![0.0; 16];
        input[0] = 1.0e7;
        input[1] = -1.0e7;
        let mut output = vec![0.0; 16];

        filter.process(&input, &mut output, 16).unwrap();

        assert_eq!(output[0], 32767.0);
        assert_eq!(output[1], -32768.0);
        assert!(output.iter().all(|y| (-32768.0..=32767.0).contains(y)));
    }

    #[test]
    fn test_default_filter_is_silent_until_configured() {
        let mut filter = NotchFilter::default();
        filter.init();
        let input = [1.0, 0.5, -0.5];
        let mut output = [9.0; 3];
        filter.process(&input, &mut output, 3).unwrap();
        assert_eq!(output, [0.0; 3]);
        assert_eq!(filter.kind(), ProcessorKind::NotchFilter);
    }

    #[test]
    fn test_attenuates_cutoff_band() {
        let fs = 48000.0;
        let fc = 4000.0;
        let mut filter = NotchFilter::new(fs, fc, 0.95);

        let mut seed = 0x1234_5678u32;
        let input: Vec<f32> = (0..16384)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        let mut output = vec![0.0; input.len()];
        filter.process(&input, &mut output, input.len()).unwrap();

        let spectrum = PowerSpectrum::analyze(&output, fs);
        let notch_db = spectrum.band_power_db(fc - 100.0, fc + 100.0);
        let pass_db = spectrum.band_power_db(10000.0, 14000.0);
        assert!(pass_db - notch_db > 10.0, "notch={} pass={}", notch_db, pass_db);
    }
}
