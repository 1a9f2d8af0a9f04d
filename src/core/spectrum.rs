use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::PI;
use num_complex::Complex32;

/// Frame length used by [`PowerSpectrum::analyze`].
pub const FFT_SIZE: usize = 1024;

/// Averaged power spectrum of a mono signal.
///
/// The signal is cut into non-overlapping Hann-windowed frames of [`FFT_SIZE`]
/// samples (the last partial frame is zero padded) and the squared magnitudes
/// are averaged across frames.
pub struct PowerSpectrum {
    bins: Vec<f32>,
    sample_rate: f32,
    frames: usize,
}

impl PowerSpectrum {
    /// Measures `signal` sampled at `sample_rate`.
    pub fn analyze(signal: &[f32], sample_rate: f32) -> Self {
        let mut window = [0.0f32; FFT_SIZE];
        for (i, w) in window.iter_mut().enumerate() {
            let arg = 2.0 * PI * i as f32 / (FFT_SIZE - 1) as f32;
            *w = 0.5 * (1.0 - libm::cosf(arg));
        }

        let mut bins = vec![0.0f32; FFT_SIZE / 2];
        let mut fft_buffer = [Complex32::new(0.0, 0.0); FFT_SIZE];
        let mut frames = 0;

        for frame in signal.chunks(FFT_SIZE) {
            for (i, slot) in fft_buffer.iter_mut().enumerate() {
                let sample = frame.get(i).copied().unwrap_or(0.0);
                *slot = Complex32::new(sample * window[i], 0.0);
            }

            let _ = microfft::complex::cfft_1024(&mut fft_buffer);

            for (bin, value) in bins.iter_mut().zip(fft_buffer.iter()) {
                *bin += value.norm_sqr();
            }
            frames += 1;
        }

        if frames > 0 {
            let scale = 1.0 / frames as f32;
            for bin in bins.iter_mut() {
                *bin *= scale;
            }
        }

        PowerSpectrum {
            bins,
            sample_rate,
            frames,
        }
    }

    /// Number of frames averaged into the estimate.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Raw averaged power per bin, DC first.
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / FFT_SIZE as f32
    }

    /// Mean power of the bins whose centre lies in `[low_hz, high_hz)`.
    ///
    /// Returns 0 when no bin falls inside the band.
    pub fn band_power(&self, low_hz: f32, high_hz: f32) -> f32 {
        let mut sum = 0.0;
        let mut count = 0;
        for (i, power) in self.bins.iter().enumerate() {
            let freq = self.bin_frequency(i);
            if freq >= low_hz && freq < high_hz {
                sum += *power;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// [`band_power`](Self::band_power) in decibels.
    pub fn band_power_db(&self, low_hz: f32, high_hz: f32) -> f32 {
        10.0 * libm::log10f(self.band_power(low_hz, high_hz).max(1e-20))
    }
}
