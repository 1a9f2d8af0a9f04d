use thiserror::Error;

/// Identifies which side of a block transform violated its length contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// The read-only input block.
    Input,
    /// The output block written by the processor.
    Output,
}

impl core::fmt::Display for BufferRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferRole::Input => f.write_str("input"),
            BufferRole::Output => f.write_str("output"),
        }
    }
}

/// Errors raised by block processing when the caller breaks the buffer contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DspError {
    /// A block holds fewer samples than the requested sample count.
    #[error("{buffer} block holds {actual} samples but {required} were requested")]
    BufferTooShort {
        buffer: BufferRole,
        required: usize,
        actual: usize,
    },
}

impl DspError {
    /// Checks that both blocks can hold `num_samples` samples.
    pub fn check_blocks(input: &[f32], output: &[f32], num_samples: usize) -> Result<(), DspError> {
        let short = if input.len() < num_samples {
            Some((BufferRole::Input, input.len()))
        } else if output.len() < num_samples {
            Some((BufferRole::Output, output.len()))
        } else {
            None
        };

        match short {
            Some((buffer, actual)) => {
                let err = DspError::BufferTooShort {
                    buffer,
                    required: num_samples,
                    actual,
                };
                log::warn!("block rejected: {}", err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// Reasons a notch filter parameter set is rejected.
///
/// A rejected update keeps the previously active coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoefficientError {
    #[error("sampling ({sampling_frequency} Hz) and cutoff ({cutoff_frequency} Hz) must not be negative")]
    NegativeFrequency {
        sampling_frequency: f32,
        cutoff_frequency: f32,
    },
    #[error("cutoff {cutoff_frequency} Hz lies above the Nyquist frequency {nyquist} Hz")]
    AboveNyquist { cutoff_frequency: f32, nyquist: f32 },
    #[error("bandwidth coefficient {0} is outside the open interval (0, 1)")]
    BandwidthOutOfRange(f32),
}
