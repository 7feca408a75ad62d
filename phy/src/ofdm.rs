//! OFDM Modulation and Demodulation
//!
//! Converts frequency-domain blocks to time-domain waveforms and back,
//! inserting and stripping the cyclic prefix. FFT plans are computed once
//! with rustfft and shared by every symbol.

use crate::PhyError;
use common::types::Sample;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Normalization applied to the DFT pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FftScaling {
    /// 1/sqrt(K) on both transforms, energy preserving
    #[default]
    Unitary,
    /// 1/K on the inverse transform only (NumPy convention)
    Backward,
}

impl FftScaling {
    /// Scale factors (inverse, forward) for a K-point transform
    fn factors(&self, fft_size: usize) -> (f64, f64) {
        let n = fft_size as f64;
        match self {
            FftScaling::Unitary => (1.0 / n.sqrt(), 1.0 / n.sqrt()),
            FftScaling::Backward => (1.0 / n, 1.0),
        }
    }
}

/// Time/frequency codec for one OFDM symbol
#[derive(Clone)]
pub struct OfdmCodec {
    /// FFT size (K)
    fft_size: usize,
    /// Cyclic prefix length in samples
    cp_len: usize,
    /// DFT normalization
    scaling: FftScaling,
    /// Forward FFT plan
    fft: Arc<dyn Fft<f64>>,
    /// Inverse FFT plan
    ifft: Arc<dyn Fft<f64>>,
}

impl OfdmCodec {
    /// Create a new codec for `fft_size` subcarriers and a `cp_len` sample prefix
    pub fn new(fft_size: usize, cp_len: usize, scaling: FftScaling) -> Result<Self, PhyError> {
        if fft_size == 0 {
            return Err(PhyError::ConfigurationError(
                "FFT size must be positive".to_string()
            ));
        }

        if cp_len == 0 || cp_len >= fft_size {
            return Err(PhyError::ConfigurationError(format!(
                "Cyclic prefix length {} must be in 1..{}",
                cp_len, fft_size
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        debug!("Planned {}-point FFT/IFFT, CP={}, scaling={:?}", fft_size, cp_len, scaling);

        Ok(Self {
            fft_size,
            cp_len,
            scaling,
            fft,
            ifft,
        })
    }

    /// FFT size (K)
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Cyclic prefix length
    pub fn cp_len(&self) -> usize {
        self.cp_len
    }

    /// Samples per symbol including the cyclic prefix
    pub fn symbol_length(&self) -> usize {
        self.fft_size + self.cp_len
    }

    /// DFT normalization in use
    pub fn scaling(&self) -> FftScaling {
        self.scaling
    }

    /// Inverse DFT of a length-K frequency-domain block
    pub fn to_time(&self, block: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        self.check_len("IDFT input", block.len(), self.fft_size)?;

        let (scale, _) = self.scaling.factors(self.fft_size);
        Ok(Self::transform(&*self.ifft, block, scale))
    }

    /// Forward DFT of a length-K time-domain block
    pub fn to_frequency(&self, time: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        self.check_len("DFT input", time.len(), self.fft_size)?;

        let (_, scale) = self.scaling.factors(self.fft_size);
        Ok(Self::transform(&*self.fft, time, scale))
    }

    /// Prepend the last CP samples of a length-K symbol
    pub fn add_cyclic_prefix(&self, time: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        self.check_len("CP insertion input", time.len(), self.fft_size)?;

        let mut output = Vec::with_capacity(self.symbol_length());
        output.extend_from_slice(&time[self.fft_size - self.cp_len..]);
        output.extend_from_slice(time);

        Ok(output)
    }

    /// Drop the first CP samples and keep the next K
    ///
    /// Trailing samples (e.g. the channel's delay-spread tail) are ignored.
    pub fn remove_cyclic_prefix(&self, signal: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        if signal.len() < self.symbol_length() {
            return Err(PhyError::ConfigurationError(format!(
                "Expected at least {} samples, got {}",
                self.symbol_length(),
                signal.len()
            )));
        }

        Ok(signal[self.cp_len..self.cp_len + self.fft_size].to_vec())
    }

    /// IDFT followed by CP insertion
    pub fn modulate(&self, block: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        let time = self.to_time(block)?;
        self.add_cyclic_prefix(&time)
    }

    /// CP removal followed by DFT
    pub fn demodulate(&self, signal: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        let time = self.remove_cyclic_prefix(signal)?;
        self.to_frequency(&time)
    }

    fn transform(plan: &dyn Fft<f64>, input: &[Sample], scale: f64) -> Vec<Sample> {
        let mut buffer = input.to_vec();
        plan.process(&mut buffer);

        if scale != 1.0 {
            for s in buffer.iter_mut() {
                *s *= scale;
            }
        }

        buffer
    }

    fn check_len(&self, what: &str, actual: usize, expected: usize) -> Result<(), PhyError> {
        if actual != expected {
            return Err(PhyError::ConfigurationError(format!(
                "{}: expected {} samples, got {}",
                what, expected, actual
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for OfdmCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfdmCodec")
            .field("fft_size", &self.fft_size)
            .field("cp_len", &self.cp_len)
            .field("scaling", &self.scaling)
            .finish()
    }
}
