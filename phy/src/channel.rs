//! Multipath Channel with AWGN
//!
//! Linear convolution with a static impulse response followed by complex
//! Gaussian noise whose variance tracks the measured received power.

use crate::PhyError;
use common::types::Sample;
use common::utils::{db_to_linear, mean_power};
use num_traits::Zero;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rustfft::FftPlanner;
use tracing::{debug, info};

/// Result of passing a waveform through the channel
#[derive(Debug, Clone)]
pub struct ChannelOutput {
    /// Received samples, length `tx.len() + taps.len() - 1`
    pub samples: Vec<Sample>,
    /// Average power of the convolved (noise-free) signal
    pub signal_power: f64,
    /// Complex noise variance added per sample
    pub noise_variance: f64,
}

/// Static multipath channel with additive white Gaussian noise
#[derive(Debug, Clone)]
pub struct MultipathChannel {
    /// Channel impulse response taps
    impulse_response: Vec<Sample>,
    /// Target SNR at the receiver in dB
    snr_db: f64,
}

impl MultipathChannel {
    /// Create a new channel
    ///
    /// `snr_db = f64::INFINITY` gives a noise-free channel.
    pub fn new(impulse_response: Vec<Sample>, snr_db: f64) -> Result<Self, PhyError> {
        if impulse_response.is_empty() {
            return Err(PhyError::ConfigurationError(
                "Channel impulse response is empty".to_string()
            ));
        }

        if impulse_response.iter().any(|h| !h.re.is_finite() || !h.im.is_finite()) {
            return Err(PhyError::ConfigurationError(
                "Channel impulse response contains non-finite taps".to_string()
            ));
        }

        check_snr_db(snr_db)?;

        Ok(Self {
            impulse_response,
            snr_db,
        })
    }

    /// Channel impulse response taps
    pub fn impulse_response(&self) -> &[Sample] {
        &self.impulse_response
    }

    /// Target SNR in dB
    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    /// Noise variance for a given received signal power
    pub fn noise_variance(&self, signal_power: f64) -> Result<f64, PhyError> {
        let sigma2 = signal_power / db_to_linear(self.snr_db);

        if !sigma2.is_finite() {
            return Err(PhyError::ConfigurationError(format!(
                "Noise power is not finite (signal power {}, SNR {} dB)",
                signal_power, self.snr_db
            )));
        }

        Ok(sigma2)
    }

    /// K-point frequency response of the zero-padded impulse response
    pub fn frequency_response(&self, fft_size: usize) -> Vec<Sample> {
        let mut buffer = vec![Sample::zero(); fft_size];
        for (slot, &h) in buffer.iter_mut().zip(&self.impulse_response) {
            *slot = h;
        }

        if fft_size > 0 {
            FftPlanner::new().plan_fft_forward(fft_size).process(&mut buffer);
        }

        buffer
    }

    /// Convolve, measure power and add noise
    pub fn apply<R: Rng + ?Sized>(&self, tx: &[Sample], rng: &mut R) -> Result<ChannelOutput, PhyError> {
        if tx.is_empty() {
            return Err(PhyError::ConfigurationError(
                "Channel input is empty".to_string()
            ));
        }

        let convolved = convolve(tx, &self.impulse_response);
        let signal_power = mean_power(&convolved);
        let noise_variance = self.noise_variance(signal_power)?;

        info!("RX signal power: {:.4}. Noise power: {:.4}", signal_power, noise_variance);

        let samples = if noise_variance > 0.0 {
            let sigma = (noise_variance / 2.0).sqrt();
            convolved
                .into_iter()
                .map(|s| {
                    let re: f64 = StandardNormal.sample(rng);
                    let im: f64 = StandardNormal.sample(rng);
                    s + Sample::new(re, im) * sigma
                })
                .collect()
        } else {
            convolved
        };

        debug!(
            "Channel: {} samples in, {} samples out, {} taps",
            tx.len(),
            samples.len(),
            self.impulse_response.len()
        );

        Ok(ChannelOutput {
            samples,
            signal_power,
            noise_variance,
        })
    }
}

/// Reject SNRs whose noise-to-signal ratio 10^(-snr/10) is not finite
///
/// `+inf` is accepted and means no noise.
pub fn check_snr_db(snr_db: f64) -> Result<(), PhyError> {
    if !db_to_linear(-snr_db).is_finite() {
        return Err(PhyError::ConfigurationError(format!(
            "SNR of {} dB gives a non-finite noise power",
            snr_db
        )));
    }

    Ok(())
}

/// Full linear convolution, output length `signal.len() + taps.len() - 1`
pub fn convolve(signal: &[Sample], taps: &[Sample]) -> Vec<Sample> {
    if signal.is_empty() || taps.is_empty() {
        return Vec::new();
    }

    let mut output = vec![Sample::zero(); signal.len() + taps.len() - 1];
    for (i, &x) in signal.iter().enumerate() {
        for (j, &h) in taps.iter().enumerate() {
            output[i + j] += x * h;
        }
    }

    output
}
