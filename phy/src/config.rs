//! Link Configuration
//!
//! All static parameters of one OFDM link, fixed at construction time.

use crate::carrier_plan::CarrierPlan;
use crate::channel::check_snr_db;
use crate::constellation::Constellation;
use crate::ofdm::FftScaling;
use crate::PhyError;
use common::types::Sample;

/// OFDM link configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OfdmConfig {
    /// Number of subcarriers (K), also the FFT size
    pub num_subcarriers: usize,
    /// Cyclic prefix length in samples
    pub cp_len: usize,
    /// Nominal pilot count before the last-carrier adjustment
    pub num_pilots: usize,
    /// Known value transmitted on pilot carriers
    pub pilot_value: Sample,
    /// Bit-group to symbol table
    pub constellation: Constellation,
    /// Channel impulse response taps
    pub channel_taps: Vec<Sample>,
    /// Target SNR at the receiver in dB
    pub snr_db: f64,
    /// DFT normalization
    pub fft_scaling: FftScaling,
}

impl Default for OfdmConfig {
    fn default() -> Self {
        Self {
            num_subcarriers: 64,
            cp_len: 64 / 4,
            num_pilots: 8,
            pilot_value: Sample::new(3.0, 3.0),
            constellation: Constellation::qam16(),
            channel_taps: vec![
                Sample::new(1.0, 0.0),
                Sample::new(0.0, 0.0),
                Sample::new(0.3, 0.3),
            ],
            snr_db: 25.0,
            fft_scaling: FftScaling::Unitary,
        }
    }
}

impl OfdmConfig {
    /// Bits per constellation symbol (mu)
    pub fn bits_per_symbol(&self) -> usize {
        self.constellation.bits_per_symbol()
    }

    /// Check every static parameter, fail on the first invalid one
    pub fn validate(&self) -> Result<(), PhyError> {
        let plan = CarrierPlan::new(self.num_subcarriers, self.num_pilots)?;
        if plan.num_data() == 0 {
            return Err(PhyError::ConfigurationError(format!(
                "{} pilots leave no data carriers out of {}",
                plan.num_pilots(),
                self.num_subcarriers
            )));
        }

        if self.cp_len == 0 || self.cp_len >= self.num_subcarriers {
            return Err(PhyError::ConfigurationError(format!(
                "Cyclic prefix length {} must be in 1..{}",
                self.cp_len, self.num_subcarriers
            )));
        }

        if !self.pilot_value.re.is_finite() || !self.pilot_value.im.is_finite() {
            return Err(PhyError::ConfigurationError(
                "Pilot value is not finite".to_string()
            ));
        }

        if self.channel_taps.is_empty() {
            return Err(PhyError::ConfigurationError(
                "Channel impulse response is empty".to_string()
            ));
        }

        check_snr_db(self.snr_db)?;

        Ok(())
    }
}
