//! TOML Configuration for the Simulator
//!
//! Every field is optional; missing values fall back to the reference
//! 64-carrier 16-QAM link.

use anyhow::Context;
use common::types::{ModulationScheme, Sample};
use num_traits::FromPrimitive;
use phy::{Constellation, FftScaling, OfdmConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
    /// OFDM modulation parameters
    #[serde(default)]
    pub ofdm: OfdmSection,
    /// Channel parameters
    #[serde(default)]
    pub channel: ChannelSection,
    /// Logging configuration
    #[serde(default)]
    pub log: LogSection,
}

/// `[ofdm]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfdmSection {
    /// Number of subcarriers (K)
    #[serde(default = "default_subcarriers")]
    pub subcarriers: usize,
    /// Cyclic prefix length, K/4 when omitted
    #[serde(default)]
    pub cyclic_prefix: Option<usize>,
    /// Nominal pilot count
    #[serde(default = "default_pilots")]
    pub pilots: usize,
    /// Pilot value as [re, im]
    #[serde(default = "default_pilot_value")]
    pub pilot_value: [f64; 2],
    /// Bits per QAM symbol (2, 4 or 6)
    #[serde(default = "default_bits_per_symbol")]
    pub bits_per_symbol: u8,
    /// DFT normalization ("unitary" or "backward")
    #[serde(default)]
    pub fft_scaling: FftScaling,
}

impl Default for OfdmSection {
    fn default() -> Self {
        Self {
            subcarriers: default_subcarriers(),
            cyclic_prefix: None,
            pilots: default_pilots(),
            pilot_value: default_pilot_value(),
            bits_per_symbol: default_bits_per_symbol(),
            fft_scaling: FftScaling::default(),
        }
    }
}

fn default_subcarriers() -> usize {
    64
}

fn default_pilots() -> usize {
    8
}

fn default_pilot_value() -> [f64; 2] {
    [3.0, 3.0]
}

fn default_bits_per_symbol() -> u8 {
    4
}

/// `[channel]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelSection {
    /// Impulse response taps as [re, im] pairs
    #[serde(default = "default_taps")]
    pub taps: Vec<[f64; 2]>,
    /// Target SNR in dB (`inf` for a noise-free channel)
    #[serde(default = "default_snr_db")]
    pub snr_db: f64,
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            taps: default_taps(),
            snr_db: default_snr_db(),
        }
    }
}

fn default_taps() -> Vec<[f64; 2]> {
    vec![[1.0, 0.0], [0.0, 0.0], [0.3, 0.3]]
}

fn default_snr_db() -> f64 {
    25.0
}

/// `[log]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSection {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml_str(&contents).with_context(|| format!("Invalid config file {}", path))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: SimConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Build the validated link configuration
    pub fn to_ofdm_config(&self) -> anyhow::Result<OfdmConfig> {
        let scheme = ModulationScheme::from_u8(self.ofdm.bits_per_symbol).ok_or_else(|| {
            anyhow::anyhow!("Unsupported bits per symbol: {}", self.ofdm.bits_per_symbol)
        })?;

        let config = OfdmConfig {
            num_subcarriers: self.ofdm.subcarriers,
            cp_len: self.ofdm.cyclic_prefix.unwrap_or(self.ofdm.subcarriers / 4),
            num_pilots: self.ofdm.pilots,
            pilot_value: Sample::new(self.ofdm.pilot_value[0], self.ofdm.pilot_value[1]),
            constellation: Constellation::for_scheme(scheme),
            channel_taps: self
                .channel
                .taps
                .iter()
                .map(|[re, im]| Sample::new(*re, *im))
                .collect(),
            snr_db: self.channel.snr_db,
            fft_scaling: self.ofdm.fft_scaling,
        };

        config.validate()?;
        Ok(config)
    }
}
