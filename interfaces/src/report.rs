//! Report Types for Visualization and Diagnostics
//!
//! Read-only snapshots of one pipeline run, serializable for external
//! plotting tools.

use common::types::Sample;
use common::utils::{bits_to_string, bytes_to_hex, linear_to_db, pack_bits};
use phy::{OfdmPipeline, PipelineOutput};
use serde::{Deserialize, Serialize};

/// Number of leading payload bits shown in diagnostics
pub const PREVIEW_BITS: usize = 20;

/// Number of leading bit groups and QAM symbols shown in diagnostics
pub const PREVIEW_SYMBOLS: usize = 5;

/// Pilot/data layout of the subcarriers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierMap {
    /// All subcarrier indices
    pub all: Vec<usize>,
    /// Pilot subcarrier indices
    pub pilot: Vec<usize>,
    /// Data subcarrier indices
    pub data: Vec<usize>,
}

/// One labelled constellation point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationEntry {
    /// Bit pattern, e.g. "1010"
    pub bits: String,
    /// In-phase component
    pub re: f64,
    /// Quadrature component
    pub im: f64,
}

/// Scalar diagnostics of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Payload bit count
    pub bit_count: usize,
    /// First payload bits
    pub first_bits: String,
    /// First bit groups after serial-to-parallel conversion
    pub first_bit_groups: Vec<String>,
    /// First mapped QAM symbols, labelled with their bit groups
    pub first_symbols: Vec<ConstellationEntry>,
    /// Whole payload packed MSB first, as hex
    pub payload_hex: String,
    /// Mean of the payload bits (should be around 0.5)
    pub mean_bit: f64,
    /// Subcarriers in the frequency-domain block
    pub num_carriers: usize,
    /// Time-domain samples before CP insertion
    pub samples_before_cp: usize,
    /// Time-domain samples after CP insertion
    pub samples_with_cp: usize,
    /// Received signal power before noise
    pub signal_power: f64,
    /// Injected noise power
    pub noise_power: f64,
    /// Realized SNR in dB, `None` when noise-free
    pub snr_db: Option<f64>,
}

/// Everything an external plotting or logging layer needs from one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Carrier allocation
    pub carriers: CarrierMap,
    /// Constellation table in pattern order
    pub constellation: Vec<ConstellationEntry>,
    /// |H(k)| of the channel over the K subcarriers
    pub channel_response_magnitude: Vec<f64>,
    /// |x(t)| of the transmitted waveform (with CP)
    pub tx_magnitude: Vec<f64>,
    /// |y(t)| of the received waveform
    pub rx_magnitude: Vec<f64>,
    /// Scalar diagnostics
    pub diagnostics: Diagnostics,
}

impl PipelineReport {
    /// Snapshot a finished run
    pub fn from_run(pipeline: &OfdmPipeline, output: &PipelineOutput) -> Self {
        let plan = pipeline.plan();

        let carriers = CarrierMap {
            all: plan.all_carriers().to_vec(),
            pilot: plan.pilot_carriers().to_vec(),
            data: plan.data_carriers().to_vec(),
        };

        let constellation = pipeline
            .frame_builder()
            .constellation()
            .entries()
            .iter()
            .map(|(point, bits)| ConstellationEntry {
                bits: bits_to_string(bits),
                re: point.re,
                im: point.im,
            })
            .collect();

        let channel_response_magnitude =
            magnitudes(&pipeline.channel().frequency_response(plan.num_subcarriers()));

        let mean_bit = if output.bits.is_empty() {
            0.0
        } else {
            output.bits.iter().map(|&b| b as f64).sum::<f64>() / output.bits.len() as f64
        };

        let preview = &output.bits[..output.bits.len().min(PREVIEW_BITS)];

        let first_bit_groups: Vec<String> = output
            .bit_groups
            .outer_iter()
            .take(PREVIEW_SYMBOLS)
            .map(|row| row.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect())
            .collect();

        let first_symbols = first_bit_groups
            .iter()
            .zip(&output.data_symbols)
            .map(|(bits, s)| ConstellationEntry {
                bits: bits.clone(),
                re: s.re,
                im: s.im,
            })
            .collect();

        let diagnostics = Diagnostics {
            bit_count: output.bits.len(),
            first_bits: bits_to_string(preview),
            first_bit_groups,
            first_symbols,
            payload_hex: bytes_to_hex(&pack_bits(&output.bits)),
            mean_bit,
            num_carriers: output.tx_block.len(),
            samples_before_cp: output.tx_time.len(),
            samples_with_cp: output.tx_signal.len(),
            signal_power: output.signal_power,
            noise_power: output.noise_variance,
            snr_db: (output.noise_variance > 0.0)
                .then(|| linear_to_db(output.signal_power / output.noise_variance)),
        };

        Self {
            carriers,
            constellation,
            channel_response_magnitude,
            tx_magnitude: magnitudes(&output.tx_signal),
            rx_magnitude: magnitudes(&output.rx_signal),
            diagnostics,
        }
    }
}

fn magnitudes(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| s.norm()).collect()
}
