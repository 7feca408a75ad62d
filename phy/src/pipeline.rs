//! Single-Symbol OFDM Link
//!
//! Wires the transmitter, channel and receiver front end together for one
//! OFDM symbol: bits -> frame -> IDFT -> CP -> channel -> CP removal -> DFT.

use crate::carrier_plan::CarrierPlan;
use crate::channel::MultipathChannel;
use crate::config::OfdmConfig;
use crate::frame_builder::FrameBuilder;
use crate::ofdm::OfdmCodec;
use crate::PhyError;
use common::types::{Bit, Sample};
use ndarray::Array2;
use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use tracing::{debug, info};

/// Every intermediate array of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Payload bits
    pub bits: Vec<Bit>,
    /// Payload split into mu-bit groups
    pub bit_groups: Array2<Bit>,
    /// Mapped data symbols in data-carrier order
    pub data_symbols: Vec<Sample>,
    /// Transmitted frequency-domain block (length K)
    pub tx_block: Vec<Sample>,
    /// Transmitted time-domain symbol before CP (length K)
    pub tx_time: Vec<Sample>,
    /// Transmitted waveform with CP (length K + CP)
    pub tx_signal: Vec<Sample>,
    /// Received waveform (length K + CP + L - 1)
    pub rx_signal: Vec<Sample>,
    /// Received time-domain symbol after CP removal (length K)
    pub rx_time: Vec<Sample>,
    /// Received frequency-domain block (length K)
    pub rx_block: Vec<Sample>,
    /// Average power of the convolved signal
    pub signal_power: f64,
    /// Noise variance added by the channel
    pub noise_variance: f64,
}

/// One transmitter, channel and receiver front end
#[derive(Debug, Clone)]
pub struct OfdmPipeline {
    config: OfdmConfig,
    frame_builder: FrameBuilder,
    codec: OfdmCodec,
    channel: MultipathChannel,
}

impl OfdmPipeline {
    /// Validate the configuration and build every stage
    pub fn new(config: OfdmConfig) -> Result<Self, PhyError> {
        config.validate()?;

        let plan = CarrierPlan::new(config.num_subcarriers, config.num_pilots)?;
        let frame_builder = FrameBuilder::new(plan, config.constellation.clone(), config.pilot_value);
        let codec = OfdmCodec::new(config.num_subcarriers, config.cp_len, config.fft_scaling)?;
        let channel = MultipathChannel::new(config.channel_taps.clone(), config.snr_db)?;

        info!(
            "OFDM link: K={}, CP={}, {} pilots, {} data carriers, {} bits/symbol, SNR={} dB",
            config.num_subcarriers,
            config.cp_len,
            frame_builder.plan().num_pilots(),
            frame_builder.plan().num_data(),
            config.bits_per_symbol(),
            config.snr_db
        );

        Ok(Self {
            config,
            frame_builder,
            codec,
            channel,
        })
    }

    /// Link configuration
    pub fn config(&self) -> &OfdmConfig {
        &self.config
    }

    /// Carrier plan in use
    pub fn plan(&self) -> &CarrierPlan {
        self.frame_builder.plan()
    }

    /// Frame builder (plan, constellation, pilot value)
    pub fn frame_builder(&self) -> &FrameBuilder {
        &self.frame_builder
    }

    /// Time/frequency codec
    pub fn codec(&self) -> &OfdmCodec {
        &self.codec
    }

    /// Channel model
    pub fn channel(&self) -> &MultipathChannel {
        &self.channel
    }

    /// Payload bits per OFDM symbol
    pub fn payload_bits(&self) -> usize {
        self.frame_builder.payload_bits()
    }

    /// Run one OFDM symbol carrying `bits` through the link
    pub fn run<R: Rng + ?Sized>(&self, bits: &[Bit], rng: &mut R) -> Result<PipelineOutput, PhyError> {
        let frame = self.frame_builder.build(bits)?;

        let tx_time = self.codec.to_time(&frame.block)?;
        debug!("Number of OFDM samples in time-domain before CP: {}", tx_time.len());

        let tx_signal = self.codec.add_cyclic_prefix(&tx_time)?;
        debug!("Number of OFDM samples in time domain with CP: {}", tx_signal.len());

        let channel_output = self.channel.apply(&tx_signal, rng)?;

        let rx_time = self.codec.remove_cyclic_prefix(&channel_output.samples)?;
        let rx_block = self.codec.to_frequency(&rx_time)?;
        debug!("Received {} samples, {} subcarriers after DFT", channel_output.samples.len(), rx_block.len());

        Ok(PipelineOutput {
            bits: bits.to_vec(),
            bit_groups: frame.bit_groups,
            data_symbols: frame.data_symbols,
            tx_block: frame.block,
            tx_time,
            tx_signal,
            rx_signal: channel_output.samples,
            rx_time,
            rx_block,
            signal_power: channel_output.signal_power,
            noise_variance: channel_output.noise_variance,
        })
    }

    /// Draw a random payload from `rng` and run it through the link
    pub fn run_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PipelineOutput, PhyError> {
        let bits = random_bits(self.payload_bits(), rng);
        debug!("Bits count: {}", bits.len());
        self.run(&bits, rng)
    }
}

/// Independent fair coin flips, one per bit
pub fn random_bits<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Bit> {
    let coin = Bernoulli::new(0.5).unwrap_or_else(|e| unreachable!("p = 0.5 is valid: {}", e));
    (0..count).map(|_| coin.sample(rng) as Bit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofdm::FftScaling;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn assert_close(a: &[Sample], b: &[Sample], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).norm() < tol, "carrier {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_reference_pipeline_shapes() {
        let pipeline = OfdmPipeline::new(OfdmConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        let out = pipeline.run_random(&mut rng).unwrap();
        assert_eq!(out.bits.len(), 220);
        assert_eq!(out.bit_groups.dim(), (55, 4));
        assert_eq!(out.data_symbols.len(), 55);
        assert_eq!(out.tx_block.len(), 64);
        assert_eq!(out.tx_time.len(), 64);
        assert_eq!(out.tx_signal.len(), 80);
        assert_eq!(out.rx_signal.len(), 82);
        assert_eq!(out.rx_time.len(), 64);
        assert_eq!(out.rx_block.len(), 64);
        assert!(out.signal_power > 0.0);
        assert!((out.noise_variance - out.signal_power * 10f64.powf(-2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_noise_free_identity_link() {
        for scaling in [FftScaling::Unitary, FftScaling::Backward] {
            let config = OfdmConfig {
                channel_taps: vec![Sample::new(1.0, 0.0)],
                snr_db: f64::INFINITY,
                fft_scaling: scaling,
                ..Default::default()
            };
            let pipeline = OfdmPipeline::new(config).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(5);

            let out = pipeline.run_random(&mut rng).unwrap();
            assert_eq!(out.noise_variance, 0.0);
            assert_close(&out.rx_block, &out.tx_block, 1e-9);
        }
    }

    #[test]
    fn test_multipath_is_per_carrier_gain() {
        // CP longer than the delay spread: RX = H * TX on every carrier
        let config = OfdmConfig {
            snr_db: f64::INFINITY,
            ..Default::default()
        };
        let pipeline = OfdmPipeline::new(config).unwrap();
        let h = pipeline.channel().frequency_response(64);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let out = pipeline.run_random(&mut rng).unwrap();
        let expected: Vec<Sample> = out.tx_block.iter().zip(&h).map(|(x, h)| x * h).collect();
        assert_close(&out.rx_block, &expected, 1e-9);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let pipeline = OfdmPipeline::new(OfdmConfig::default()).unwrap();

        let a = pipeline.run_random(&mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        let b = pipeline.run_random(&mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        assert_eq!(a.bits, b.bits);
        assert_eq!(a.rx_block, b.rx_block);

        let c = pipeline.run_random(&mut ChaCha8Rng::seed_from_u64(78)).unwrap();
        assert_ne!(a.bits, c.bits);
    }

    #[test]
    fn test_wrong_payload_rejected() {
        let pipeline = OfdmPipeline::new(OfdmConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let err = pipeline.run(&vec![0; 100], &mut rng).unwrap_err();
        assert_eq!(err, PhyError::FrameSizeError { expected: 220, actual: 100 });
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = OfdmConfig {
            cp_len: 64,
            ..Default::default()
        };
        assert!(matches!(OfdmPipeline::new(config), Err(PhyError::ConfigurationError(_))));
    }

    #[test]
    fn test_random_bits_are_binary_and_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let bits = random_bits(10_000, &mut rng);

        assert!(bits.iter().all(|&b| b <= 1));
        let mean = bits.iter().map(|&b| b as f64).sum::<f64>() / bits.len() as f64;
        assert!((mean - 0.5).abs() < 0.03, "mean {}", mean);
    }
}
