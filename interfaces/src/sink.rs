//! Report Sinks
//!
//! Consumers of `PipelineReport`s. Sinks only read the report; nothing they
//! do feeds back into the signal chain.

use crate::report::PipelineReport;
use crate::InterfaceError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for pipeline reports
pub trait ReportSink {
    /// Publish one report
    fn publish(&mut self, report: &PipelineReport) -> Result<(), InterfaceError>;
}

/// Writes the diagnostics as tracing events
#[derive(Debug, Default)]
pub struct LogSink {
    published: usize,
}

impl LogSink {
    /// Create a new log sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports logged so far
    pub fn published(&self) -> usize {
        self.published
    }
}

impl ReportSink for LogSink {
    fn publish(&mut self, report: &PipelineReport) -> Result<(), InterfaceError> {
        let d = &report.diagnostics;
        self.published += 1;

        info!("Symbol {}:", self.published);
        info!("  Pilot carriers: {:?}", report.carriers.pilot);
        info!("  Data carriers: {}", report.carriers.data.len());
        info!("  Bits count: {}", d.bit_count);
        info!("  First {} bits: {}", d.first_bits.len(), d.first_bits);
        info!("  First {} bit groups: {:?}", d.first_bit_groups.len(), d.first_bit_groups);
        let symbols: Vec<String> = d
            .first_symbols
            .iter()
            .map(|s| format!("{}{:+}j", s.re, s.im))
            .collect();
        info!("  First {} QAM symbols: [{}]", symbols.len(), symbols.join(", "));
        info!("  Mean of bits (should be around 0.5): {:.4}", d.mean_bit);
        info!("  Number of OFDM carriers in frequency domain: {}", d.num_carriers);
        info!("  Samples before CP: {}, with CP: {}", d.samples_before_cp, d.samples_with_cp);
        info!("  RX signal power: {:.4}. Noise power: {:.4}", d.signal_power, d.noise_power);
        match d.snr_db {
            Some(snr) => info!("  Realized SNR: {:.2} dB", snr),
            None => info!("  Realized SNR: noise-free"),
        }
        debug!("  Payload: {}", d.payload_hex);

        Ok(())
    }
}

/// Writes each report as pretty-printed JSON, overwriting the file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonFileSink {
    fn publish(&mut self, report: &PipelineReport) -> Result<(), InterfaceError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!("Report written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phy::{OfdmConfig, OfdmPipeline};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn reference_report() -> PipelineReport {
        let pipeline = OfdmPipeline::new(OfdmConfig::default()).unwrap();
        let output = pipeline.run_random(&mut ChaCha8Rng::seed_from_u64(21)).unwrap();
        PipelineReport::from_run(&pipeline, &output)
    }

    #[test]
    fn test_log_sink_counts_reports() {
        let report = reference_report();
        let mut sink = LogSink::new();

        sink.publish(&report).unwrap();
        sink.publish(&report).unwrap();
        assert_eq!(sink.published(), 2);
    }

    #[test]
    fn test_json_sink_round_trip() {
        let report = reference_report();
        let path = std::env::temp_dir().join(format!("ofdm_report_{}.json", std::process::id()));

        let mut sink = JsonFileSink::new(&path);
        assert_eq!(sink.path(), path.as_path());
        sink.publish(&report).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: PipelineReport = serde_json::from_str(&contents).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(parsed.carriers, report.carriers);
        assert_eq!(parsed.constellation, report.constellation);
        assert_eq!(parsed.diagnostics.bit_count, 220);
        assert_eq!(parsed.diagnostics.first_symbols, report.diagnostics.first_symbols);
        assert_eq!(parsed.tx_magnitude.len(), report.tx_magnitude.len());
    }

    #[test]
    fn test_json_sink_bad_path() {
        let mut sink = JsonFileSink::new("/nonexistent-dir/report.json");
        assert!(matches!(sink.publish(&reference_report()), Err(InterfaceError::IoError(_))));
    }
}
