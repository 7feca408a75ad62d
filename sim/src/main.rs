//! OFDM Link Simulator
//!
//! Runs random payloads through a simulated OFDM transmitter, multipath
//! channel and receiver front end, and reports what happened to each symbol.

mod config;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::SimConfig;
use interfaces::{JsonFileSink, LogSink, PipelineReport, ReportSink};
use phy::OfdmPipeline;

/// OFDM link simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file (reference link when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Seed for bit generation and channel noise (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Target SNR in dB, overrides the config file
    #[arg(long)]
    snr_db: Option<f64>,

    /// Number of independent OFDM symbols to simulate
    #[arg(long, default_value = "1")]
    symbols: usize,

    /// Write the last symbol's report as JSON to this path
    #[arg(long)]
    report: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut sim_config = match &args.config {
        Some(path) => SimConfig::from_toml_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(snr_db) = args.snr_db {
        sim_config.channel.snr_db = snr_db;
    }

    // Initialize logging
    let log_level = args.log_level.clone().unwrap_or_else(|| sim_config.log.level.clone());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("Starting OFDM link simulator");
    match &args.config {
        Some(path) => info!("Configuration file: {}", path),
        None => info!("Configuration file: none, using reference link"),
    }

    let ofdm_config = sim_config.to_ofdm_config()?;
    let pipeline = OfdmPipeline::new(ofdm_config)?;

    info!("Link configuration:");
    info!("  Subcarriers: {}", pipeline.plan().num_subcarriers());
    info!("  Cyclic prefix: {}", pipeline.codec().cp_len());
    info!("  Pilot carriers: {:?}", pipeline.plan().pilot_carriers());
    info!("  Data carriers: {}", pipeline.plan().num_data());
    info!("  Bits per symbol: {}", pipeline.config().bits_per_symbol());
    info!("  Payload bits per OFDM symbol: {}", pipeline.payload_bits());
    info!("  Channel taps: {:?}", pipeline.channel().impulse_response());
    info!("  SNR: {} dB", pipeline.channel().snr_db());

    let mut rng = match args.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    if args.symbols == 0 {
        warn!("Nothing to simulate (--symbols 0)");
        return Ok(());
    }

    let mut log_sink = LogSink::new();
    let mut last_report = None;

    for _ in 0..args.symbols {
        let output = pipeline.run_random(&mut rng)?;
        let report = PipelineReport::from_run(&pipeline, &output);
        log_sink.publish(&report)?;
        last_report = Some(report);
    }

    if let (Some(path), Some(report)) = (&args.report, &last_report) {
        JsonFileSink::new(path).publish(report)?;
    }

    info!("Simulated {} OFDM symbol(s)", log_sink.published());
    Ok(())
}
