//! OFDM Physical Layer Library
//!
//! This crate implements a single-link OFDM transceiver chain: carrier
//! allocation, QAM mapping, IFFT/FFT with cyclic prefix, and a multipath
//! channel with additive Gaussian noise.

pub mod carrier_plan;
pub mod channel;
pub mod config;
pub mod constellation;
pub mod frame_builder;
pub mod ofdm;
pub mod pipeline;

// Re-export commonly used types
pub use carrier_plan::CarrierPlan;
pub use channel::{ChannelOutput, MultipathChannel};
pub use config::OfdmConfig;
pub use constellation::Constellation;
pub use frame_builder::{FrameBuilder, OfdmFrame};
pub use ofdm::{FftScaling, OfdmCodec};
pub use pipeline::{OfdmPipeline, PipelineOutput};

use thiserror::Error;

/// Errors raised by the signal chain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhyError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Frame size error: expected {expected}, got {actual}")]
    FrameSizeError { expected: usize, actual: usize },

    #[error("Invalid bit group: {0}")]
    InvalidBitGroupError(String),
}
