//! Presentation Interfaces Library
//!
//! This crate turns pipeline runs into read-only reports and publishes them
//! to logging and file sinks for external visualization.

pub mod report;
pub mod sink;

pub use report::{CarrierMap, ConstellationEntry, Diagnostics, PipelineReport};
pub use sink::{JsonFileSink, LogSink, ReportSink};

use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
