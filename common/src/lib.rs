//! Common Utilities and Types Library
//!
//! This crate provides shared types and utilities used across the OFDM link simulator.

pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;
pub use utils::*;
