//! Common Types for the OFDM Link Simulator
//!
//! Defines fundamental types shared by the signal chain and its collaborators

use num_complex::Complex64;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Complex baseband sample (time or frequency domain)
pub type Sample = Complex64;

/// A single bit, stored as 0 or 1
pub type Bit = u8;

/// Ordered group of bits mapped to one constellation point (MSB first)
pub type BitGroup = Vec<Bit>;

/// Modulation schemes, discriminant is the number of bits per symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum ModulationScheme {
    /// QPSK (2 bits/symbol)
    Qpsk = 2,
    /// 16-QAM (4 bits/symbol)
    Qam16 = 4,
    /// 64-QAM (6 bits/symbol)
    Qam64 = 6,
}

impl ModulationScheme {
    /// Number of bits carried by one symbol
    pub fn bits_per_symbol(&self) -> usize {
        *self as usize
    }

    /// Number of constellation points (2^mu)
    pub fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ModulationScheme::Qpsk => "QPSK",
            ModulationScheme::Qam16 => "16-QAM",
            ModulationScheme::Qam64 => "64-QAM",
        }
    }
}

impl std::fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
