//! OFDM Frame Construction
//!
//! Serial-to-parallel conversion of the payload bits, QAM mapping and
//! allocation of pilot and data symbols onto the subcarriers of one block.

use crate::carrier_plan::CarrierPlan;
use crate::constellation::Constellation;
use crate::PhyError;
use common::types::{Bit, Sample};
use ndarray::Array2;
use num_traits::Zero;
use tracing::debug;

/// One frequency-domain OFDM block together with its intermediate stages
#[derive(Debug, Clone)]
pub struct OfdmFrame {
    /// Payload split into groups of mu bits, one row per data carrier
    pub bit_groups: Array2<Bit>,
    /// Mapped constellation points in data-carrier order
    pub data_symbols: Vec<Sample>,
    /// Frequency-domain block of length K
    pub block: Vec<Sample>,
}

/// Builds frequency-domain OFDM blocks from payload bits
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    plan: CarrierPlan,
    constellation: Constellation,
    pilot_value: Sample,
}

impl FrameBuilder {
    /// Create a new frame builder
    pub fn new(plan: CarrierPlan, constellation: Constellation, pilot_value: Sample) -> Self {
        Self {
            plan,
            constellation,
            pilot_value,
        }
    }

    /// Carrier plan used for allocation
    pub fn plan(&self) -> &CarrierPlan {
        &self.plan
    }

    /// Constellation used for mapping
    pub fn constellation(&self) -> &Constellation {
        &self.constellation
    }

    /// Known value transmitted on every pilot carrier
    pub fn pilot_value(&self) -> Sample {
        self.pilot_value
    }

    /// Number of payload bits carried by one OFDM symbol
    pub fn payload_bits(&self) -> usize {
        self.plan.num_data() * self.constellation.bits_per_symbol()
    }

    /// Split a flat bit stream into one mu-bit group per data carrier
    pub fn serial_to_groups(&self, bits: &[Bit]) -> Result<Array2<Bit>, PhyError> {
        let expected = self.payload_bits();
        if bits.len() != expected {
            return Err(PhyError::FrameSizeError {
                expected,
                actual: bits.len(),
            });
        }

        let shape = (self.plan.num_data(), self.constellation.bits_per_symbol());
        Array2::from_shape_vec(shape, bits.to_vec())
            .map_err(|e| PhyError::ConfigurationError(format!("Bit group reshape failed: {}", e)))
    }

    /// Allocate pilots and mapped data symbols onto a length-K block
    pub fn build_symbol(&self, data_symbols: &[Sample]) -> Result<Vec<Sample>, PhyError> {
        if data_symbols.len() != self.plan.num_data() {
            return Err(PhyError::FrameSizeError {
                expected: self.plan.num_data(),
                actual: data_symbols.len(),
            });
        }

        let mut block = vec![Sample::zero(); self.plan.num_subcarriers()];

        for &k in self.plan.pilot_carriers() {
            block[k] = self.pilot_value;
        }
        for (&k, &symbol) in self.plan.data_carriers().iter().zip(data_symbols) {
            block[k] = symbol;
        }

        Ok(block)
    }

    /// Run serial-to-parallel, mapping and allocation for one OFDM symbol
    pub fn build(&self, bits: &[Bit]) -> Result<OfdmFrame, PhyError> {
        let bit_groups = self.serial_to_groups(bits)?;
        debug!("Split {} bits into {} groups of {}", bits.len(), bit_groups.nrows(), bit_groups.ncols());

        let data_symbols = self.constellation.map_groups(&bit_groups)?;
        let block = self.build_symbol(&data_symbols)?;
        debug!("Number of OFDM carriers in frequency domain: {}", block.len());

        Ok(OfdmFrame {
            bit_groups,
            data_symbols,
            block,
        })
    }
}
