//! Subcarrier Allocation
//!
//! Splits the K subcarriers of an OFDM block into pilot and data carriers.
//! Pilots sit on every (K / P)-th carrier starting at 0, and the last
//! carrier is always a pilot so that the band edges are both covered.

use crate::PhyError;
use tracing::debug;

/// Pilot/data partition of the subcarriers of one OFDM block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierPlan {
    /// Indices of all subcarriers (0..K)
    all_carriers: Vec<usize>,
    /// Pilot subcarrier indices, ascending and distinct
    pilot_carriers: Vec<usize>,
    /// Data subcarrier indices, ascending
    data_carriers: Vec<usize>,
}

impl CarrierPlan {
    /// Build the carrier plan for `num_subcarriers` carriers and a nominal pilot count
    ///
    /// The forced last pilot is only appended when the stride did not
    /// already land on it, so the pilot set never holds duplicates and
    /// `num_pilots()` may be `num_pilots_nominal` or `num_pilots_nominal + 1`.
    pub fn new(num_subcarriers: usize, num_pilots_nominal: usize) -> Result<Self, PhyError> {
        if num_subcarriers == 0 {
            return Err(PhyError::ConfigurationError(
                "Number of subcarriers must be positive".to_string()
            ));
        }

        if num_pilots_nominal == 0 || num_pilots_nominal > num_subcarriers {
            return Err(PhyError::ConfigurationError(format!(
                "Pilot count {} out of range 1..={}",
                num_pilots_nominal, num_subcarriers
            )));
        }

        let all_carriers: Vec<usize> = (0..num_subcarriers).collect();
        let stride = num_subcarriers / num_pilots_nominal;
        let last = num_subcarriers - 1;

        let mut pilot_carriers: Vec<usize> = all_carriers.iter().copied().step_by(stride).collect();
        if pilot_carriers.last() != Some(&last) {
            pilot_carriers.push(last);
        }

        let mut is_pilot = vec![false; num_subcarriers];
        for &p in &pilot_carriers {
            is_pilot[p] = true;
        }
        let data_carriers: Vec<usize> = all_carriers
            .iter()
            .copied()
            .filter(|&k| !is_pilot[k])
            .collect();

        debug!(
            "Carrier plan: K={}, stride={}, {} pilots, {} data carriers",
            num_subcarriers,
            stride,
            pilot_carriers.len(),
            data_carriers.len()
        );

        Ok(Self {
            all_carriers,
            pilot_carriers,
            data_carriers,
        })
    }

    /// Indices of all subcarriers
    pub fn all_carriers(&self) -> &[usize] {
        &self.all_carriers
    }

    /// Indices of the pilot subcarriers
    pub fn pilot_carriers(&self) -> &[usize] {
        &self.pilot_carriers
    }

    /// Indices of the data subcarriers
    pub fn data_carriers(&self) -> &[usize] {
        &self.data_carriers
    }

    /// Total number of subcarriers (K)
    pub fn num_subcarriers(&self) -> usize {
        self.all_carriers.len()
    }

    /// Actual number of pilots after the last-carrier adjustment
    pub fn num_pilots(&self) -> usize {
        self.pilot_carriers.len()
    }

    /// Number of data subcarriers
    pub fn num_data(&self) -> usize {
        self.data_carriers.len()
    }

    /// Whether `index` is a pilot carrier
    pub fn is_pilot(&self, index: usize) -> bool {
        self.pilot_carriers.binary_search(&index).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_plan() {
        let plan = CarrierPlan::new(64, 8).unwrap();

        assert_eq!(plan.pilot_carriers(), &[0, 8, 16, 24, 32, 40, 48, 56, 63]);
        assert_eq!(plan.num_pilots(), 9);
        assert_eq!(plan.num_data(), 55);
        assert_eq!(plan.data_carriers()[..8], [1, 2, 3, 4, 5, 6, 7, 9]);
        assert_eq!(*plan.data_carriers().last().unwrap(), 62);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        for (k, p) in [(64, 8), (64, 7), (52, 5), (10, 3), (16, 16), (1, 1), (128, 1)] {
            let plan = CarrierPlan::new(k, p).unwrap();
            assert_eq!(plan.num_pilots() + plan.num_data(), k, "K={} P={}", k, p);

            let mut merged: Vec<usize> = plan
                .pilot_carriers()
                .iter()
                .chain(plan.data_carriers())
                .copied()
                .collect();
            merged.sort_unstable();
            assert_eq!(merged, plan.all_carriers(), "K={} P={}", k, p);
        }
    }

    #[test]
    fn test_last_carrier_not_duplicated() {
        // Stride 1 already lands on K-1
        let plan = CarrierPlan::new(8, 8).unwrap();
        assert_eq!(plan.pilot_carriers(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(plan.num_data(), 0);

        // 10 / 3 = 3 -> 0, 3, 6, 9; 9 is already the last index
        let plan = CarrierPlan::new(10, 3).unwrap();
        assert_eq!(plan.pilot_carriers(), &[0, 3, 6, 9]);
    }

    #[test]
    fn test_is_pilot() {
        let plan = CarrierPlan::new(64, 8).unwrap();
        assert!(plan.is_pilot(0));
        assert!(plan.is_pilot(63));
        assert!(!plan.is_pilot(1));
        assert!(!plan.is_pilot(62));
    }

    #[test]
    fn test_invalid_pilot_count() {
        assert!(matches!(CarrierPlan::new(64, 0), Err(PhyError::ConfigurationError(_))));
        assert!(matches!(CarrierPlan::new(64, 65), Err(PhyError::ConfigurationError(_))));
        assert!(matches!(CarrierPlan::new(0, 1), Err(PhyError::ConfigurationError(_))));
    }
}
