//! QAM Constellation Mapping
//!
//! Bidirectional mapping between fixed-length bit groups and complex
//! constellation points. The forward table is indexed by the MSB-first value
//! of the bit group; demapping searches the same table for the nearest point.

use crate::PhyError;
use common::types::{Bit, BitGroup, ModulationScheme, Sample};
use common::utils::{bits_to_index, gray_decode, index_to_bits};
use ndarray::Array2;

/// Fixed bit-pattern to complex-point table
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    /// Bits per symbol (mu)
    bits_per_symbol: usize,
    /// Forward table, `points[pattern]`
    points: Vec<Sample>,
    /// Reverse table in forward order, used for nearest-point search
    reverse: Vec<(Sample, BitGroup)>,
}

impl Constellation {
    /// Create a constellation from an explicit table of 2^mu points
    pub fn new(bits_per_symbol: usize, points: Vec<Sample>) -> Result<Self, PhyError> {
        if bits_per_symbol == 0 || bits_per_symbol > 16 {
            return Err(PhyError::ConfigurationError(format!(
                "Unsupported bits per symbol: {}",
                bits_per_symbol
            )));
        }

        let order = 1usize << bits_per_symbol;
        if points.len() != order {
            return Err(PhyError::ConfigurationError(format!(
                "Constellation with {} bits/symbol needs {} points, got {}",
                bits_per_symbol,
                order,
                points.len()
            )));
        }

        for (i, a) in points.iter().enumerate() {
            if !a.re.is_finite() || !a.im.is_finite() {
                return Err(PhyError::ConfigurationError(format!(
                    "Constellation point {} is not finite",
                    i
                )));
            }
            if let Some(j) = points[..i].iter().position(|b| b == a) {
                return Err(PhyError::ConfigurationError(format!(
                    "Constellation points {} and {} are identical",
                    j, i
                )));
            }
        }

        let reverse = points
            .iter()
            .enumerate()
            .map(|(pattern, &point)| (point, index_to_bits(pattern, bits_per_symbol)))
            .collect();

        Ok(Self {
            bits_per_symbol,
            points,
            reverse,
        })
    }

    /// Gray-coded square constellation for a modulation scheme
    ///
    /// The first half of the bit group selects the in-phase level, the second
    /// half the quadrature level. Levels are the odd integers
    /// -(L-1)..=(L-1), unnormalized, so 16-QAM uses {-3, -1, 1, 3}.
    pub fn for_scheme(scheme: ModulationScheme) -> Self {
        let mu = scheme.bits_per_symbol();
        let half = mu / 2;
        let levels = 1usize << half;
        let axis_mask = levels - 1;

        let level = |gray: usize| (2 * gray_decode(gray)) as f64 - (levels - 1) as f64;

        let points = (0..scheme.order())
            .map(|pattern| {
                let i_bits = pattern >> half;
                let q_bits = pattern & axis_mask;
                Sample::new(level(i_bits), level(q_bits))
            })
            .collect();

        Self::new(mu, points).unwrap_or_else(|e| unreachable!("square QAM table is valid: {}", e))
    }

    /// The reference 16-QAM table
    pub fn qam16() -> Self {
        Self::for_scheme(ModulationScheme::Qam16)
    }

    /// Bits per symbol (mu)
    pub fn bits_per_symbol(&self) -> usize {
        self.bits_per_symbol
    }

    /// Number of points (2^mu)
    pub fn order(&self) -> usize {
        self.points.len()
    }

    /// Forward table, indexed by bit pattern value
    pub fn points(&self) -> &[Sample] {
        &self.points
    }

    /// (point, bit group) pairs in table order
    pub fn entries(&self) -> &[(Sample, BitGroup)] {
        &self.reverse
    }

    /// Map one bit group to its constellation point
    pub fn map_bits(&self, group: &[Bit]) -> Result<Sample, PhyError> {
        if group.len() != self.bits_per_symbol {
            return Err(PhyError::InvalidBitGroupError(format!(
                "Expected {} bits, got {}",
                self.bits_per_symbol,
                group.len()
            )));
        }

        if let Some(bad) = group.iter().find(|&&b| b > 1) {
            return Err(PhyError::InvalidBitGroupError(format!(
                "Non-binary value {} in bit group",
                bad
            )));
        }

        Ok(self.points[bits_to_index(group)])
    }

    /// Map every row of a (groups x mu) bit matrix
    pub fn map_groups(&self, groups: &Array2<Bit>) -> Result<Vec<Sample>, PhyError> {
        groups
            .rows()
            .into_iter()
            .map(|row| self.map_bits(&row.to_vec()))
            .collect()
    }

    /// Nearest-point demapping, ties resolved in table order
    pub fn demap(&self, point: Sample) -> BitGroup {
        let mut best = &self.reverse[0];
        let mut best_dist = (point - best.0).norm_sqr();

        for entry in &self.reverse[1..] {
            let dist = (point - entry.0).norm_sqr();
            if dist < best_dist {
                best = entry;
                best_dist = dist;
            }
        }

        best.1.clone()
    }

    /// Demap a block of points into a flat bit stream
    pub fn demap_block(&self, points: &[Sample]) -> Vec<Bit> {
        points.iter().flat_map(|&p| self.demap(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_16qam_table() {
        let qam = Constellation::qam16();
        let expected = [
            ([0, 0, 0, 0], Sample::new(-3.0, -3.0)),
            ([0, 0, 0, 1], Sample::new(-3.0, -1.0)),
            ([0, 0, 1, 0], Sample::new(-3.0, 3.0)),
            ([0, 0, 1, 1], Sample::new(-3.0, 1.0)),
            ([0, 1, 0, 0], Sample::new(-1.0, -3.0)),
            ([0, 1, 0, 1], Sample::new(-1.0, -1.0)),
            ([0, 1, 1, 0], Sample::new(-1.0, 3.0)),
            ([0, 1, 1, 1], Sample::new(-1.0, 1.0)),
            ([1, 0, 0, 0], Sample::new(3.0, -3.0)),
            ([1, 0, 0, 1], Sample::new(3.0, -1.0)),
            ([1, 0, 1, 0], Sample::new(3.0, 3.0)),
            ([1, 0, 1, 1], Sample::new(3.0, 1.0)),
            ([1, 1, 0, 0], Sample::new(1.0, -3.0)),
            ([1, 1, 0, 1], Sample::new(1.0, -1.0)),
            ([1, 1, 1, 0], Sample::new(1.0, 3.0)),
            ([1, 1, 1, 1], Sample::new(1.0, 1.0)),
        ];

        for (bits, point) in expected {
            assert_eq!(qam.map_bits(&bits).unwrap(), point, "bits {:?}", bits);
        }

        let points: Vec<Sample> = expected.iter().map(|(_, p)| *p).collect();
        assert_eq!(qam.points(), points.as_slice());
    }

    #[test]
    fn test_map_demap_all_patterns() {
        for scheme in [ModulationScheme::Qpsk, ModulationScheme::Qam16, ModulationScheme::Qam64] {
            let table = Constellation::for_scheme(scheme);
            assert_eq!(table.order(), scheme.order());

            for pattern in 0..table.order() {
                let bits = index_to_bits(pattern, table.bits_per_symbol());
                let point = table.map_bits(&bits).unwrap();
                assert_eq!(table.demap(point), bits, "{} pattern {}", scheme, pattern);
            }
        }
    }

    #[test]
    fn test_demap_nearest_point() {
        let qam = Constellation::qam16();
        assert_eq!(qam.demap(Sample::new(2.6, 3.4)), vec![1, 0, 1, 0]);
        assert_eq!(qam.demap(Sample::new(-0.8, 0.9)), vec![0, 1, 1, 1]);
        assert_eq!(qam.demap(Sample::new(-10.0, -10.0)), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_demap_tie_uses_table_order() {
        // Origin is equidistant from the four inner points; (0,1,0,1) comes first
        let qam = Constellation::qam16();
        assert_eq!(qam.demap(Sample::new(0.0, 0.0)), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_invalid_bit_groups() {
        let qam = Constellation::qam16();
        assert!(matches!(qam.map_bits(&[1, 0, 1]), Err(PhyError::InvalidBitGroupError(_))));
        assert!(matches!(qam.map_bits(&[1, 0, 1, 0, 1]), Err(PhyError::InvalidBitGroupError(_))));
        assert!(matches!(qam.map_bits(&[1, 0, 2, 0]), Err(PhyError::InvalidBitGroupError(_))));
    }

    #[test]
    fn test_custom_table_validation() {
        let bpsk = Constellation::new(1, vec![Sample::new(-1.0, 0.0), Sample::new(1.0, 0.0)]).unwrap();
        assert_eq!(bpsk.map_bits(&[1]).unwrap(), Sample::new(1.0, 0.0));

        let short = Constellation::new(2, vec![Sample::new(1.0, 0.0); 3]);
        assert!(matches!(short, Err(PhyError::ConfigurationError(_))));

        let duplicate = Constellation::new(1, vec![Sample::new(1.0, 0.0), Sample::new(1.0, 0.0)]);
        assert!(matches!(duplicate, Err(PhyError::ConfigurationError(_))));
    }

    #[test]
    fn test_map_groups() {
        let qam = Constellation::qam16();
        let groups = Array2::from_shape_vec((2, 4), vec![1, 0, 1, 0, 0, 0, 0, 0]).unwrap();
        let points = qam.map_groups(&groups).unwrap();
        assert_eq!(points, vec![Sample::new(3.0, 3.0), Sample::new(-3.0, -3.0)]);
        assert_eq!(qam.demap_block(&points), vec![1, 0, 1, 0, 0, 0, 0, 0]);
    }
}
