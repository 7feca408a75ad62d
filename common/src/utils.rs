//! Common Utilities
//!
//! Provides utility functions used across the signal chain

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::types::{Bit, Sample};

/// Convert a byte slice to hex string for debugging
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render bits as a compact "0101..." string
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}

/// Pack bits into bytes (MSB first), the last byte is zero padded
pub fn pack_bits(bits: &[Bit]) -> Bytes {
    let mut bytes = BytesMut::with_capacity((bits.len() + 7) / 8);

    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit != 0 {
                byte |= 1 << (7 - i);
            }
        }
        bytes.put_u8(byte);
    }

    bytes.freeze()
}

/// Integer value of a bit group, MSB first
pub fn bits_to_index(bits: &[Bit]) -> usize {
    bits.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize)
}

/// Expand an integer into `width` bits, MSB first
pub fn index_to_bits(value: usize, width: usize) -> Vec<Bit> {
    (0..width)
        .rev()
        .map(|shift| ((value >> shift) & 1) as Bit)
        .collect()
}

/// Convert a Gray-coded value back to its binary rank
pub fn gray_decode(mut gray: usize) -> usize {
    let mut binary = gray;
    while gray > 0 {
        gray >>= 1;
        binary ^= gray;
    }
    binary
}

/// Convert a dB value to a linear power ratio
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Convert a linear power ratio to dB
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Average power (mean of |x|^2) of a sample buffer
pub fn mean_power(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let power = samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64;

    trace!("Mean power of {} samples: {:.6}", samples.len(), power);

    power
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_hex() {
        let data = vec![0x12, 0x34, 0xAB, 0xCD];
        assert_eq!(bytes_to_hex(&data), "12 34 ab cd");
    }

    #[test]
    fn test_bit_packing() {
        let bits = vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 1];
        let packed = pack_bits(&bits);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[0], 0xAA); // 10101010
        assert_eq!(packed[1], 0xC0); // 11 + padding
    }

    #[test]
    fn test_bits_to_string() {
        assert_eq!(bits_to_string(&[1, 0, 0, 1]), "1001");
        assert_eq!(bits_to_string(&[]), "");
    }

    #[test]
    fn test_bit_index_conversion() {
        assert_eq!(bits_to_index(&[1, 0, 1, 0]), 10);
        assert_eq!(index_to_bits(10, 4), vec![1, 0, 1, 0]);
        assert_eq!(index_to_bits(1, 6), vec![0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_gray_decode() {
        // 2-bit Gray sequence 00, 01, 11, 10
        assert_eq!(gray_decode(0b00), 0);
        assert_eq!(gray_decode(0b01), 1);
        assert_eq!(gray_decode(0b11), 2);
        assert_eq!(gray_decode(0b10), 3);
        assert_eq!(gray_decode(0b100), 7);
    }

    #[test]
    fn test_db_conversion() {
        assert!((db_to_linear(10.0) - 10.0).abs() < 1e-12);
        assert!((db_to_linear(-20.0) - 0.01).abs() < 1e-12);
        assert!((linear_to_db(100.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_power() {
        let samples = vec![Sample::new(1.0, 1.0), Sample::new(0.0, 2.0)];
        assert!((mean_power(&samples) - 3.0).abs() < 1e-12);
        assert_eq!(mean_power(&[]), 0.0);
    }
}
