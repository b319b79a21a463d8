//! Maximum-likelihood reference estimation from repeated noisy measurements.
//!
//! Each SRAM power-up reading is a byte array; across N readings the per-bit
//! one-probability `p1 = ones / N` is estimated, and the reference bit is the
//! majority value. The binarization is a strict `p1 > 0.5`: an exact tie
//! resolves to 0. That tie-break is fixed and load-bearing — enrollment and
//! any later re-estimation must agree on it.

use serde::Serialize;

use crate::bitvec::BitVec;
use crate::error::{Error, Result};

/// Reference bit-vector plus the per-bit probability estimates behind it.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceEstimate {
    /// Majority value per bit position.
    #[serde(skip)]
    pub reference: BitVec,
    /// Estimated probability of reading a 1 at each position.
    pub p1: Vec<f64>,
}

impl ReferenceEstimate {
    /// Positions whose estimate is not saturated at 0 or 1 — the unstable
    /// bits the error-correcting code exists to absorb.
    pub fn unstable_positions(&self) -> usize {
        self.p1.iter().filter(|&&p| p > 0.0 && p < 1.0).count()
    }
}

/// Estimate the reference from `measurements`, all of identical byte length.
pub fn estimate(measurements: &[Vec<u8>]) -> Result<ReferenceEstimate> {
    let Some(first) = measurements.first() else {
        return Err(Error::EmptyMeasurementSet);
    };
    let bit_len = first.len() * 8;

    let mut ones = vec![0u32; bit_len];
    for measurement in measurements {
        if measurement.len() != first.len() {
            return Err(Error::LengthMismatch {
                left: measurement.len() * 8,
                right: bit_len,
            });
        }
        for (i, bit) in BitVec::from_bytes(measurement).as_slice().iter().enumerate() {
            ones[i] += u32::from(*bit);
        }
    }

    let n = measurements.len() as f64;
    let p1: Vec<f64> = ones.iter().map(|&c| f64::from(c) / n).collect();
    let bits: Vec<u8> = p1.iter().map(|&p| u8::from(p > 0.5)).collect();

    Ok(ReferenceEstimate {
        reference: BitVec::from_bits(bits),
        p1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_of_three_measurements() {
        // Bit 0 histories [1,1,0] and [1,0,0] across the three readings.
        let measurements = vec![vec![0b1100_0000], vec![0b1000_0000], vec![0b0000_0000]];
        let est = estimate(&measurements).unwrap();
        assert_eq!(est.reference[0], 1); // p1 = 2/3
        assert_eq!(est.reference[1], 0); // p1 = 1/3
        assert!((est.p1[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn exact_tie_resolves_to_zero() {
        let measurements = vec![vec![0xFF], vec![0x00]];
        let est = estimate(&measurements).unwrap();
        assert!(est.reference.as_slice().iter().all(|&b| b == 0));
        assert!(est.p1.iter().all(|&p| p == 0.5));
    }

    #[test]
    fn single_measurement_is_its_own_reference() {
        let est = estimate(&[vec![0xA5, 0x3C]]).unwrap();
        assert_eq!(est.reference.to_bytes().unwrap(), vec![0xA5, 0x3C]);
        assert_eq!(est.unstable_positions(), 0);
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(estimate(&[]), Err(Error::EmptyMeasurementSet)));
    }

    #[test]
    fn ragged_measurements_are_rejected() {
        let measurements = vec![vec![0u8; 4], vec![0u8; 3]];
        assert!(matches!(
            estimate(&measurements),
            Err(Error::LengthMismatch { left: 24, right: 32 })
        ));
    }

    #[test]
    fn unstable_positions_counts_non_saturated_bits() {
        let measurements = vec![vec![0b1010_0000], vec![0b1000_0000], vec![0b1010_0000]];
        let est = estimate(&measurements).unwrap();
        // Only bit 2 varies across readings.
        assert_eq!(est.unstable_positions(), 1);
    }
}
