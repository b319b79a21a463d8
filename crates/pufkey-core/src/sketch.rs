//! XOR secure sketch: helper-data generation and its inverse.
//!
//! `commit` masks a codeword with the enrollment reference; `open` unmasks it
//! with a fresh reading. Because XOR is its own inverse, the positions where
//! the fresh reading differs from the enrollment reference become exactly the
//! bit errors in the recovered codeword — physical noise translates 1:1 into
//! channel errors for the concatenated coder, which is the whole correctness
//! argument for sizing the code against the measured bit-error rate.
//!
//! The helper data is public. It reveals nothing about the secret beyond the
//! structure of the fixed code, provided the reference has enough min-entropy
//! (which `stats::min_entropy` exists to check).

use crate::bitvec::BitVec;
use crate::error::Result;

/// Helper data: `codeword XOR reference`. Equal lengths required.
pub fn commit(codeword: &BitVec, reference: &BitVec) -> Result<BitVec> {
    codeword.xor(reference)
}

/// Recover a (noisy) codeword: `helper XOR reference'`. Equal lengths
/// required; otherwise pure and infallible.
pub fn open(helper: &BitVec, reference: &BitVec) -> Result<BitVec> {
    helper.xor(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn bits(pattern: &[u8]) -> BitVec {
        BitVec::from_bits(pattern.to_vec())
    }

    #[test]
    fn open_with_same_reference_restores_codeword() {
        let codeword = bits(&[1, 0, 1, 1, 0, 0, 1, 0]);
        let reference = bits(&[0, 1, 1, 0, 1, 0, 0, 1]);
        let helper = commit(&codeword, &reference).unwrap();
        assert_eq!(open(&helper, &reference).unwrap(), codeword);
    }

    #[test]
    fn inverse_law_injects_reference_difference() {
        // open(commit(c, a), b) == c XOR (a XOR b)
        let codeword = bits(&[1, 1, 0, 0, 1, 0, 1, 0]);
        let ref_a = bits(&[0, 0, 1, 1, 0, 1, 0, 1]);
        let ref_b = bits(&[0, 1, 1, 1, 0, 0, 0, 1]);

        let opened = open(&commit(&codeword, &ref_a).unwrap(), &ref_b).unwrap();
        let expected = codeword.xor(&ref_a.xor(&ref_b).unwrap()).unwrap();
        assert_eq!(opened, expected);
    }

    #[test]
    fn noise_count_equals_injected_error_count() {
        let codeword = bits(&[0; 16]);
        let ref_a = bits(&[0; 16]);
        let mut noisy = vec![0u8; 16];
        noisy[2] = 1;
        noisy[9] = 1;
        let ref_b = bits(&noisy);

        let helper = commit(&codeword, &ref_a).unwrap();
        let recovered = open(&helper, &ref_b).unwrap();
        let errors = recovered.xor(&codeword).unwrap();
        assert_eq!(errors.as_slice().iter().filter(|&&b| b == 1).count(), 2);
    }

    #[test]
    fn length_mismatch_is_fatal_not_truncated() {
        let codeword = bits(&[1, 0, 1]);
        let reference = bits(&[1, 0]);
        assert!(matches!(
            commit(&codeword, &reference),
            Err(Error::LengthMismatch { left: 3, right: 2 })
        ));
    }
}
