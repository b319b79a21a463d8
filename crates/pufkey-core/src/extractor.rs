//! Enrollment and reconstruction drivers — the fuzzy extractor proper.
//!
//! Enrollment: majority-vote a reference from repeated readings, draw a fresh
//! secret from the OS CSPRNG, encode it, and mask the codeword with the
//! reference to produce public helper data. The derived key is a SHA-256
//! digest of the reference, not of the secret: reconstruction recovers the
//! same reference by re-encoding the decoded secret and unmasking the helper,
//! so both sides agree bit-for-bit whenever decoding succeeds.
//!
//! Reconstruction deliberately takes a *single* fresh reading rather than a
//! majority-voted set — the deployed device gets exactly one power-up pattern
//! before the memory is used, and the code's tolerance is sized for that.
//!
//! The secret itself is transient: held in zeroizing buffers, never returned,
//! never persisted.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::bitvec::BitVec;
use crate::coder::{ConcatenatedCoder, DecodeStats};
use crate::error::{Error, Result};
use crate::estimator::{self, ReferenceEstimate};
use crate::sketch;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// Output of a successful enrollment.
#[derive(Debug, Clone)]
pub struct Enrollment {
    /// Public helper data, same bit length as the reference.
    pub helper: BitVec,
    /// The derived device key.
    pub key: [u8; KEY_LEN],
    /// Reference estimate, kept for quality reporting.
    pub estimate: ReferenceEstimate,
}

/// Output of a successful reconstruction.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The re-derived device key. Matches the enrollment key exactly.
    pub key: [u8; KEY_LEN],
    /// Correction effort per coding stage.
    pub stats: DecodeStats,
    /// Bit positions where the fresh reading disagreed with the enrollment
    /// reference — the physical noise of this power cycle.
    pub noise_bits: usize,
}

/// Enroll a device: `measurements` are repeated power-up readings whose byte
/// length must match the codeword length for `secret_len` (33 bytes per
/// 12-bit group; 132 bytes for the 6-byte default).
pub fn enroll(measurements: &[Vec<u8>], secret_len: usize) -> Result<Enrollment> {
    let coder = ConcatenatedCoder::new(secret_len);
    let estimate = estimator::estimate(measurements)?;
    if estimate.reference.len() != coder.codeword_bits() {
        return Err(Error::LengthMismatch {
            left: estimate.reference.len(),
            right: coder.codeword_bits(),
        });
    }

    let mut secret = Zeroizing::new(vec![0u8; secret_len]);
    getrandom::fill(&mut secret).expect("OS CSPRNG failed");

    let codeword = coder.encode(&secret)?;
    let helper = sketch::commit(&codeword, &estimate.reference)?;
    let key = derive_key(&estimate.reference)?;

    log::info!(
        "enrolled: {} helper bits, {} unstable reference bits",
        helper.len(),
        estimate.unstable_positions()
    );

    Ok(Enrollment {
        helper,
        key,
        estimate,
    })
}

/// Reconstruct the key from one fresh reading and the stored helper data.
pub fn reconstruct(reading: &[u8], helper: &BitVec, secret_len: usize) -> Result<Reconstruction> {
    let coder = ConcatenatedCoder::new(secret_len);
    let reference = BitVec::from_bytes(reading);

    let noisy_codeword = sketch::open(helper, &reference)?;
    let decoded = coder.decode(&noisy_codeword)?;
    let secret = Zeroizing::new(decoded.secret);

    // Re-encode the recovered secret and unmask the helper with it: that is
    // the enrollment reference, provided decoding corrected every error.
    let clean_codeword = coder.encode(&secret)?;
    let corrected_reference = sketch::open(helper, &clean_codeword)?;
    let key = derive_key(&corrected_reference)?;

    let noise = reference.xor(&corrected_reference)?;
    let noise_bits = noise.as_slice().iter().filter(|&&b| b == 1).count();

    log::debug!(
        "reconstructed: {} noisy bits, inner corrected {}, outer corrected {}",
        noise_bits,
        decoded.stats.inner_corrected,
        decoded.stats.outer_corrected
    );

    Ok(Reconstruction {
        key,
        stats: decoded.stats,
        noise_bits,
    })
}

/// SHA-256 of the packed reference bits.
fn derive_key(reference: &BitVec) -> Result<[u8; KEY_LEN]> {
    let bytes = Zeroizing::new(reference.to_bytes()?);
    let digest = Sha256::digest(bytes.as_slice());
    Ok(digest.into())
}
