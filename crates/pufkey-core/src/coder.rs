//! Concatenated coder: extended Golay (24,12) outer code wrapped around an
//! 11× repetition inner code.
//!
//! Encoding expands a secret 22×: 48 secret bits → 96 outer-coded bits →
//! 1056 transmitted bits for the default 6-byte secret. The two stages
//! compose rather than add their tolerances — the repetition layer must
//! resolve each bit correctly before the Golay layer sees a block within its
//! 3-error radius, otherwise outer decoding fails even though every inner
//! vote produced a definite (wrong) bit.

use serde::Serialize;

use crate::bitvec::BitVec;
use crate::error::{Error, Result};
use crate::{golay, repetition};

/// Default secret length in bytes (48 bits).
pub const DEFAULT_SECRET_LEN: usize = 6;

/// Error-correction bookkeeping from a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Bits overruled by the repetition majority votes.
    pub inner_corrected: usize,
    /// Bits corrected across all Golay blocks.
    pub outer_corrected: usize,
}

/// Result of decoding a (possibly noisy) codeword.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The recovered secret bytes.
    pub secret: Vec<u8>,
    /// How much correction each stage performed.
    pub stats: DecodeStats,
}

/// Encoder/decoder for secrets of a fixed byte length.
///
/// The secret's bit expansion is split into 12-bit groups; when `8 · len` is
/// not a multiple of 12 the last group is zero-padded. The pad length is
/// implied by the configured secret length, which is how `decode` strips it
/// exactly — the one sanctioned pad in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatenatedCoder {
    secret_len: usize,
}

impl Default for ConcatenatedCoder {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_LEN)
    }
}

impl ConcatenatedCoder {
    /// Coder for secrets of `secret_len` bytes.
    pub fn new(secret_len: usize) -> Self {
        Self { secret_len }
    }

    /// Configured secret length in bytes.
    pub fn secret_len(&self) -> usize {
        self.secret_len
    }

    /// Number of 12-bit groups the secret expands to.
    fn groups(&self) -> usize {
        (self.secret_len * 8).div_ceil(golay::DATA_BITS)
    }

    /// Bit length of the fully encoded codeword:
    /// `ceil(8·len / 12) · 24 · 11`.
    pub fn codeword_bits(&self) -> usize {
        self.groups() * golay::CODE_BITS * repetition::REPEAT
    }

    /// Encode a secret into its noise-tolerant codeword.
    pub fn encode(&self, secret: &[u8]) -> Result<BitVec> {
        if secret.len() != self.secret_len {
            return Err(Error::LengthMismatch {
                left: secret.len() * 8,
                right: self.secret_len * 8,
            });
        }

        let bits = BitVec::from_bytes(secret);
        let mut padded = bits.as_slice().to_vec();
        padded.resize(self.groups() * golay::DATA_BITS, 0);

        let mut outer = Vec::with_capacity(self.groups() * golay::CODE_BITS);
        for group in padded.chunks(golay::DATA_BITS) {
            let mut data = 0u16;
            for &bit in group {
                data = (data << 1) | u16::from(bit);
            }
            let code = golay::encode(data);
            for shift in (0..golay::CODE_BITS).rev() {
                outer.push(((code >> shift) & 1) as u8);
            }
        }

        Ok(BitVec::from_bits(repetition::encode(&outer)))
    }

    /// Decode a codeword back to the secret, failing on the first outer block
    /// that exceeds the correction radius.
    pub fn decode(&self, codeword: &BitVec) -> Result<Decoded> {
        let expected = self.codeword_bits();
        if codeword.len() != expected {
            return Err(Error::LengthMismatch {
                left: codeword.len(),
                right: expected,
            });
        }

        let (outer, inner_corrected) = repetition::decode(codeword.as_slice())?;

        let mut secret_bits = Vec::with_capacity(self.groups() * golay::DATA_BITS);
        let mut outer_corrected = 0;
        for (index, block) in outer.chunks(golay::CODE_BITS).enumerate() {
            let mut word = 0u32;
            for &bit in block {
                word = (word << 1) | u32::from(bit);
            }
            let (data, corrected) =
                golay::decode(word).ok_or(Error::UncorrectableBlock { block: index })?;
            outer_corrected += corrected;
            for shift in (0..golay::DATA_BITS).rev() {
                secret_bits.push(((data >> shift) & 1) as u8);
            }
        }

        // Strip the zero pad implied by the configured secret length.
        secret_bits.truncate(self.secret_len * 8);
        let secret = BitVec::from_bits(secret_bits).to_bytes()?;

        Ok(Decoded {
            secret,
            stats: DecodeStats {
                inner_corrected,
                outer_corrected,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random bytes for test vectors.
    fn lcg_bytes(n: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn default_codeword_is_1056_bits() {
        let coder = ConcatenatedCoder::default();
        assert_eq!(coder.codeword_bits(), 1056);
        let codeword = coder.encode(&[0x5A; 6]).unwrap();
        assert_eq!(codeword.len(), 1056);
    }

    #[test]
    fn round_trip_without_noise() {
        for len in [1, 3, 6, 8, 16] {
            let coder = ConcatenatedCoder::new(len);
            let secret = lcg_bytes(len, 0x5eed + len as u64);
            let codeword = coder.encode(&secret).unwrap();
            let decoded = coder.decode(&codeword).unwrap();
            assert_eq!(decoded.secret, secret, "len {len}");
            assert_eq!(decoded.stats.inner_corrected, 0);
            assert_eq!(decoded.stats.outer_corrected, 0);
        }
    }

    #[test]
    fn odd_secret_length_pads_and_strips_exactly() {
        // 5 bytes = 40 bits → four 12-bit groups with 8 pad bits.
        let coder = ConcatenatedCoder::new(5);
        assert_eq!(coder.codeword_bits(), 4 * 24 * 11);
        let secret = [0xDE, 0xAD, 0xBE, 0xEF, 0x01];
        let decoded = coder.decode(&coder.encode(&secret).unwrap()).unwrap();
        assert_eq!(decoded.secret, secret);
    }

    #[test]
    fn wrong_secret_length_is_rejected() {
        let coder = ConcatenatedCoder::new(6);
        assert!(matches!(
            coder.encode(&[0u8; 5]),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn wrong_codeword_length_is_rejected() {
        let coder = ConcatenatedCoder::new(6);
        let codeword = BitVec::from_bits(vec![0; 1055]);
        assert!(matches!(
            coder.decode(&codeword),
            Err(Error::LengthMismatch { left: 1055, right: 1056 })
        ));
    }

    #[test]
    fn scattered_noise_within_tolerance_is_corrected() {
        let coder = ConcatenatedCoder::default();
        let secret = lcg_bytes(6, 77);
        let codeword = coder.encode(&secret).unwrap();

        // Flip 3 bits in every 11-bit repetition group: far below the inner
        // radius, so the outer layer sees a clean stream.
        let mut noisy = codeword.as_slice().to_vec();
        for group in 0..(noisy.len() / repetition::REPEAT) {
            for k in 0..3 {
                noisy[group * repetition::REPEAT + k * 3] ^= 1;
            }
        }
        let decoded = coder.decode(&BitVec::from_bits(noisy)).unwrap();
        assert_eq!(decoded.secret, secret);
        assert_eq!(decoded.stats.inner_corrected, 96 * 3);
        assert_eq!(decoded.stats.outer_corrected, 0);
    }

    #[test]
    fn overwhelmed_inner_groups_cascade_to_the_outer_stage() {
        let coder = ConcatenatedCoder::default();
        let secret = lcg_bytes(6, 13);
        let codeword = coder.encode(&secret).unwrap();

        // Wipe out 6 of the 11 copies for four bits of the first outer block:
        // four wrong majority votes exceed the Golay radius.
        let mut noisy = codeword.as_slice().to_vec();
        for bit in 0..4 {
            for copy in 0..6 {
                noisy[bit * repetition::REPEAT + copy] ^= 1;
            }
        }
        assert!(matches!(
            coder.decode(&BitVec::from_bits(noisy)),
            Err(Error::UncorrectableBlock { block: 0 })
        ));
    }

    #[test]
    fn three_wrong_votes_per_block_still_recover() {
        let coder = ConcatenatedCoder::default();
        let secret = lcg_bytes(6, 99);
        let codeword = coder.encode(&secret).unwrap();

        // Three fully flipped repetition groups inside one outer block: the
        // inner layer resolves them wrong, the outer layer corrects them.
        let mut noisy = codeword.as_slice().to_vec();
        for bit in [0usize, 5, 17] {
            for copy in 0..repetition::REPEAT {
                noisy[bit * repetition::REPEAT + copy] ^= 1;
            }
        }
        let decoded = coder.decode(&BitVec::from_bits(noisy)).unwrap();
        assert_eq!(decoded.secret, secret);
        assert_eq!(decoded.stats.outer_corrected, 3);
    }
}
