//! Rate-1/11 repetition code — the inner half of the concatenated coder.
//!
//! Each bit is replicated 11 times consecutively; decoding is a majority vote
//! per 11-bit group. The repeat count is odd, so a vote can never tie: this
//! layer always yields a definite bit. Up to 5 flips per group are absorbed;
//! 6 or more flip the majority and hand the outer code a wrong bit.

use crate::error::{Error, Result};

/// Repeat factor. Odd by construction of the code.
pub const REPEAT: usize = 11;

/// Flips per group that majority voting still corrects: floor((REPEAT-1)/2).
pub const CORRECTION_RADIUS: usize = (REPEAT - 1) / 2;

/// Replicate every input bit `REPEAT` times.
pub fn encode(bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len() * REPEAT);
    for &bit in bits {
        for _ in 0..REPEAT {
            out.push(bit & 1);
        }
    }
    out
}

/// Majority-decode groups of `REPEAT` bits.
///
/// Returns the decoded bits and the total number of minority bits overruled
/// (the flips this layer corrected, assuming each vote came out right).
pub fn decode(bits: &[u8]) -> Result<(Vec<u8>, usize)> {
    if bits.len() % REPEAT != 0 {
        return Err(Error::InvalidBlockLength {
            len: bits.len(),
            block: REPEAT,
        });
    }
    let mut out = Vec::with_capacity(bits.len() / REPEAT);
    let mut corrected = 0;
    for group in bits.chunks(REPEAT) {
        let ones = group.iter().filter(|&&b| b & 1 == 1).count();
        let bit = u8::from(ones > REPEAT / 2);
        corrected += if bit == 1 { REPEAT - ones } else { ones };
        out.push(bit);
    }
    Ok((out, corrected))
}
