//! # pufkey-core
//!
//! **Stable cryptographic keys from SRAM power-up noise.**
//!
//! `pufkey-core` is a fuzzy extractor for SRAM-based physically unclonable
//! functions. Transistor variation makes each chip's uninitialized memory
//! pattern device-unique — but noisy. This crate turns that pattern into a
//! reproducible secret: a concatenated error-correcting code (extended Golay
//! (24,12) outer, 11× repetition inner) encodes a random secret, and public
//! helper data — codeword XOR reference — lets the same device recover the
//! exact secret from a fresh, noisy reading.
//!
//! ## Quick Start
//!
//! ```
//! use pufkey_core::{enroll, reconstruct};
//!
//! // Enrollment: repeated power-up readings of the same device.
//! let readings: Vec<Vec<u8>> = vec![vec![0x5A; 132]; 3];
//! let enrollment = enroll(&readings, 6).unwrap();
//!
//! // Later, much later: one fresh (noisy) reading plus the stored helper
//! // data reproduces the identical key.
//! let rec = reconstruct(&readings[0], &enrollment.helper, 6).unwrap();
//! assert_eq!(rec.key, enrollment.key);
//! ```
//!
//! ## Architecture
//!
//! Readings → Estimator (majority vote) → Reference
//! Secret → ConcatenatedCoder → Codeword
//! (Codeword, Reference) → Sketch → HelperData
//!
//! Reconstruction runs the arrows backwards: helper XOR fresh reading gives a
//! noisy codeword, the coder corrects it, and re-encoding recovers the exact
//! enrollment reference, which is hashed into the key.
//!
//! Every operation is a pure function over immutable bit-vectors — nothing
//! here blocks, and independent enrollments parallelize trivially. The only
//! blocking concern, power-cycling the physical device, sits behind the
//! [`transport::DeviceLink`] seam.
//!
//! The [`stats`] module carries the instruments used to justify the scheme:
//! min-entropy of references across devices (unpredictability) and bit-error
//! rate across readings of one device (noise the code must absorb).

pub mod bitvec;
pub mod coder;
pub mod error;
pub mod estimator;
pub mod extractor;
pub mod golay;
pub mod protocol;
pub mod repetition;
pub mod sketch;
pub mod stats;
pub mod transport;

pub use bitvec::BitVec;
pub use coder::{ConcatenatedCoder, DEFAULT_SECRET_LEN, DecodeStats, Decoded};
pub use error::{Error, Result};
pub use estimator::{ReferenceEstimate, estimate};
pub use extractor::{Enrollment, KEY_LEN, Reconstruction, enroll, reconstruct};
pub use stats::{
    BitProbability, MinEntropyReport, PairwiseReport, bit_error_rate, bit_probability,
    compression_ratio, hamming_distance, min_entropy, pairwise_analysis,
};
pub use transport::{DeviceLink, acquire, read_response, write_helper};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
