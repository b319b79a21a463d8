//! Error type shared by every fallible operation in the crate.
//!
//! All variants are local, recoverable-by-caller conditions. The library never
//! panics on malformed input and never truncates or pads silently: any length
//! or framing inconsistency surfaces here instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions of the extractor pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Two bit-vectors that must have equal length do not.
    #[error("bit-vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The reference estimator was given zero measurements.
    #[error("no measurements supplied")]
    EmptyMeasurementSet,

    /// Input to a codec stage is not a whole number of blocks.
    #[error("input length {len} is not a multiple of the {block}-bit block size")]
    InvalidBlockLength { len: usize, block: usize },

    /// An outer-code block is outside the correction radius of every valid
    /// codeword, or equidistant to several.
    #[error("block {block} is outside the outer-code correction radius")]
    UncorrectableBlock { block: usize },

    /// The transport could not produce a complete, well-formed measurement.
    #[error("measurement acquisition failed: {0}")]
    AcquisitionFailure(String),

    /// I/O error from the device link.
    #[error("device i/o error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_lengths() {
        let e = Error::LengthMismatch { left: 1056, right: 1055 };
        assert_eq!(e.to_string(), "bit-vector length mismatch: 1056 vs 1055");
    }

    #[test]
    fn display_names_the_block() {
        let e = Error::UncorrectableBlock { block: 3 };
        assert!(e.to_string().contains("block 3"));
    }
}
