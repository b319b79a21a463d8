//! Statistical instruments for validating the extractor's two promises:
//! unpredictability of the reference (min-entropy across devices) and bounded
//! noise of the source (bit-error rate across repeated readings of one
//! device).
//!
//! Every function takes a set of equal-length bit-vectors; ragged input is a
//! `LengthMismatch` and an empty set is `EmptyMeasurementSet` — statistics
//! over zero vectors are meaningless and must not be produced.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::Serialize;
use std::io::Write;

use crate::bitvec::BitVec;
use crate::error::{Error, Result};

/// Per-position probabilities of reading 0 and 1 across a vector set.
#[derive(Debug, Clone, Serialize)]
pub struct BitProbability {
    pub p0: Vec<f64>,
    pub p1: Vec<f64>,
}

/// Min-entropy of a vector set, absolute and relative to the bit length.
///
/// Per position `h_i = -log2(max(p0_i, p1_i))`: 1 bit where a position is a
/// fair coin (`p1 = 0.5`), 0 bits where it is deterministic. The sum measures
/// the worst-case guessing cost of an adversary who always picks the majority
/// value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MinEntropyReport {
    /// Total min-entropy in bits.
    pub absolute_bits: f64,
    /// Min-entropy as a percentage of the vector bit length.
    pub relative_percent: f64,
}

/// Distance profile of one vector against every other vector in the set.
#[derive(Debug, Clone, Serialize)]
pub struct VectorDistances {
    pub index: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Five-number summary over a sequence of per-vector statistics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Pairwise Hamming analysis over a set of bit-vectors.
///
/// For inter-device uniqueness the per-vector means should sit near half the
/// bit length; exact-duplicate pairs are listed because they defeat the whole
/// scheme and deserve more than a statistic.
#[derive(Debug, Clone, Serialize)]
pub struct PairwiseReport {
    pub vectors: Vec<VectorDistances>,
    pub over_means: Summary,
    pub over_medians: Summary,
    pub over_std_devs: Summary,
    /// Index pairs with distance zero.
    pub duplicates: Vec<(usize, usize)>,
}

/// Fraction of 1-bits (and its complement) at each position.
pub fn bit_probability(vectors: &[BitVec]) -> Result<BitProbability> {
    let bit_len = check_set(vectors)?;

    let mut ones = vec![0u32; bit_len];
    for v in vectors {
        for (i, &bit) in v.as_slice().iter().enumerate() {
            ones[i] += u32::from(bit);
        }
    }
    let n = vectors.len() as f64;
    let p1: Vec<f64> = ones.iter().map(|&c| f64::from(c) / n).collect();
    let p0: Vec<f64> = p1.iter().map(|&p| 1.0 - p).collect();
    Ok(BitProbability { p0, p1 })
}

/// Min-entropy across the set, per the majority-guessing adversary model.
pub fn min_entropy(vectors: &[BitVec]) -> Result<MinEntropyReport> {
    let prob = bit_probability(vectors)?;
    let absolute_bits: f64 = prob
        .p0
        .iter()
        .zip(&prob.p1)
        .map(|(&p0, &p1)| -p0.max(p1).log2())
        .sum();
    let relative_percent = 100.0 * absolute_bits / prob.p1.len() as f64;
    Ok(MinEntropyReport {
        absolute_bits,
        relative_percent,
    })
}

/// Average instability of the source, in percent of the bit length.
///
/// Positions that always read the same value contribute nothing; a position
/// that flips contributes its minority probability. This is the number the
/// error-correcting code's tolerance is sized against.
pub fn bit_error_rate(vectors: &[BitVec]) -> Result<f64> {
    let prob = bit_probability(vectors)?;
    let total: f64 = prob
        .p1
        .iter()
        .filter(|&&p1| p1 > 0.0 && p1 < 1.0)
        .map(|&p1| p1.min(1.0 - p1))
        .sum();
    Ok(100.0 * total / prob.p1.len() as f64)
}

/// Count of differing positions between two equal-length vectors.
pub fn hamming_distance(a: &BitVec, b: &BitVec) -> Result<usize> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.as_slice()
        .iter()
        .zip(b.as_slice())
        .filter(|(x, y)| x != y)
        .count())
}

/// Pairwise distance analysis across the set. Needs at least two vectors —
/// a single vector has no pairs to measure.
pub fn pairwise_analysis(vectors: &[BitVec]) -> Result<PairwiseReport> {
    check_set(vectors)?;
    if vectors.len() < 2 {
        return Err(Error::EmptyMeasurementSet);
    }

    let mut rows = Vec::with_capacity(vectors.len());
    let mut duplicates = Vec::new();

    for (i, a) in vectors.iter().enumerate() {
        let mut distances = Vec::with_capacity(vectors.len() - 1);
        for (j, b) in vectors.iter().enumerate() {
            if i == j {
                continue;
            }
            let d = hamming_distance(a, b)?;
            if d == 0 && i < j {
                duplicates.push((i, j));
            }
            distances.push(d);
        }
        let as_f64: Vec<f64> = distances.iter().map(|&d| d as f64).collect();
        rows.push(VectorDistances {
            index: i,
            min: *distances.iter().min().unwrap(),
            max: *distances.iter().max().unwrap(),
            mean: mean(&as_f64),
            median: median(&as_f64),
            std_dev: std_dev(&as_f64),
        });
    }

    let means: Vec<f64> = rows.iter().map(|r| r.mean).collect();
    let medians: Vec<f64> = rows.iter().map(|r| r.median).collect();
    let std_devs: Vec<f64> = rows.iter().map(|r| r.std_dev).collect();

    Ok(PairwiseReport {
        over_means: summarize(&means),
        over_medians: summarize(&medians),
        over_std_devs: summarize(&std_devs),
        vectors: rows,
        duplicates,
    })
}

/// zlib level-9 compression ratio of raw measurement bytes. Lower means more
/// structure — a sanity proxy alongside the bit-level statistics.
pub fn compression_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
    if enc.write_all(data).is_err() {
        return 0.0;
    }
    match enc.finish() {
        Ok(c) => c.len() as f64 / data.len() as f64,
        Err(_) => 0.0,
    }
}

/// Validate non-empty, equal-length input; returns the common bit length.
fn check_set(vectors: &[BitVec]) -> Result<usize> {
    let Some(first) = vectors.first() else {
        return Err(Error::EmptyMeasurementSet);
    };
    for v in vectors {
        if v.len() != first.len() {
            return Err(Error::LengthMismatch {
                left: v.len(),
                right: first.len(),
            });
        }
    }
    Ok(first.len())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard median: sort, midpoint for odd counts, mean of the two middle
/// elements for even counts.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn summarize(values: &[f64]) -> Summary {
    Summary {
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: mean(values),
        median: median(values),
        std_dev: std_dev(values),
    }
}
