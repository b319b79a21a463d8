//! Device enrollment: measure, derive helper data, persist it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use pufkey_core::transport::{DEFAULT_WRITE_DELAY, write_helper};
use pufkey_core::{enroll, min_entropy};

use super::{collect_measurements, hex, open_link, or_fail};

/// Sidecar metadata written next to the helper bytes so `reconstruct` knows
/// how to interpret them.
#[derive(Debug, Serialize, Deserialize)]
pub struct HelperMeta {
    pub version: u32,
    pub secret_len: usize,
    pub helper_bytes: usize,
    pub measurement_repetitions: usize,
}

pub struct EnrollConfig<'a> {
    pub port: &'a str,
    pub baud: u32,
    pub repetitions: usize,
    pub off_time: f64,
    pub secret_len: usize,
    pub chunk: usize,
    pub helper_path: &'a str,
    pub verbose: bool,
}

pub fn run(cfg: EnrollConfig<'_>) {
    let off_time = Duration::from_secs_f64(cfg.off_time);
    let mut link = open_link(cfg.port, cfg.baud);

    if cfg.verbose {
        println!(
            "Enrolling over {} ({} baud), {} measurements, {:.1}s off time",
            cfg.port, cfg.baud, cfg.repetitions, cfg.off_time
        );
    }

    let measurements = or_fail(
        collect_measurements(&mut link, cfg.repetitions, off_time, cfg.verbose),
        "measurement acquisition failed",
    );

    let enrollment = or_fail(enroll(&measurements, cfg.secret_len), "enrollment failed");
    let helper_bytes = or_fail(enrollment.helper.to_bytes(), "helper packing failed");

    // Quality check before anything is written: a low-entropy reference means
    // the helper data would leak the key.
    let vectors: Vec<_> = measurements
        .iter()
        .map(|m| pufkey_core::BitVec::from_bytes(m))
        .collect();
    let entropy = or_fail(min_entropy(&vectors), "entropy estimation failed");

    or_fail(
        write_helper(&mut link, &helper_bytes, cfg.chunk, DEFAULT_WRITE_DELAY),
        "helper write to device failed",
    );

    if let Err(err) = std::fs::write(cfg.helper_path, &helper_bytes) {
        eprintln!("failed to write {}: {err}", cfg.helper_path);
        std::process::exit(1);
    }
    let meta = HelperMeta {
        version: 1,
        secret_len: cfg.secret_len,
        helper_bytes: helper_bytes.len(),
        measurement_repetitions: cfg.repetitions,
    };
    let meta_path = format!("{}.json", cfg.helper_path);
    let json = serde_json::to_string_pretty(&meta).expect("serializable meta");
    if let Err(err) = std::fs::write(&meta_path, json) {
        eprintln!("failed to write {meta_path}: {err}");
        std::process::exit(1);
    }

    println!("Helper data          : {} bytes → device + {}", helper_bytes.len(), cfg.helper_path);
    println!(
        "Reference min-entropy: {:.2} bits ({:.2} %)",
        entropy.absolute_bits, entropy.relative_percent
    );
    println!(
        "Unstable bits        : {} / {}",
        enrollment.estimate.unstable_positions(),
        enrollment.helper.len()
    );
    println!("Device key           : {}", hex(&enrollment.key));
}
