//! Statistical evaluation of a device's PUF quality over many power cycles.

use std::time::Duration;

use serde::Serialize;

use pufkey_core::{BitVec, MinEntropyReport, bit_error_rate, compression_ratio, min_entropy};

use super::{collect_measurements, open_link, or_fail};

/// Machine-readable evaluation report (`--output`).
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub measurements: usize,
    pub bit_length: usize,
    pub min_entropy: MinEntropyReport,
    pub bit_error_rate_percent: f64,
    pub mean_compression_ratio: f64,
}

pub struct EvaluateConfig<'a> {
    pub port: &'a str,
    pub baud: u32,
    pub repetitions: usize,
    pub off_time: f64,
    pub output_path: Option<&'a str>,
    pub verbose: bool,
}

pub fn run(cfg: EvaluateConfig<'_>) {
    let off_time = Duration::from_secs_f64(cfg.off_time);
    let mut link = open_link(cfg.port, cfg.baud);

    if cfg.verbose {
        println!(
            "Evaluating over {} ({} baud), {} power cycles",
            cfg.port, cfg.baud, cfg.repetitions
        );
    }

    let measurements = or_fail(
        collect_measurements(&mut link, cfg.repetitions, off_time, cfg.verbose),
        "measurement acquisition failed",
    );

    let report = or_fail(build_report(&measurements), "evaluation failed");
    print_report(&report);

    if let Some(path) = cfg.output_path {
        let json = serde_json::to_string_pretty(&report).expect("serializable report");
        if let Err(err) = std::fs::write(path, json) {
            eprintln!("failed to write {path}: {err}");
            std::process::exit(1);
        }
        println!("Report written to {path}");
    }
}

fn build_report(measurements: &[Vec<u8>]) -> pufkey_core::Result<EvaluationReport> {
    let vectors: Vec<BitVec> = measurements.iter().map(|m| BitVec::from_bytes(m)).collect();
    let entropy = min_entropy(&vectors)?;
    let ber = bit_error_rate(&vectors)?;
    let mean_ratio = measurements
        .iter()
        .map(|m| compression_ratio(m))
        .sum::<f64>()
        / measurements.len() as f64;

    Ok(EvaluationReport {
        measurements: measurements.len(),
        bit_length: vectors[0].len(),
        min_entropy: entropy,
        bit_error_rate_percent: ber,
        mean_compression_ratio: mean_ratio,
    })
}

fn print_report(report: &EvaluationReport) {
    println!("{:=<60}", "");
    println!("Number of measurements: {}", report.measurements);
    println!("Response length       : {} bits", report.bit_length);
    println!(
        "Abs. min-entropy      : {:.2} bits",
        report.min_entropy.absolute_bits
    );
    println!(
        "Rel. min-entropy      : {:.2} %",
        report.min_entropy.relative_percent
    );
    println!(
        "Bit-error rate        : {:.2} %",
        report.bit_error_rate_percent
    );
    println!(
        "Compression ratio     : {:.3}",
        report.mean_compression_ratio
    );
    println!("{:=<60}", "");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_over_identical_readings_is_fully_stable() {
        let measurements = vec![vec![0xA5u8; 16]; 4];
        let report = build_report(&measurements).unwrap();
        assert_eq!(report.measurements, 4);
        assert_eq!(report.bit_length, 128);
        assert_eq!(report.min_entropy.absolute_bits, 0.0);
        assert_eq!(report.bit_error_rate_percent, 0.0);
    }

    #[test]
    fn report_flags_unstable_bits() {
        let mut second = vec![0u8; 16];
        second[0] = 0x80; // one flipping bit across two readings
        let report = build_report(&[vec![0u8; 16], second]).unwrap();
        assert!(report.bit_error_rate_percent > 0.0);
        assert!(report.min_entropy.absolute_bits > 0.0);
    }
}
