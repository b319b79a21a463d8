//! Offline uniqueness analysis of device identifiers scraped from a log.
//!
//! The log is whatever the operator captured from the serial console across a
//! fleet of devices; only lines carrying `idstart{ ... }idend` markers count.
//! Malformed lines are skipped silently — consoles garble output — but a log
//! that yields no codes at all is a usage error, not an empty report.

use pufkey_core::{BitVec, PairwiseReport, pairwise_analysis, protocol::parse_id_line};

use super::or_fail;

pub struct AnalyzeConfig<'a> {
    pub log_path: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: AnalyzeConfig<'_>) {
    let content = match std::fs::read_to_string(cfg.log_path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("failed to read {}: {err}", cfg.log_path);
            std::process::exit(1);
        }
    };

    let codes = extract_codes(&content);
    if codes.is_empty() {
        eprintln!(
            "no device codes found in {} (expected idstart{{ ... }}idend lines)",
            cfg.log_path
        );
        std::process::exit(1);
    }
    println!("Found {} device codes ({} bits each)", codes.len(), codes[0].len());

    let report = or_fail(pairwise_analysis(&codes), "pairwise analysis failed");
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

/// Pull every well-formed id line out of the log.
fn extract_codes(content: &str) -> Vec<BitVec> {
    content
        .lines()
        .filter_map(parse_id_line)
        .map(|bytes| BitVec::from_bytes(&bytes))
        .collect()
}

fn print_report(report: &PairwiseReport) {
    println!("{:=<68}", "");
    println!(
        "{:>5}  {:>6}  {:>6}  {:>9}  {:>9}  {:>9}",
        "code", "min", "max", "mean", "median", "std"
    );
    for row in &report.vectors {
        println!(
            "{:>5}  {:>6}  {:>6}  {:>9.2}  {:>9.2}  {:>9.2}",
            row.index, row.min, row.max, row.mean, row.median, row.std_dev
        );
    }
    println!("{:=<68}", "");
    print_summary("over means", &report.over_means);
    print_summary("over medians", &report.over_medians);
    print_summary("over stds", &report.over_std_devs);

    if report.duplicates.is_empty() {
        println!("No identical codes.");
    } else {
        println!("Identical codes found:");
        for (a, b) in &report.duplicates {
            println!("  [{a}] == [{b}]");
        }
    }
}

fn print_summary(label: &str, summary: &pufkey_core::stats::Summary) {
    println!(
        "{label:>12}: min {:.2}  max {:.2}  mean {:.2}  median {:.2}  std {:.2}",
        summary.min, summary.max, summary.mean, summary.median, summary.std_dev
    );
}
