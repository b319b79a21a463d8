//! Key reconstruction from one fresh reading plus stored helper data.

use std::time::Duration;

use pufkey_core::transport::{DeviceLink, read_response};
use pufkey_core::{BitVec, reconstruct};

use super::{hex, open_link, or_fail};
use crate::commands::enroll::HelperMeta;

pub struct ReconstructConfig<'a> {
    pub port: &'a str,
    pub baud: u32,
    pub off_time: f64,
    pub helper_path: &'a str,
    pub secret_len: Option<usize>,
    pub verbose: bool,
}

pub fn run(cfg: ReconstructConfig<'_>) {
    let helper_bytes = match std::fs::read(cfg.helper_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read {}: {err}", cfg.helper_path);
            std::process::exit(1);
        }
    };
    let helper = BitVec::from_bytes(&helper_bytes);

    // The sidecar records the enrollment parameters; an explicit flag wins.
    let secret_len = cfg.secret_len.unwrap_or_else(|| {
        let meta_path = format!("{}.json", cfg.helper_path);
        match std::fs::read_to_string(&meta_path)
            .ok()
            .and_then(|json| serde_json::from_str::<HelperMeta>(&json).ok())
        {
            Some(meta) => meta.secret_len,
            None => {
                eprintln!(
                    "no readable {meta_path}; pass --secret-len to match the enrollment"
                );
                std::process::exit(1);
            }
        }
    });

    let mut link = open_link(cfg.port, cfg.baud);

    // One power cycle, one reading: the same conditions the deployed device
    // reconstructs under.
    or_fail(
        link.power_cycle(Duration::from_secs_f64(cfg.off_time)),
        "power cycle failed",
    );
    let reading = or_fail(read_response(&mut link), "measurement acquisition failed");
    if cfg.verbose {
        println!("Fresh reading: {} bytes", reading.len());
    }

    let rec = or_fail(
        reconstruct(&reading, &helper, secret_len),
        "reconstruction failed",
    );

    println!("Noise this power cycle: {} bits", rec.noise_bits);
    println!(
        "Corrected             : {} inner, {} outer",
        rec.stats.inner_corrected, rec.stats.outer_corrected
    );
    println!("Device key            : {}", hex(&rec.key));
}
