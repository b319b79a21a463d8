//! Subcommand implementations.

pub mod analyze;
pub mod enroll;
pub mod evaluate;
pub mod reconstruct;

use std::time::Duration;

use pufkey_core::transport::{DeviceLink, read_response};

use crate::serial::SerialLink;

/// Read timeout for device output. The shell answers immediately; boot after
/// a power cycle takes at most a couple of seconds.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Unwrap a core result or exit with a message — user-facing failure, not a
/// panic.
pub fn or_fail<T>(result: pufkey_core::Result<T>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{context}: {err}");
            std::process::exit(1);
        }
    }
}

/// Open the serial link or exit.
pub fn open_link(port: &str, baud: u32) -> SerialLink {
    or_fail(
        SerialLink::open(port, baud, READ_TIMEOUT),
        &format!("failed to open {port}"),
    )
}

/// Collect `n` power-cycled measurements with per-iteration progress output.
pub fn collect_measurements(
    link: &mut dyn DeviceLink,
    n: usize,
    off_time: Duration,
    verbose: bool,
) -> pufkey_core::Result<Vec<Vec<u8>>> {
    let mut measurements = Vec::with_capacity(n);
    for i in 0..n {
        link.power_cycle(off_time)?;
        let measurement = read_response(link)?;
        if verbose {
            println!("Iteration {}/{} ({} bytes)", i + 1, n, measurement.len());
        }
        measurements.push(measurement);
    }
    Ok(measurements)
}

/// Hex string without separators.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        write!(s, "{b:02x}").unwrap();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encodes_without_separators() {
        assert_eq!(hex(&[0xAB, 0x01, 0xFF]), "ab01ff");
        assert_eq!(hex(&[]), "");
    }
}
