//! Measurement acquisition over an abstract device link.
//!
//! The physical channel — a serial adapter that can cut the device's power —
//! is an external collaborator. This module only defines the seam
//! ([`DeviceLink`]) and the session logic on top of it: power-cycle, read one
//! framed response, repeat. A link is an explicit handle owned by the caller
//! for the duration of one enrollment or evaluation session; there is no
//! global device state.
//!
//! One failed or incomplete response aborts the whole run. A short
//! measurement set would silently skew the majority vote and every statistic
//! downstream, so it is never allowed to form.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::{ResponseParser, helper_write_commands};

/// Values per `write` command. The device shell buffers very little input.
pub const DEFAULT_WRITE_CHUNK: usize = 6;

/// Pause between `write` commands, giving the device shell time to drain.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(50);

/// Connection to a PUF device under test.
pub trait DeviceLink {
    /// Send one text command (the link appends the line terminator).
    fn send_command(&mut self, command: &str) -> Result<()>;

    /// Read the next line of device output. `None` means the line source is
    /// exhausted (EOF or read timeout).
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Power the device off for `off_time`, then back on. SRAM decays only
    /// when unpowered long enough, so the off time is part of the protocol.
    fn power_cycle(&mut self, off_time: Duration) -> Result<()>;
}

/// Read one complete framed measurement from the link.
pub fn read_response(link: &mut dyn DeviceLink) -> Result<Vec<u8>> {
    let mut parser = ResponseParser::new();
    while let Some(line) = link.read_line()? {
        if let Some(data) = parser.push_line(&line) {
            log::debug!("measurement response: {} bytes", data.len());
            return Ok(data);
        }
    }
    Err(Error::AcquisitionFailure(
        "device output ended before a complete Start/Success/End window".into(),
    ))
}

/// Acquire `n` measurements, power-cycling before each reading.
pub fn acquire(
    link: &mut dyn DeviceLink,
    n: usize,
    off_time: Duration,
) -> Result<Vec<Vec<u8>>> {
    let mut measurements = Vec::with_capacity(n);
    for i in 0..n {
        link.power_cycle(off_time)?;
        let measurement = read_response(link)?;
        log::info!("acquired measurement {}/{} ({} bytes)", i + 1, n, measurement.len());
        measurements.push(measurement);
    }
    Ok(measurements)
}

/// Write helper-data bytes to the device in chunked `write` commands with a
/// fixed inter-command delay.
pub fn write_helper(
    link: &mut dyn DeviceLink,
    bytes: &[u8],
    chunk_size: usize,
    delay: Duration,
) -> Result<()> {
    let commands = helper_write_commands(bytes, chunk_size);
    let count = commands.len();
    for command in commands {
        link.send_command(&command)?;
        std::thread::sleep(delay);
    }
    log::info!("wrote {} helper bytes in {count} commands", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted link: replays canned output lines, records sent commands.
    struct ScriptedLink {
        lines: Vec<String>,
        cursor: usize,
        sent: Vec<String>,
        power_cycles: usize,
    }

    impl ScriptedLink {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                cursor: 0,
                sent: Vec::new(),
                power_cycles: 0,
            }
        }
    }

    impl DeviceLink for ScriptedLink {
        fn send_command(&mut self, command: &str) -> Result<()> {
            self.sent.push(command.to_string());
            Ok(())
        }

        fn read_line(&mut self) -> Result<Option<String>> {
            let line = self.lines.get(self.cursor).cloned();
            self.cursor += 1;
            Ok(line)
        }

        fn power_cycle(&mut self, _off_time: Duration) -> Result<()> {
            self.power_cycles += 1;
            Ok(())
        }
    }

    #[test]
    fn acquire_collects_one_measurement_per_power_cycle() {
        let window = [
            "Start: PUF features",
            "Success: Data for reference PUF: [1 2 3]",
            "End: Test finished",
        ];
        let mut lines = Vec::new();
        for _ in 0..3 {
            lines.extend_from_slice(&window);
        }
        let mut link = ScriptedLink::new(&lines);

        let measurements = acquire(&mut link, 3, Duration::ZERO).unwrap();
        assert_eq!(measurements.len(), 3);
        assert_eq!(link.power_cycles, 3);
        assert!(measurements.iter().all(|m| m == &[1, 2, 3]));
    }

    #[test]
    fn truncated_output_aborts_the_run() {
        // Second window never reaches End: the whole acquisition fails.
        let mut link = ScriptedLink::new(&[
            "Start: PUF features",
            "Success: [9 9]",
            "End: Test finished",
            "Start: PUF features",
            "Success: [1 1]",
        ]);
        assert!(matches!(
            acquire(&mut link, 2, Duration::ZERO),
            Err(Error::AcquisitionFailure(_))
        ));
    }

    #[test]
    fn write_helper_sends_chunked_commands() {
        let mut link = ScriptedLink::new(&[]);
        write_helper(&mut link, &[5, 6, 7, 8], 3, Duration::ZERO).unwrap();
        assert_eq!(link.sent, vec!["write 0 5 6 7", "write 3 8"]);
    }
}
