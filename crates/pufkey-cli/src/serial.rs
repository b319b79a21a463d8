//! Serial device link: termios line discipline plus RTS-driven power control.
//!
//! The measurement rig wires the adapter's RTS line into the device's supply
//! switch: RTS asserted cuts power, deasserted restores it. That makes a
//! power cycle an ordinary modem-control ioctl, the same trick the original
//! FTDI harness used.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use pufkey_core::transport::DeviceLink;
use pufkey_core::{Error, Result};

/// Serial connection to the PUF device.
///
/// Owns the port for the duration of one session; dropping it releases the
/// port. Reads are byte-at-a-time with a termios timeout, which is plenty for
/// a 115200-baud shell.
pub struct SerialLink {
    file: std::fs::File,
    pending: Vec<u8>,
}

impl SerialLink {
    /// Open and configure the port in raw mode with the given read timeout.
    pub fn open(path: &str, baud: u32, read_timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)?;

        let fd = file.as_raw_fd();
        let speed = baud_constant(baud)?;

        // SAFETY: fd is a valid open descriptor; termios is fully initialized
        // by tcgetattr before use.
        unsafe {
            let mut tio: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut tio) != 0 {
                return Err(Error::Io(io::Error::last_os_error()));
            }
            libc::cfmakeraw(&mut tio);
            libc::cfsetispeed(&mut tio, speed);
            libc::cfsetospeed(&mut tio, speed);

            // Blocking read with an inter-byte deadline: VMIN=0, VTIME in
            // tenths of a second (capped at the field's limit).
            let deciseconds = (read_timeout.as_millis() / 100).clamp(1, 255) as libc::cc_t;
            tio.c_cc[libc::VMIN] = 0;
            tio.c_cc[libc::VTIME] = deciseconds;

            if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
                return Err(Error::Io(io::Error::last_os_error()));
            }
            libc::tcflush(fd, libc::TCIOFLUSH);
        }

        Ok(Self {
            file,
            pending: Vec::new(),
        })
    }

    fn set_rts(&self, asserted: bool) -> Result<()> {
        let bits: libc::c_int = libc::TIOCM_RTS;
        let request = if asserted {
            libc::TIOCMBIS
        } else {
            libc::TIOCMBIC
        };
        // SAFETY: TIOCMBIS/TIOCMBIC take a pointer to the modem bit mask.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, &bits) };
        if rc != 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl DeviceLink for SerialLink {
    fn send_command(&mut self, command: &str) -> Result<()> {
        self.file.write_all(command.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
                while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            let mut chunk = [0u8; 256];
            let n = self.file.read(&mut chunk)?;
            if n == 0 {
                // Timeout. Hand back any unterminated tail once, then EOF.
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let tail = std::mem::take(&mut self.pending);
                return Ok(Some(String::from_utf8_lossy(&tail).into_owned()));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
    }

    fn power_cycle(&mut self, off_time: Duration) -> Result<()> {
        log::debug!("power cycle: off for {:.1}s", off_time.as_secs_f64());
        self.set_rts(true)?;
        std::thread::sleep(off_time);
        // Discard anything buffered while the device was dying.
        unsafe { libc::tcflush(self.file.as_raw_fd(), libc::TCIFLUSH) };
        self.pending.clear();
        self.set_rts(false)?;
        Ok(())
    }
}

/// Map a numeric baud rate onto its termios constant.
fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported baud rate {baud}"),
            )));
        }
    };
    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_baud_rates_map_to_constants() {
        assert_eq!(baud_constant(115200).unwrap(), libc::B115200);
        assert_eq!(baud_constant(9600).unwrap(), libc::B9600);
    }

    #[test]
    fn unusual_baud_rates_are_rejected() {
        assert!(baud_constant(12345).is_err());
    }
}
