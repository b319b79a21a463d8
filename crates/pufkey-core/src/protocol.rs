//! Line-oriented device protocol: response framing, helper-data write
//! commands, and the offline log format.
//!
//! The device firmware frames one measurement per response window:
//!
//! ```text
//! Start: PUF features
//! Success: Data for reference PUF: [0x12 0x5f ... ]
//! End: Test finished
//! ```
//!
//! Values inside the brackets are whitespace-separated bytes, printed as hex
//! (`0x..`) or decimal depending on firmware build. The `Success:` payload
//! only counts if a `Start:` was seen in the same window, and the response is
//! only complete once `End:` arrives after data — anything less is an
//! acquisition failure, never a short measurement.
//!
//! Everything here is pure parsing/formatting; I/O lives in [`crate::transport`].

/// Incremental parser for one framed response window.
#[derive(Debug, Default)]
pub struct ResponseParser {
    started: bool,
    data: Option<Vec<u8>>,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns the measurement once the window completes.
    ///
    /// A `Success:` line with a malformed payload leaves the window open, so
    /// the caller's read loop eventually reports the failure instead of
    /// passing corrupt data downstream.
    pub fn push_line(&mut self, line: &str) -> Option<Vec<u8>> {
        if line.contains("Start:") {
            self.started = true;
        }
        if self.started && line.contains("Success:") {
            if let (Some(open), Some(close)) = (line.find('['), line.rfind(']')) {
                if open < close {
                    self.data = parse_values(&line[open + 1..close]);
                }
            }
        }
        if line.contains("End:") && self.data.is_some() {
            return self.data.take();
        }
        None
    }
}

/// Parse whitespace-separated byte values, decimal or `0x` hex.
/// Any unparsable or out-of-range token invalidates the whole payload.
fn parse_values(payload: &str) -> Option<Vec<u8>> {
    let mut values = Vec::new();
    for token in payload.split_whitespace() {
        values.push(parse_byte(token)?);
    }
    Some(values)
}

fn parse_byte(token: &str) -> Option<u8> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

/// Extract one device-identifier vector from a log line of the form
/// `... idstart{ 18 52 247 ... }idend ...`. Returns `None` for lines without
/// both markers or with malformed values — callers skip those, they are not
/// fatal.
pub fn parse_id_line(line: &str) -> Option<Vec<u8>> {
    if !line.contains("idstart{") || !line.contains("}idend") {
        return None;
    }
    let open = line.find('{')?;
    let close = line.find('}')?;
    if open >= close {
        return None;
    }
    let values = parse_values(&line[open + 1..close])?;
    if values.is_empty() { None } else { Some(values) }
}

/// Render helper-data bytes as chunked shell commands for the device:
/// `write <offset> <v0> <v1> ...`, with a running byte offset.
///
/// The target's shell buffer is small, hence the chunking; `chunk_size` is
/// clamped to at least one value per command.
pub fn helper_write_commands(bytes: &[u8], chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut commands = Vec::with_capacity(bytes.len().div_ceil(chunk_size));
    let mut offset = 0;
    for chunk in bytes.chunks(chunk_size) {
        let mut cmd = format!("write {offset}");
        for value in chunk {
            cmd.push(' ');
            cmd.push_str(&value.to_string());
        }
        commands.push(cmd);
        offset += chunk.len();
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_window_yields_the_measurement() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.push_line("Start: PUF features"), None);
        assert_eq!(
            parser.push_line("Success: Data for reference PUF: [0x12 0xa0 7 255 ]"),
            None
        );
        assert_eq!(
            parser.push_line("End: Test finished"),
            Some(vec![0x12, 0xA0, 7, 255])
        );
    }

    #[test]
    fn success_without_start_is_ignored() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.push_line("Success: [1 2 3]"), None);
        assert_eq!(parser.push_line("End: Test finished"), None);
    }

    #[test]
    fn end_without_data_does_not_complete() {
        let mut parser = ResponseParser::new();
        parser.push_line("Start: PUF features");
        assert_eq!(parser.push_line("End: Test finished"), None);
    }

    #[test]
    fn noise_lines_between_markers_are_tolerated() {
        let mut parser = ResponseParser::new();
        parser.push_line("boot: firmware says hello");
        parser.push_line("Start: PUF features");
        parser.push_line("some unrelated shell output");
        parser.push_line("Success: memory dump: [0 1 2]");
        assert_eq!(parser.push_line("End: done"), Some(vec![0, 1, 2]));
    }

    #[test]
    fn malformed_payload_invalidates_the_window() {
        let mut parser = ResponseParser::new();
        parser.push_line("Start: PUF features");
        parser.push_line("Success: [12 bogus 14]");
        assert_eq!(parser.push_line("End: Test finished"), None);

        // Out-of-range byte values count as malformed too.
        let mut parser = ResponseParser::new();
        parser.push_line("Start:");
        parser.push_line("Success: [999]");
        assert_eq!(parser.push_line("End:"), None);
    }

    #[test]
    fn id_lines_parse_between_markers() {
        assert_eq!(
            parse_id_line("node-7 idstart{ 18 52 247 3 }idend uptime 122s"),
            Some(vec![18, 52, 247, 3])
        );
        assert_eq!(parse_id_line("no markers here"), None);
        assert_eq!(parse_id_line("idstart{ 1 nonsense }idend"), None);
        assert_eq!(parse_id_line("idstart{ }idend"), None);
    }

    #[test]
    fn write_commands_carry_a_running_offset() {
        let commands = helper_write_commands(&[10, 20, 30, 40, 50, 60, 70, 80], 6);
        assert_eq!(
            commands,
            vec![
                "write 0 10 20 30 40 50 60".to_string(),
                "write 6 70 80".to_string(),
            ]
        );
    }

    #[test]
    fn write_commands_clamp_chunk_size() {
        let commands = helper_write_commands(&[1, 2], 0);
        assert_eq!(commands, vec!["write 0 1".to_string(), "write 1 2".to_string()]);
    }
}
