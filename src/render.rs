//! Fixed-width formatting and in-place terminal line updates.

use std::io::Write;

use crate::types::TrafficReport;
use crate::Result;

const MIB: f64 = 1024.0 * 1024.0;

/// Carriage return plus clear-to-end-of-line; rewrites the current line.
const CLEAR_LINE: &str = "\r\x1b[K";

/// Format a byte rate as a width-5, one-decimal megabit figure.
#[must_use]
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{:5.1} Mbit/s", bytes_per_sec * 8.0 / MIB)
}

/// Format a byte count as a width-5, one-decimal mebibyte figure.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(num_bytes: u64) -> String {
    format!("{:5.1} MiB", num_bytes as f64 / MIB)
}

/// Rewrites one terminal line per report, never emitting a newline.
///
/// Generic over the writer so tests can capture the byte stream; production
/// use wraps stdout.
pub struct LineRenderer<W: Write> {
    out: W,
}

impl<W: Write> LineRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Replace the current line with the formatted report and flush.
    ///
    /// # Errors
    /// Returns [`Error::Io`](crate::Error::Io) if the write fails.
    pub fn render(&mut self, report: &TrafficReport) -> Result<()> {
        write!(
            self.out,
            "{CLEAR_LINE}R: {}     S: {}    TR: {}    TS: {}",
            format_rate(report.recv_rate),
            format_rate(report.send_rate),
            format_size(report.total_received),
            format_size(report.total_sent),
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_scales_bytes_to_megabits() {
        assert_eq!(format_rate(131_072.0), "  1.0 Mbit/s");
        assert_eq!(format_rate(0.0), "  0.0 Mbit/s");
        assert_eq!(format_rate(13_107_200.0), "100.0 Mbit/s");
    }

    #[test]
    fn size_scales_bytes_to_mebibytes() {
        assert_eq!(format_size(1_048_576), "  1.0 MiB");
        assert_eq!(format_size(0), "  0.0 MiB");
        assert_eq!(format_size(15_728_640), " 15.0 MiB");
    }

    #[test]
    fn render_rewrites_the_line_without_a_newline() {
        let mut renderer = LineRenderer::new(Vec::new());
        let report = TrafficReport {
            total_received: 1_048_576,
            total_sent: 2_097_152,
            recv_rate: 131_072.0,
            send_rate: 262_144.0,
        };
        renderer.render(&report).unwrap();

        let line = String::from_utf8(renderer.out).unwrap();
        assert!(line.starts_with("\r\x1b[K"));
        assert!(!line.ends_with('\n'));
        assert_eq!(
            line,
            "\r\x1b[KR:   1.0 Mbit/s     S:   2.0 Mbit/s    TR:   1.0 MiB    TS:   2.0 MiB"
        );
    }
}
