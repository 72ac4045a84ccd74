use std::io::Write;

use crate::error::Result;

/// Bytes dropped from the end of every response before display. Targets
/// terminate responses with a fixed 3-byte trailer.
pub const TRAILER_LEN: usize = 3;

const RULE_WIDTH: usize = 80;
const BANNER_WIDTH: usize = 27;

/// One request/response pair, borrowed for the duration of a report.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub label: &'a str,
    pub request: &'a [u8],
    pub response: &'a [u8],
    /// Session ID captured from this response, if this is the one that
    /// established it.
    pub captured_session: Option<&'a str>,
}

/// Writes the human-readable transcript of a run.
///
/// Output goes to any [`Write`] sink: stdout for the binary, a buffer in
/// tests. Diagnostics belong in `tracing`, not here.
pub struct Reporter<W: Write> {
    out: W,
    echo_requests: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter {
            out,
            echo_requests: false,
        }
    }

    /// Also print each request as sent.
    pub fn with_echo_requests(mut self, echo: bool) -> Self {
        self.echo_requests = echo;
        self
    }

    /// Banner opening an iteration.
    pub fn iteration(&mut self, scenario: u8, iteration: u32) -> Result<()> {
        let hashes = "#".repeat(BANNER_WIDTH);
        writeln!(
            self.out,
            "\n{hashes} Test {scenario} - {iteration:>4}. iteration {hashes}"
        )?;
        Ok(())
    }

    /// Blank line before the first exchange of a strategy.
    pub fn begin(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    /// Label, truncated response, optional session notice, then a rule.
    pub fn exchange(&mut self, exchange: &Exchange<'_>) -> Result<()> {
        writeln!(self.out, "Sending: {}", exchange.label)?;
        if self.echo_requests {
            writeln!(self.out, "\n{}", String::from_utf8_lossy(exchange.request))?;
        }
        writeln!(
            self.out,
            "\n{}",
            String::from_utf8_lossy(strip_trailer(exchange.response))
        )?;
        if let Some(session) = exchange.captured_session {
            writeln!(self.out, "\n>>> Parsed session ID: {session}")?;
        }
        writeln!(self.out, "{}", "*".repeat(RULE_WIDTH))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Drop the trailer. Responses shorter than the trailer display as empty.
pub fn strip_trailer(response: &[u8]) -> &[u8] {
    &response[..response.len().saturating_sub(TRAILER_LEN)]
}
