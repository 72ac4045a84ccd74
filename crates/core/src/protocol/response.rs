/// The first line of an RTSP response (RFC 2326 §7.1).
///
/// ```text
/// RTSP-Version SP Status-Code SP Reason-Phrase CRLF
/// ```
///
/// Used only to annotate log lines. A response that does not start with a
/// recognisable status line is still reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Protocol version (expected: `RTSP/1.0`).
    pub version: String,
    pub status_code: u16,
    /// Reason phrase, possibly empty.
    pub reason: String,
}

impl StatusLine {
    /// Parse the status line from raw response text.
    ///
    /// Returns `None` for empty input, a version not starting with `RTSP/`,
    /// or a non-numeric status code.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.lines().next()?;
        let mut parts = line.splitn(3, ' ');

        let version = parts.next().filter(|v| v.starts_with("RTSP/"))?;
        let status_code = parts.next()?.parse::<u16>().ok()?;
        let reason = parts.next().unwrap_or("").trim();

        Some(StatusLine {
            version: version.to_string(),
            status_code,
            reason: reason.to_string(),
        })
    }

    /// 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
