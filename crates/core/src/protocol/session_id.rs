/// Header name as RUM2-style servers emit it, colon included.
const SESSION_HEADER: &str = "Session:";

/// Extract the session identifier from a raw SETUP response.
///
/// Lines are split on CRLF and each line on single spaces. The first line
/// whose first token is exactly `Session:` and which has a second token
/// decides the result: the part of that token before any `;` parameters.
/// Matching is literal (case-sensitive, single space after the colon).
///
/// Returns `None` when no line matches or the matching value is empty.
pub fn parse_session_id(response: &str) -> Option<String> {
    response
        .split("\r\n")
        .find_map(|line| {
            let mut tokens = line.split(' ');
            if tokens.next() != Some(SESSION_HEADER) {
                return None;
            }
            let value = tokens.next()?;
            Some(value.split(';').next().unwrap_or_default().to_string())
        })
        .filter(|id| !id.is_empty())
}
