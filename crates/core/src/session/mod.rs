//! Client-side RTSP session state (RFC 2326 §3, §12.17, §12.37).
//!
//! A [`SessionContext`] belongs to exactly one TCP connection. It carries
//! the two values later requests depend on:
//!
//! - The CSeq counter: starts at 1 and advances once per request sent.
//! - The session ID handed out by the server in its SETUP response.
//!
//! ## Lifecycle
//!
//! ```text
//! new()                 -> cseq 1, no session
//! advance()             -> cseq + 1            (after every send)
//! capture(response)     -> session set         (first parse only)
//! ```
//!
//! Once captured, the session ID is never replaced, even if a later
//! response names a different one.

use crate::protocol::parse_session_id;

/// Per-connection request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    cseq: u32,
    session: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext {
            cseq: 1,
            session: None,
        }
    }

    /// CSeq for the next request.
    pub fn cseq(&self) -> u32 {
        self.cseq
    }

    /// Session ID captured so far, if any.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Move to the next CSeq. Called once per request sent.
    pub fn advance(&mut self) {
        self.cseq += 1;
    }

    /// Try to take the session ID from a response.
    ///
    /// Returns the ID only when this call captured it. Does nothing once a
    /// session is already held.
    pub fn capture(&mut self, response: &str) -> Option<&str> {
        if self.session.is_some() {
            return None;
        }

        let id = parse_session_id(response)?;
        tracing::debug!(session_id = %id, cseq = self.cseq, "session captured");
        self.session = Some(id);
        self.session.as_deref()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
