//! The sliver of RTSP (RFC 2326) the probe has to understand.
//!
//! The probe never builds a full response model. Servers under test are
//! expected to misbehave, so everything here is a read-only view over the
//! raw text that yields `None` instead of failing.
//!
//! ```text
//! RTSP/1.0 200 OK\r\n
//! CSeq: 3\r\n
//! Session: 0000000000000001;timeout=60\r\n
//! \r\n
//! ```
//!
//! - [`parse_session_id`] pulls the identifier out of the `Session`
//!   header (RFC 2326 §12.37) so later requests can carry it.
//! - [`StatusLine`] reads the first line for logging.

pub mod response;
pub mod session_id;

pub use response::StatusLine;
pub use session_id::parse_session_id;
