//! Client-side TCP transport for RTSP signaling.
//!
//! The probe talks to the target over plain blocking sockets, one
//! [`Connection`] per stream. Nothing here understands RTSP framing:
//! a request is written in full and a response is whatever a single read
//! returns, capped at the configured buffer size. Responses longer than
//! that are cut short and the remainder is left unread on the socket.
//!
//! Connect uses the OS default timeout. Reads block indefinitely unless
//! [`ProbeConfig::read_timeout`](crate::config::ProbeConfig::read_timeout)
//! is set.

pub mod tcp;

pub use tcp::Connection;
