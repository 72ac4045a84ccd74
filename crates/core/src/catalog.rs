//! Compiled-in request tables, one per scenario family.
//!
//! A scenario is an ordered list of [`RequestSpec`]s plus the strategy that
//! drives them. Request text is stored as a [`Template`]: literal byte runs
//! interleaved with named [`Slot`]s that are filled from the connection's
//! [`SessionContext`] at send time.
//!
//! Templates and labels live in two parallel tables per family and are
//! zipped together by [`Scenario::from_tables`], which refuses tables of
//! different lengths.

use crate::error::{ProbeError, Result};
use crate::session::SessionContext;

/// A value substituted into a request at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Current CSeq of the connection (RFC 2326 §12.17).
    CSeq,
    /// Session ID captured from an earlier SETUP response.
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text(&'static [u8]),
    Slot(Slot),
}

/// Request text with substitution slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template(pub &'static [Segment]);

impl Template {
    /// Slots this template declares, in order of appearance.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.0.iter().filter_map(|segment| match segment {
            Segment::Slot(slot) => Some(*slot),
            Segment::Text(_) => None,
        })
    }

    /// Fill every slot from `ctx`. A session slot with no captured
    /// session is left empty.
    pub fn render(&self, ctx: &SessionContext) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in self.0 {
            match segment {
                Segment::Text(text) => out.extend_from_slice(text),
                Segment::Slot(Slot::CSeq) => {
                    out.extend_from_slice(ctx.cseq().to_string().as_bytes())
                }
                Segment::Slot(Slot::Session) => {
                    if let Some(session) = ctx.session() {
                        out.extend_from_slice(session.as_bytes());
                    }
                }
            }
        }
        out
    }

    /// The literal text with no substitution at all.
    pub fn literal(&self) -> Vec<u8> {
        self.0
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(text) => Some(*text),
                Segment::Slot(_) => None,
            })
            .flatten()
            .copied()
            .collect()
    }
}

/// One step of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSpec {
    pub template: Template,
    /// Short description printed with the response.
    pub label: &'static str,
}

/// How a scenario's requests are driven. See [`crate::engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// All requests on one connection, expecting a working session.
    Success,
    /// Each malformed request on its own fresh connection.
    Error,
    /// Growing request prefixes on parallel idle connections, then wait
    /// out the server's idle timeout.
    Timeout,
}

/// A fixed, ordered request sequence and the strategy that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub id: u8,
    pub strategy: Strategy,
    pub steps: Vec<RequestSpec>,
}

impl Scenario {
    /// Zip a template table with its label table.
    pub fn from_tables(
        id: u8,
        strategy: Strategy,
        templates: &[Template],
        labels: &[&'static str],
    ) -> Result<Self> {
        if templates.len() != labels.len() {
            return Err(ProbeError::CatalogMismatch {
                templates: templates.len(),
                labels: labels.len(),
            });
        }

        let steps = templates
            .iter()
            .zip(labels)
            .map(|(template, label)| RequestSpec {
                template: *template,
                label: *label,
            })
            .collect();

        Ok(Scenario {
            id,
            strategy,
            steps,
        })
    }
}

/// Scenario lookup by ID.
pub struct Catalog;

impl Catalog {
    /// Resolve a scenario ID.
    ///
    /// 1 and 3 share the well-formed session table; 2 uses the malformed
    /// table. 4 and 5 are reserved and, like any other ID, yield `None`.
    pub fn select(id: u8) -> Result<Option<Scenario>> {
        let scenario = match id {
            1 => Scenario::from_tables(id, Strategy::Success, SESSION_TEMPLATES, SESSION_LABELS)?,
            2 => Scenario::from_tables(id, Strategy::Error, MALFORMED_TEMPLATES, MALFORMED_LABELS)?,
            3 => Scenario::from_tables(id, Strategy::Timeout, SESSION_TEMPLATES, SESSION_LABELS)?,
            _ => return Ok(None),
        };
        Ok(Some(scenario))
    }
}

const USER_AGENT: Segment =
    Segment::Text(b"User-Agent: VLC media player (LIVE555 Streaming Media v2008.07.24)\r\n\r\n");
const CRLF: Segment = Segment::Text(b"\r\n");
const CSEQ: Segment = Segment::Slot(Slot::CSeq);
const SESSION: Segment = Segment::Slot(Slot::Session);

pub const SESSION_TEMPLATES: &[Template] = &[
    Template(&[
        Segment::Text(b"OPTIONS rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: "),
        CSEQ,
        CRLF,
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"DESCRIBE rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: "),
        CSEQ,
        Segment::Text(b"\r\nAccept: application/sdp\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"SETUP rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: "),
        CSEQ,
        Segment::Text(b"\r\nTransport: RAW/RAW/UDP;unicast;client_port=1234-1235\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"PLAY rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: "),
        CSEQ,
        Segment::Text(b"\r\nSession: "),
        SESSION,
        Segment::Text(b"\r\nRange: npt=0,000-\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"TEARDOWN rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: "),
        CSEQ,
        Segment::Text(b"\r\nSession: "),
        SESSION,
        CRLF,
        USER_AGENT,
    ]),
];

pub const SESSION_LABELS: &[&str] = &[
    "OPTIONS - OK",
    "DESCRIBE - OK",
    "SETUP - OK",
    "PLAY - OK",
    "TEARDOWN - OK",
];

pub const MALFORMED_TEMPLATES: &[Template] = &[
    Template(&[
        Segment::Text(b"OPTIONS rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: 0\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"DESCRIBE RTSP/1.0\r\nCSeq: 1\r\nAccept: application/sdp\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(
            b"SETUP rtsp://localhost:6666/ RTSP/1.1\r\nCSeq: 1\r\nTransport: RAW/RAW/UDP;unicast;client_port=1234-1235\r\n",
        ),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"PLAY rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: 1\r\nRange: npt=0,000-\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(b"TEARDOWN rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: \n\r\r\nSession: 1\r\n"),
        USER_AGENT,
    ]),
    Template(&[
        Segment::Text(
            b"OPTIONS rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: 12354542656234265636234\r\n",
        ),
        USER_AGENT,
    ]),
    Template(&[Segment::Text(b"NULL NULL NULL")]),
    Template(&[Segment::Text(b"1231231513515")]),
    Template(&[Segment::Text(
        b"\n\\e\r\t    \t                                        ",
    )]),
    Template(&[Segment::Text(b"\x00\x01\x05\xae\x07\x0d\x3f\x00\x07")]),
    Template(&[Segment::Text(
        b"SETUP rtsp://localhost:6666/ RTSP/1.0\r\nCSeq: 1\r\nTransport: RAW/RAW/UDP;unicast;client_port=1234-1235User-Agent: VLC media player (LIVE555 Streaming Media v2008.07.24)",
    )]),
];

pub const MALFORMED_LABELS: &[&str] = &[
    "OPTIONS - wrong CSeq (0)",
    "DESCRIBE - missing URL",
    "SETUP - wrong RTSP ver.",
    "PLAY - missing SessionID",
    "TEARDOWN - missing CSeq",
    "OPTIONS - extra large CSeq",
    "3x NULL",
    "random numbers",
    "control sequences + white spaces",
    "some ASCII chars from <1 - 31>",
    "msg without terminating chars",
];
