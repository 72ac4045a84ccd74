//! Error types for the RTSP probe.

use std::fmt;

/// Errors that end a probe run.
///
/// Variants map to the stage at which the run was abandoned:
///
/// - **Arguments**: [`Usage`](Self::Usage),
///   [`ArgumentRange`](Self::ArgumentRange),
///   [`InvalidAddress`](Self::InvalidAddress).
/// - **Catalog**: [`CatalogMismatch`](Self::CatalogMismatch), raised before
///   any request is sent.
/// - **Transport**: [`Connect`](Self::Connect), fatal for the whole run.
/// - **Output**: [`Io`](Self::Io), the report stream could not be written.
///
/// Send/receive failures on an open connection are deliberately absent:
/// the engine treats them as an empty response and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Wrong number of command-line arguments.
    #[error("wrong number of arguments")]
    Usage,

    /// A numeric argument fell outside its accepted range.
    #[error("Argument(s) out of bounds! (check {what})")]
    ArgumentRange { what: RangedArgument },

    /// HOST is neither `localhost` nor a dotted-quad IPv4 literal.
    #[error("IP address is not valid! ({0})")]
    InvalidAddress(String),

    /// The TCP connection to the target could not be established.
    #[error("Could not open socket: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A scenario's template table and label table differ in length.
    #[error(
        "List of msgs and list of msg descriptions have different number of items! ({templates} vs {labels})"
    )]
    CatalogMismatch { templates: usize, labels: usize },

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage | Self::Connect { .. } | Self::Io(_) => -1,
            Self::ArgumentRange { .. } => -2,
            Self::InvalidAddress(_) => -3,
            Self::CatalogMismatch { .. } => -4,
        }
    }

    /// Whether the usage text should follow the error message.
    pub fn wants_usage(&self) -> bool {
        matches!(
            self,
            Self::Usage | Self::ArgumentRange { .. } | Self::InvalidAddress(_)
        )
    }
}

/// Which numeric argument group failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangedArgument {
    Port,
    TestAndRepeats,
}

impl fmt::Display for RangedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port => write!(f, "PORT"),
            Self::TestAndRepeats => write!(f, "TEST_NUM and REPEATS_NUM"),
        }
    }
}

/// Convenience alias for `Result<T, ProbeError>`.
pub type Result<T> = std::result::Result<T, ProbeError>;
