use std::time::Duration;

use crate::error::{ProbeError, RangedArgument, Result};

/// Size of the single read performed per response.
pub const DEFAULT_RECV_BUFFER: usize = 600;

/// Delay between iterations.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Wait after the timeout scenario. The target's idle timeout is 60s.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_secs(62);

pub const PORT_RANGE: (i64, i64) = (1, 65535);
pub const SCENARIO_RANGE: (i64, i64) = (1, 5);
pub const REPEATS_RANGE: (i64, i64) = (1, 1000);

/// Everything the scenario engine needs to know about a run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Target host: `localhost` or a dotted-quad IPv4 literal.
    pub host: String,
    pub port: u16,
    /// Scenario ID, 1 to 5.
    pub scenario: u8,
    /// Requested iteration count, 1 to 1000.
    pub repeats: u32,
    /// Bound on each receive. `None` blocks until the target replies.
    pub read_timeout: Option<Duration>,
    /// Delay after every iteration.
    pub pacing: Duration,
    /// Sleep after the timeout scenario has driven its connections.
    pub idle_wait: Duration,
    /// Upper bound for the single read performed per response.
    pub recv_buffer: usize,
}

impl ProbeConfig {
    /// Validate raw command-line values and build a config.
    ///
    /// Checks run in a fixed order: port, then scenario and repeats,
    /// then host. The first failure wins.
    pub fn from_args(host: &str, port: i64, scenario: i64, repeats: i64) -> Result<Self> {
        if !in_range(port, PORT_RANGE) {
            return Err(ProbeError::ArgumentRange {
                what: RangedArgument::Port,
            });
        }
        if !in_range(scenario, SCENARIO_RANGE) || !in_range(repeats, REPEATS_RANGE) {
            return Err(ProbeError::ArgumentRange {
                what: RangedArgument::TestAndRepeats,
            });
        }
        if !valid_address(host) {
            return Err(ProbeError::InvalidAddress(host.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port: port as u16,
            scenario: scenario as u8,
            repeats: repeats as u32,
            read_timeout: None,
            pacing: DEFAULT_PACING,
            idle_wait: DEFAULT_IDLE_WAIT,
            recv_buffer: DEFAULT_RECV_BUFFER,
        })
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    /// `host:port`, as passed to the resolver.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn in_range(value: i64, (min, max): (i64, i64)) -> bool {
    (min..=max).contains(&value)
}

/// Accepts `localhost` or four dot-separated decimal groups of one to
/// three digits, each no greater than 255. Leading zeros are allowed.
pub fn valid_address(addr: &str) -> bool {
    if addr == "localhost" {
        return true;
    }

    let octets: Vec<&str> = addr.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|v| v <= 255)
        })
}
