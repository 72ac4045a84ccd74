use std::io;
use std::process;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use rtsp_probe::{Catalog, Engine, ProbeConfig, ProbeError, Reporter, Result, ThreadPacer};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "
Usage:

    rtsp-probe HOST PORT TEST_NUM REPEATS_NUM [--read-timeout SECS] [--echo-requests]

    HOST        - RTSP server IP address (IPv4) or localhost
    PORT        - RTSP server port <1, 65535>
    TEST_NUM    - test ID <1, 5>
                    1: OPTIONS/DESCRIBE/SETUP/PLAY/TEARDOWN on one connection
                    2: malformed requests, one connection each
                    3: idle connections left to time out (runs once, ~62s)
                    4, 5: reserved
    REPEATS_NUM - number of iterations <1, 1000>
";

#[derive(Parser)]
#[command(
    name = "rtsp-probe",
    about = "Drive an RTSP server through fixed request sequences and print its replies",
    allow_negative_numbers = true,
    after_help = USAGE
)]
struct Args {
    /// RTSP server IPv4 address or `localhost`
    host: String,
    /// RTSP server port
    port: i64,
    /// Scenario ID
    test: i64,
    /// Number of iterations
    repeats: i64,
    /// Give up on a response after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<u64>,
    /// Print each request before its response
    #[arg(long)]
    echo_requests: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            tracing::debug!(error = %e, "argument parsing failed");
            exit_with(ProbeError::Usage);
        }
    };

    if let Err(e) = run(args) {
        exit_with(e);
    }
}

fn run(args: Args) -> Result<()> {
    let config = ProbeConfig::from_args(&args.host, args.port, args.test, args.repeats)?
        .with_read_timeout(
            args.read_timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        );

    let Some(scenario) = Catalog::select(config.scenario)? else {
        tracing::info!(scenario = config.scenario, "reserved scenario, nothing to run");
        return Ok(());
    };

    let reporter = Reporter::new(io::stdout().lock()).with_echo_requests(args.echo_requests);
    let mut engine = Engine::new(config, scenario, reporter, ThreadPacer);
    engine.run()?;
    Ok(())
}

fn exit_with(error: ProbeError) -> ! {
    if !matches!(error, ProbeError::Usage) {
        println!("\n{error}");
    }
    if error.wants_usage() {
        println!("{USAGE}");
    }
    process::exit(error.exit_code());
}
