//! Integration tests: run each strategy against an in-process stub server.
//!
//! The stub accepts on an ephemeral port, records every request it reads
//! (tagged with the accept order of its connection) and answers through a
//! fixed responder. Sleeps go through a recording pacer, so the timeout
//! scenario returns immediately.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rtsp_probe::catalog::{SESSION_LABELS, SESSION_TEMPLATES};
use rtsp_probe::{
    Catalog, Engine, Pacer, ProbeConfig, ProbeError, Reporter, Scenario, Strategy,
};

type Responder = fn(&[u8]) -> Vec<u8>;
type RequestLog = Arc<Mutex<Vec<(usize, Vec<u8>)>>>;

struct StubServer {
    port: u16,
    log: RequestLog,
}

impl StubServer {
    fn start(responder: Responder) -> Self {
        Self::start_with_limit(responder, usize::MAX)
    }

    /// Stop listening once `limit` connections have been accepted. The last
    /// one is served only after the listener is gone, so the next connect
    /// attempt is refused.
    fn start_with_limit(responder: Responder, limit: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let port = listener.local_addr().unwrap().port();
        let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let shared = log.clone();

        thread::spawn(move || {
            for conn_id in 0..limit {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let log = shared.clone();
                if conn_id + 1 == limit {
                    drop(listener);
                    serve(conn_id, stream, responder, log);
                    return;
                }
                thread::spawn(move || serve(conn_id, stream, responder, log));
            }
        });

        StubServer { port, log }
    }

    fn requests(&self) -> Vec<(usize, String)> {
        self.log
            .lock()
            .iter()
            .map(|(conn, bytes)| (*conn, String::from_utf8_lossy(bytes).into_owned()))
            .collect()
    }

    fn raw_requests(&self) -> Vec<Vec<u8>> {
        self.log.lock().iter().map(|(_, bytes)| bytes.clone()).collect()
    }

    fn per_connection_counts(&self) -> Vec<usize> {
        let log = self.log.lock();
        let connections = log.iter().map(|(conn, _)| conn + 1).max().unwrap_or(0);
        let mut counts = vec![0; connections];
        for (conn, _) in log.iter() {
            counts[*conn] += 1;
        }
        counts
    }
}

fn serve(conn_id: usize, mut stream: TcpStream, responder: Responder, log: RequestLog) {
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        log.lock().push((conn_id, buf[..n].to_vec()));
        if stream.write_all(&responder(&buf[..n])).is_err() {
            return;
        }
    }
}

fn cseq_of(request: &str) -> Option<&str> {
    request.split("\r\n").find_map(|l| l.strip_prefix("CSeq: "))
}

/// Minimal well-behaved server. SETUP hands out `XYZ`; PLAY then claims a
/// different session to check the probe keeps the first one.
fn rtsp_responder(request: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(request);
    let method = text.split(' ').next().unwrap_or("");
    let cseq = cseq_of(&text).unwrap_or("0");
    let session = match method {
        "SETUP" => "Session: XYZ;timeout=60\r\n",
        "PLAY" => "Session: OTHER;timeout=60\r\n",
        _ => "",
    };
    format!("RTSP/1.0 200 OK\r\nCSeq: {cseq}\r\n{session}\r\n").into_bytes()
}

fn bad_request_responder(_request: &[u8]) -> Vec<u8> {
    b"RTSP/1.0 400 Bad Request\r\n\r\n".to_vec()
}

#[derive(Default)]
struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

fn config(host: &str, port: u16, scenario: u8, repeats: u32) -> ProbeConfig {
    ProbeConfig::from_args(host, port as i64, scenario as i64, repeats as i64)
        .expect("valid args")
        .with_read_timeout(Some(Duration::from_secs(5)))
}

fn engine(config: ProbeConfig, scenario: Scenario) -> Engine<Vec<u8>, RecordingPacer> {
    Engine::new(
        config,
        scenario,
        Reporter::new(Vec::new()),
        RecordingPacer::default(),
    )
}

fn output_of(engine: Engine<Vec<u8>, RecordingPacer>) -> (String, Vec<Duration>) {
    let (reporter, pacer) = engine.into_parts();
    (
        String::from_utf8_lossy(&reporter.into_inner()).into_owned(),
        pacer.pauses,
    )
}

#[test]
fn success_scenario_propagates_session_id() {
    let stub = StubServer::start(rtsp_responder);
    let scenario = Catalog::select(1).unwrap().unwrap();
    let mut engine = engine(config("localhost", stub.port, 1, 1), scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.connections, 1);
    assert_eq!(summary.exchanges, 5);

    let requests = stub.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|(conn, _)| *conn == 0));

    let methods: Vec<&str> = requests
        .iter()
        .map(|(_, r)| r.split(' ').next().unwrap())
        .collect();
    assert_eq!(methods, ["OPTIONS", "DESCRIBE", "SETUP", "PLAY", "TEARDOWN"]);

    let cseqs: Vec<&str> = requests.iter().map(|(_, r)| cseq_of(r).unwrap()).collect();
    assert_eq!(cseqs, ["1", "2", "3", "4", "5"]);

    for (_, request) in &requests[..3] {
        assert!(!request.contains("Session:"), "unexpected session: {request}");
    }
    for (_, request) in &requests[3..] {
        assert!(request.contains("\r\nSession: XYZ\r\n"), "missing session: {request}");
    }

    let (output, pauses) = output_of(engine);
    assert_eq!(output.matches(">>> Parsed session ID: XYZ").count(), 1);
    assert_eq!(output.matches("Sending: ").count(), 5);
    assert!(output.contains("Test 1 -    1. iteration"));
    assert_eq!(pauses, [Duration::from_millis(500)]);
}

#[test]
fn success_scenario_repeats_on_fresh_connections() {
    let stub = StubServer::start(rtsp_responder);
    let scenario = Catalog::select(1).unwrap().unwrap();
    let mut engine = engine(config("127.0.0.1", stub.port, 1, 3), scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.connections, 3);
    assert_eq!(summary.exchanges, 15);
    assert_eq!(stub.per_connection_counts(), [5, 5, 5]);

    // CSeq restarts on every connection.
    for (_, request) in stub.requests().iter().filter(|(_, r)| r.starts_with("OPTIONS")) {
        assert_eq!(cseq_of(request), Some("1"));
    }

    let (output, pauses) = output_of(engine);
    assert!(output.contains("Test 1 -    3. iteration"));
    assert_eq!(pauses.len(), 3);
}

#[test]
fn error_scenario_sends_literal_templates_one_connection_each() {
    let stub = StubServer::start(bad_request_responder);
    let scenario = Catalog::select(2).unwrap().unwrap();
    let expected: Vec<Vec<u8>> = scenario
        .steps
        .iter()
        .map(|step| step.template.literal())
        .collect();
    let mut engine = engine(config("127.0.0.1", stub.port, 2, 1), scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.connections, 11);
    assert_eq!(summary.exchanges, 11);

    assert_eq!(stub.raw_requests(), expected);
    assert_eq!(stub.per_connection_counts(), vec![1; 11]);

    let (output, _) = output_of(engine);
    assert_eq!(output.matches("RTSP/1.0 400 Bad Request").count(), 11);
    assert!(output.contains("Sending: msg without terminating chars"));
    assert!(!output.contains(">>> Parsed session ID"));
}

#[test]
fn error_scenario_aborts_on_connect_failure() {
    let stub = StubServer::start_with_limit(bad_request_responder, 3);
    let scenario = Catalog::select(2).unwrap().unwrap();
    let mut engine = engine(config("127.0.0.1", stub.port, 2, 5), scenario);

    let err = engine.run().unwrap_err();
    assert!(matches!(err, ProbeError::Connect { .. }));
    assert_eq!(err.exit_code(), -1);

    let summary = engine.summary();
    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.exchanges, 3);
    assert_eq!(stub.requests().len(), 3);

    let (_, pauses) = output_of(engine);
    assert!(pauses.is_empty());
}

#[test]
fn success_scenario_fails_fast_without_listener() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let scenario = Catalog::select(1).unwrap().unwrap();
    let mut engine = engine(config("127.0.0.1", port, 1, 10), scenario);

    let err = engine.run().unwrap_err();
    assert!(matches!(err, ProbeError::Connect { .. }));
    assert_eq!(engine.summary().exchanges, 0);
}

#[test]
fn timeout_scenario_with_four_steps() {
    let stub = StubServer::start(rtsp_responder);
    let scenario = Scenario::from_tables(
        3,
        Strategy::Timeout,
        &SESSION_TEMPLATES[..4],
        &SESSION_LABELS[..4],
    )
    .unwrap();
    let mut engine = engine(config("127.0.0.1", stub.port, 3, 1), scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.connections, 3);
    assert_eq!(summary.exchanges, 6);

    let mut counts = stub.per_connection_counts();
    counts.sort_unstable();
    assert_eq!(counts, [1, 2, 3]);

    // Every connection starts its own CSeq sequence and session.
    for conn in 0..3 {
        let cseqs: Vec<String> = stub
            .requests()
            .iter()
            .filter(|(c, _)| *c == conn)
            .map(|(_, r)| cseq_of(r).unwrap().to_string())
            .collect();
        let expected: Vec<String> = (1..=cseqs.len()).map(|n| n.to_string()).collect();
        assert_eq!(cseqs, expected);
    }

    // Connection x only sends steps 0..=x, so the last step never goes out.
    let requests = stub.requests();
    assert!(!requests.iter().any(|(_, r)| r.starts_with("PLAY")));

    let setups: Vec<usize> = requests
        .iter()
        .filter(|(_, r)| r.starts_with("SETUP"))
        .map(|(conn, _)| *conn)
        .collect();
    assert_eq!(setups.len(), 1);
    assert_eq!(stub.per_connection_counts()[setups[0]], 3);

    let (_, pauses) = output_of(engine);
    assert_eq!(pauses, [Duration::from_secs(62), Duration::from_millis(500)]);
}

#[test]
fn timeout_scenario_ignores_requested_repeats() {
    let stub = StubServer::start(rtsp_responder);
    let scenario = Catalog::select(3).unwrap().unwrap();
    let mut engine = engine(config("127.0.0.1", stub.port, 3, 50), scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.connections, 4);
    assert_eq!(summary.exchanges, 1 + 2 + 3 + 4);

    let requests = stub.requests();
    assert!(!requests.iter().any(|(_, r)| r.starts_with("TEARDOWN")));

    let play: Vec<&(usize, String)> = requests
        .iter()
        .filter(|(_, r)| r.starts_with("PLAY"))
        .collect();
    assert_eq!(play.len(), 1);
    let (play_conn, play_request) = play[0];
    assert!(play_request.contains("\r\nSession: XYZ\r\n"), "{play_request}");
    assert_eq!(stub.per_connection_counts()[*play_conn], 4);

    // The session captured on the PLAY connection came from its own SETUP.
    let setup_on_same_conn = requests
        .iter()
        .any(|(conn, r)| conn == play_conn && r.starts_with("SETUP"));
    assert!(setup_on_same_conn);

    let (output, pauses) = output_of(engine);
    assert_eq!(output.matches("iteration").count(), 1);
    assert_eq!(pauses.iter().filter(|d| **d >= Duration::from_secs(62)).count(), 1);
}

#[test]
fn silent_target_degrades_to_empty_responses() {
    let stub = StubServer::start(|_| Vec::new());
    let scenario = Catalog::select(1).unwrap().unwrap();
    let config = config("127.0.0.1", stub.port, 1, 1)
        .with_read_timeout(Some(Duration::from_millis(100)))
        .with_pacing(Duration::ZERO);
    let mut engine = engine(config, scenario);

    let summary = engine.run().expect("run");
    assert_eq!(summary.exchanges, 5);

    // No session was ever captured, so the slot stays empty.
    let teardown = stub
        .requests()
        .into_iter()
        .find(|(_, r)| r.starts_with("TEARDOWN"))
        .map(|(_, r)| r)
        .unwrap();
    assert!(teardown.contains("CSeq: 5\r\nSession: \r\n"));
}
