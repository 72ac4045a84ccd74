use std::io::Write;

use super::{Engine, Pacer};
use crate::catalog::RequestSpec;
use crate::error::Result;
use crate::protocol::StatusLine;
use crate::report::Exchange;
use crate::session::SessionContext;
use crate::transport::Connection;

impl<W: Write, P: Pacer> Engine<W, P> {
    /// Every step on one connection, threading CSeq and session through.
    pub(super) fn run_success(&mut self) -> Result<()> {
        let mut conn = self.connect()?;
        let mut ctx = SessionContext::new();

        self.reporter.begin()?;
        let steps = self.scenario.steps.clone();
        for spec in &steps {
            self.substituted_step(&mut conn, &mut ctx, spec)?;
        }

        conn.close();
        Ok(())
    }

    /// Each malformed request, verbatim, on a connection of its own.
    ///
    /// Connections stay open until every request has been sent so the
    /// target sees them pile up, then drop together.
    pub(super) fn run_error(&mut self) -> Result<()> {
        let mut held = Vec::with_capacity(self.scenario.steps.len());

        self.reporter.begin()?;
        let steps = self.scenario.steps.clone();
        for spec in &steps {
            let mut conn = self.connect()?;
            if spec.template.slots().next().is_some() {
                tracing::warn!(step = spec.label, "slots left unfilled in literal request");
            }
            let request = spec.template.literal();

            conn.send(&request);
            let response = conn.receive();
            log_exchange(&conn, spec, &response);

            self.report(Exchange {
                label: spec.label,
                request: &request,
                response: &response,
                captured_session: None,
            })?;
            held.push(conn);
        }

        tracing::debug!(connections = held.len(), "releasing held connections");
        Ok(())
    }

    /// Drive growing request prefixes on N-1 connections and leave them
    /// idle past the target's timeout.
    ///
    /// All connections are opened before the first request is sent.
    /// Connection `x` gets its own context and steps `0..=x`.
    pub(super) fn run_timeout(&mut self) -> Result<()> {
        let steps = self.scenario.steps.clone();
        let count = steps.len().saturating_sub(1);

        let mut connections = Vec::with_capacity(count);
        for _ in 0..count {
            connections.push(self.connect()?);
        }

        self.reporter.begin()?;
        for (x, conn) in connections.iter_mut().enumerate() {
            let mut ctx = SessionContext::new();
            for spec in &steps[..=x] {
                self.substituted_step(conn, &mut ctx, spec)?;
            }
        }

        tracing::info!(
            connections = connections.len(),
            wait = ?self.config.idle_wait,
            "waiting for target idle timeout"
        );
        self.pacer.pause(self.config.idle_wait);
        Ok(())
    }

    fn connect(&mut self) -> Result<Connection> {
        let conn = Connection::open(&self.config)?;
        self.summary.connections += 1;
        Ok(conn)
    }

    /// Render, send, advance CSeq, receive, capture the session, report.
    fn substituted_step(
        &mut self,
        conn: &mut Connection,
        ctx: &mut SessionContext,
        spec: &RequestSpec,
    ) -> Result<()> {
        let request = spec.template.render(ctx);
        conn.send(&request);
        ctx.advance();

        let response = conn.receive();
        log_exchange(conn, spec, &response);

        let captured = ctx
            .capture(&String::from_utf8_lossy(&response))
            .map(str::to_string);

        self.report(Exchange {
            label: spec.label,
            request: &request,
            response: &response,
            captured_session: captured.as_deref(),
        })
    }

    fn report(&mut self, exchange: Exchange<'_>) -> Result<()> {
        self.summary.exchanges += 1;
        self.reporter.exchange(&exchange)
    }
}

fn log_exchange(conn: &Connection, spec: &RequestSpec, response: &[u8]) {
    match StatusLine::parse(&String::from_utf8_lossy(response)) {
        Some(status) => tracing::debug!(
            conn = conn.id(),
            step = spec.label,
            status = status.status_code,
            ok = status.is_success(),
            reason = %status.reason,
            "exchange"
        ),
        None => tracing::debug!(
            conn = conn.id(),
            step = spec.label,
            bytes = response.len(),
            "exchange without status line"
        ),
    }
}
