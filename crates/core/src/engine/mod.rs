//! Scenario execution.
//!
//! The [`Engine`] repeats a [`Scenario`] for the configured number of
//! iterations, pausing between them. Each iteration runs one of three
//! strategies (see [`Strategy`]):
//!
//! | Strategy | Connections | Requests |
//! |----------|-------------|----------|
//! | Success | one, closed at the end | all steps, substituted |
//! | Error | one per step, held until the iteration ends | each step's literal text |
//! | Timeout | N-1, left idle | connection *x* gets steps `0..=x`, substituted |
//!
//! The timeout strategy finishes by sleeping past the target's idle
//! timeout and is never repeated.
//!
//! Everything runs on the calling thread, one blocking call at a time.
//! Any connect failure aborts the whole run.

mod strategy;

use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::catalog::{Scenario, Strategy};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::report::Reporter;

/// Source of the run's sleeps.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        tracing::trace!(?duration, "pausing");
        thread::sleep(duration);
    }
}

/// Totals for a completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u32,
    /// Request/response pairs reported.
    pub exchanges: usize,
    /// TCP connections opened.
    pub connections: usize,
}

pub struct Engine<W: Write, P: Pacer> {
    config: ProbeConfig,
    scenario: Scenario,
    reporter: Reporter<W>,
    pacer: P,
    summary: RunSummary,
}

impl<W: Write, P: Pacer> Engine<W, P> {
    pub fn new(config: ProbeConfig, scenario: Scenario, reporter: Reporter<W>, pacer: P) -> Self {
        Engine {
            config,
            scenario,
            reporter,
            pacer,
            summary: RunSummary::default(),
        }
    }

    /// Iterations actually run. The timeout scenario always runs once.
    pub fn effective_repeats(&self) -> u32 {
        match self.scenario.strategy {
            Strategy::Timeout => 1,
            Strategy::Success | Strategy::Error => self.config.repeats,
        }
    }

    /// Run every iteration. Stops at the first connect failure.
    pub fn run(&mut self) -> Result<RunSummary> {
        let repeats = self.effective_repeats();
        if repeats != self.config.repeats {
            tracing::info!(
                requested = self.config.repeats,
                "timeout scenario runs a single iteration"
            );
        }

        tracing::info!(
            target = %self.config.addr(),
            scenario = self.scenario.id,
            strategy = ?self.scenario.strategy,
            steps = self.scenario.steps.len(),
            repeats,
            "starting run"
        );

        for iteration in 1..=repeats {
            self.reporter.iteration(self.scenario.id, iteration)?;

            match self.scenario.strategy {
                Strategy::Success => self.run_success()?,
                Strategy::Error => self.run_error()?,
                Strategy::Timeout => self.run_timeout()?,
            }

            self.reporter.flush()?;
            self.summary.iterations += 1;
            self.pacer.pause(self.config.pacing);
        }

        tracing::info!(
            iterations = self.summary.iterations,
            exchanges = self.summary.exchanges,
            connections = self.summary.connections,
            "run complete"
        );
        Ok(self.summary)
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Hand back the reporter and pacer, e.g. to inspect output in tests.
    pub fn into_parts(self) -> (Reporter<W>, P) {
        (self.reporter, self.pacer)
    }
}
