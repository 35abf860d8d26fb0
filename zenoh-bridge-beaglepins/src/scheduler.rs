//! The capture-and-publish loop.
//!
//! ```text
//! Initializing --initialize()--> Running --shutdown--> Stopped
//! ```
//!
//! Cycles run strictly one after another on the calling task. Shutdown
//! is only observed between cycles, so a cycle in progress always
//! finishes its reads and its publish attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, SetupReport};
use crate::board::{AnalogInputs, DeviceProbe, DigitalLines};
use crate::error::{BridgeError, Result};
use crate::publisher::{Publisher, SnapshotSink};
use crate::snapshot::Snapshot;
use crate::status::StatusReporter;

/// How cycle start times are spaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Cycles start at `t0 + k * period`. A tick missed by an overrunning
    /// cycle is skipped rather than replayed.
    #[default]
    FixedRate,
    /// Sleep a full period after each cycle ends.
    FixedDelay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Initializing,
    Running,
    Stopped,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Initializing => "initializing",
            SchedulerState::Running => "running",
            SchedulerState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters kept across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub published: u64,
    pub publish_failures: u64,
    /// Error markers in the most recent snapshot.
    pub last_error_markers: usize,
}

/// Drives [`Aggregator`] and [`Publisher`] on a fixed period.
pub struct Scheduler<L, A, P, S> {
    state: SchedulerState,
    aggregator: Aggregator<L, A, P>,
    publisher: Publisher<S>,
    period: Duration,
    mode: ScheduleMode,
    status: Option<StatusReporter>,
    stats: CycleStats,
}

impl<L, A, P, S> Scheduler<L, A, P, S>
where
    L: DigitalLines,
    A: AnalogInputs,
    P: DeviceProbe,
    S: SnapshotSink,
{
    pub fn new(
        aggregator: Aggregator<L, A, P>,
        publisher: Publisher<S>,
        period: Duration,
        mode: ScheduleMode,
    ) -> Self {
        Self {
            state: SchedulerState::Initializing,
            aggregator,
            publisher,
            period,
            mode,
            status: None,
            stats: CycleStats::default(),
        }
    }

    /// Publish running/offline status records on state changes.
    pub fn with_status(mut self, reporter: StatusReporter) -> Self {
        self.status = Some(reporter);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    fn expect_state(&self, expected: SchedulerState) -> Result<()> {
        if self.state != expected {
            return Err(BridgeError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: SchedulerState) {
        info!(from = %self.state, to = %next, "Scheduler state change");
        self.state = next;
    }

    /// One-time input setup, then enter `Running`.
    ///
    /// Lines or an ADC that fail to come up are tolerated; they report
    /// error markers from the first cycle on.
    pub async fn initialize(&mut self) -> Result<SetupReport> {
        self.expect_state(SchedulerState::Initializing)?;

        let report = self.aggregator.setup();
        self.transition(SchedulerState::Running);

        if let Some(status) = &self.status {
            if let Err(e) = status.publish_running(&self.publisher).await {
                warn!(error = %e, "Failed to publish running status");
            }
        }

        Ok(report)
    }

    /// Capture one snapshot and attempt to publish it once.
    pub async fn run_cycle(&mut self) -> Result<Snapshot> {
        self.expect_state(SchedulerState::Running)?;

        let snapshot = self.aggregator.capture();
        self.stats.cycles += 1;
        self.stats.last_error_markers = snapshot.error_count();

        info!(
            cycle = self.stats.cycles,
            errors = self.stats.last_error_markers,
            "{}",
            snapshot
        );

        match self.publisher.publish(&snapshot).await {
            Ok(bytes) => {
                self.stats.published += 1;
                debug!(key = %self.publisher.key(), bytes, "Published snapshot");
            }
            Err(e) => {
                self.stats.publish_failures += 1;
                warn!(key = %self.publisher.key(), error = %e, "Publish failed; snapshot dropped");
            }
        }

        Ok(snapshot)
    }

    /// Run cycles until `shutdown` completes, then stop.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<CycleStats>
    where
        F: Future<Output = ()>,
    {
        self.expect_state(SchedulerState::Running)?;
        if self.period.is_zero() {
            return Err(BridgeError::validation("sampling period must be non-zero"));
        }

        let mut shutdown = std::pin::pin!(shutdown);

        info!(
            period_secs = self.period.as_secs_f64(),
            mode = ?self.mode,
            sources = self.aggregator.catalog().len(),
            "Sampling started"
        );

        let origin = Instant::now();
        let mut deadline = origin;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep_until(deadline) => {}
            }

            let started = Instant::now();
            self.run_cycle().await?;
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Cycle finished");

            deadline = self.next_deadline(origin, Instant::now());
        }

        info!("Shutdown requested");
        self.stop().await;
        Ok(self.stats)
    }

    /// Start time of the cycle after one that finished at `now`.
    ///
    /// Fixed rate picks the first boundary `origin + k * period` strictly
    /// after `now`, so boundaries passed during an overrun are dropped.
    fn next_deadline(&self, origin: Instant, now: Instant) -> Instant {
        match self.mode {
            ScheduleMode::FixedRate => {
                let since = now.saturating_duration_since(origin);
                let into_period = since.as_nanos() % self.period.as_nanos();
                now + (self.period - Duration::from_nanos(into_period as u64))
            }
            ScheduleMode::FixedDelay => now + self.period,
        }
    }

    /// Release claimed inputs and enter `Stopped`. Idempotent.
    pub async fn stop(&mut self) {
        if self.state == SchedulerState::Stopped {
            return;
        }

        let released = self.aggregator.release();
        let was_running = self.state == SchedulerState::Running;
        self.transition(SchedulerState::Stopped);

        if was_running {
            if let Some(status) = &self.status {
                if let Err(e) = status.publish_offline(&self.publisher).await {
                    warn!(error = %e, "Failed to publish offline status");
                }
            }
        }

        info!(
            released,
            cycles = self.stats.cycles,
            published = self.stats.published,
            publish_failures = self.stats.publish_failures,
            "Sampling stopped"
        );
    }
}
