//! The polling loop.
//!
//! ```text
//!   resolve config ──▶ Running ──interrupt──▶ AwaitingDecision ──stop──▶ Stopped
//!                        ▲                          │
//!                        └────────continue──────────┘
//! ```
//!
//! Each `Running` step reads every configured series once, feeds the values
//! to the [`SampleBuffer`] and the [`WindowAggregator`], renders, then waits
//! for the interval. The wait is the only suspension point and returns early
//! when the [`Interrupt`] is raised. An interrupt that arrives mid-cycle is
//! honoured once the cycle's reads have finished, so a sample is never half
//! recorded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::buffer::{FlushReport, SampleBuffer};
use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::sensor::SensorSource;
use crate::series::Series;
use crate::units::TemperatureUnit;
use crate::window::{SeriesFrame, WindowAggregator};

/// Granularity of the default interruptible wait.
pub const WAIT_TICK: Duration = Duration::from_millis(10);

/// End of a wait starting now. `None` when `interval` is too large to be
/// represented, meaning the wait only ends on interrupt.
pub fn wait_deadline(interval: Duration) -> Option<Instant> {
    Instant::now().checked_add(interval)
}

/// How long to block before checking the interrupt again, or `None` once
/// `deadline` has passed.
pub fn next_tick(deadline: Option<Instant>) -> Option<Duration> {
    let Some(deadline) = deadline else {
        return Some(WAIT_TICK);
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        None
    } else {
        Some(WAIT_TICK.min(remaining))
    }
}

// ---------------------------------------------------------------------------
// Interrupt
// ---------------------------------------------------------------------------

/// Cancellation flag shared between the loop, signal handlers and frontends.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Frontend
// ---------------------------------------------------------------------------

/// Operator answer at the interrupt prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stop,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    AwaitingDecision,
    Stopped,
}

/// Result of polling every series once.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Converted values that entered the buffer and the windows.
    pub readings: Vec<(Series, f64)>,
    /// Per-series read failures and non-fatal persistence errors.
    pub errors: Vec<Error>,
    /// Set when this cycle triggered a successful flush.
    pub flushed: Option<FlushReport>,
}

impl CycleReport {
    pub fn reading(&self, series: Series) -> Option<f64> {
        self.readings
            .iter()
            .find(|(s, _)| *s == series)
            .map(|(_, v)| *v)
    }
}

/// Everything a frontend needs to draw one frame.
pub struct View<'a> {
    pub frames: &'a [SeriesFrame],
    pub report: &'a CycleReport,
    pub unit: TemperatureUnit,
    pub buffer: &'a SampleBuffer,
    pub interval: Duration,
}

/// Terminal side of the loop: drawing, waiting, and the stop prompt.
pub trait Frontend {
    fn render(&mut self, view: &View<'_>) -> std::io::Result<()>;

    /// Block for `interval` or until `interrupt` is raised.
    fn wait(&mut self, interval: Duration, interrupt: &Interrupt) -> std::io::Result<()> {
        let deadline = wait_deadline(interval);
        while !interrupt.is_raised() {
            let Some(tick) = next_tick(deadline) else {
                break;
            };
            thread::sleep(tick);
        }
        Ok(())
    }

    /// Ask the operator whether to stop. Blocks until answered.
    fn confirm_stop(&mut self) -> std::io::Result<Decision>;
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Totals reported after the loop stops.
#[derive(Debug)]
pub struct RunSummary {
    pub cycles: u64,
    pub rows_written: u64,
    /// Error from the final flush; the values it covered are still unsaved.
    pub final_flush_error: Option<Error>,
    pub unsaved: usize,
}

pub struct Monitor<'a, S: SensorSource + ?Sized> {
    config: &'a MonitorConfig,
    sensors: &'a S,
    buffer: SampleBuffer,
    windows: WindowAggregator,
    interrupt: Interrupt,
    state: LoopState,
    cycle: u64,
    last_report: CycleReport,
}

impl<'a, S: SensorSource + ?Sized> Monitor<'a, S> {
    pub fn new(config: &'a MonitorConfig, sensors: &'a S, interrupt: Interrupt) -> Self {
        let buffer = SampleBuffer::new(
            config.output.clone(),
            config.flush_threshold,
            config.alignment,
        );
        let mut windows = WindowAggregator::new(config.max_window);
        for &series in &config.series {
            windows.register(
                series,
                series.label(),
                config.track_peak,
                config.track_current,
            );
        }

        Self {
            config,
            sensors,
            buffer,
            windows,
            interrupt,
            state: LoopState::Running,
            cycle: 0,
            last_report: CycleReport::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn windows(&self) -> &WindowAggregator {
        &self.windows
    }

    pub fn last_report(&self) -> &CycleReport {
        &self.last_report
    }

    /// Read every configured series once.
    ///
    /// Only fatal errors are returned; everything else is collected in the
    /// report so the remaining series still get polled.
    pub fn poll_cycle(&mut self) -> Result<()> {
        self.cycle += 1;
        let mut report = CycleReport {
            cycle: self.cycle,
            ..Default::default()
        };

        for &series in &self.config.series {
            let celsius = match self.sensors.read(series) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("cycle {}: {e}", self.cycle);
                    report.errors.push(e);
                    continue;
                }
            };
            let value = self.config.unit.convert(celsius);
            report.readings.push((series, value));

            match self.buffer.record(series, value) {
                Ok(Some(flush)) => report.flushed = Some(flush),
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("{e}; keeping {} value(s) buffered", self.buffer.pending_count());
                    report.errors.push(e);
                }
            }
            self.windows.append(series, value)?;
        }

        log::debug!(
            "cycle {}: {} reading(s), {} error(s), {} pending",
            report.cycle,
            report.readings.len(),
            report.errors.len(),
            self.buffer.pending_count()
        );
        self.last_report = report;
        Ok(())
    }

    /// Advance the state machine by one transition.
    pub fn step<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> Result<LoopState> {
        self.state = match self.state {
            LoopState::Running => {
                self.poll_cycle()?;
                let frames = self.windows.frame();
                frontend.render(&View {
                    frames: &frames,
                    report: &self.last_report,
                    unit: self.config.unit,
                    buffer: &self.buffer,
                    interval: self.config.interval,
                })?;
                if !self.interrupt.is_raised() {
                    frontend.wait(self.config.interval, &self.interrupt)?;
                }
                if self.interrupt.take() {
                    LoopState::AwaitingDecision
                } else {
                    LoopState::Running
                }
            }
            LoopState::AwaitingDecision => {
                let decision = frontend.confirm_stop()?;
                // A second interrupt while the prompt was up is the same request.
                self.interrupt.take();
                match decision {
                    Decision::Stop => LoopState::Stopped,
                    Decision::Continue => LoopState::Running,
                }
            }
            LoopState::Stopped => LoopState::Stopped,
        };
        Ok(self.state)
    }

    /// Run until the operator stops the loop or a fatal error occurs. The
    /// buffer gets a final flush either way.
    pub fn run<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> Result<RunSummary> {
        let outcome = loop {
            match self.step(frontend) {
                Ok(LoopState::Stopped) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };

        let summary = self.shutdown();
        outcome.map(|()| summary)
    }

    /// Final flush and totals. Leaves the loop in `Stopped`.
    pub fn shutdown(&mut self) -> RunSummary {
        self.state = LoopState::Stopped;
        let final_flush_error = match self.buffer.finish() {
            Ok(_) => None,
            Err(e) => {
                log::error!("final flush failed: {e}");
                Some(e)
            }
        };
        RunSummary {
            cycles: self.cycle,
            rows_written: self.buffer.rows_written(),
            final_flush_error,
            unsaved: self.buffer.pending_count(),
        }
    }
}
