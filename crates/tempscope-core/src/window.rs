//! Bounded per-series display windows with peak and current tracking.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::series::Series;

/// Default number of chart slots per series.
pub const DEFAULT_MAX_WINDOW: usize = 20;

/// An optional statistic that is either switched off or holds the latest
/// computed value. Zero is a legitimate reading, so "unset" is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tracker {
    pub enabled: bool,
    pub value: Option<f64>,
}

impl Tracker {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            value: None,
        }
    }

    fn observe_max(&mut self, v: f64) {
        if !self.enabled {
            return;
        }
        self.value = Some(match self.value {
            Some(peak) if peak >= v => peak,
            _ => v,
        });
    }

    fn observe_latest(&mut self, v: f64) {
        if self.enabled {
            self.value = Some(v);
        }
    }
}

#[derive(Debug, Clone)]
struct SeriesWindow {
    series: Series,
    label: String,
    data: VecDeque<f64>,
    peak: Tracker,
    current: Tracker,
}

/// Renderable state of one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesFrame {
    pub series: Series,
    pub label: String,
    pub data: Vec<f64>,
    pub peak: Option<f64>,
    pub current: Option<f64>,
}

impl SeriesFrame {
    /// `", peak: 71.5"` when peak tracking has a value.
    pub fn peak_suffix(&self) -> Option<String> {
        self.peak.map(|p| format!(", peak: {p:.1}"))
    }

    /// `", current: 64"` when current tracking has a value.
    pub fn current_suffix(&self) -> Option<String> {
        self.current.map(|c| format!(", current: {c:.1}"))
    }

    /// Legend label with both suffixes applied.
    pub fn legend(&self) -> String {
        let mut s = self.label.clone();
        if let Some(p) = self.peak_suffix() {
            s.push_str(&p);
        }
        if let Some(c) = self.current_suffix() {
            s.push_str(&c);
        }
        s
    }
}

/// Rolling display windows for every registered series.
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    max_window: usize,
    windows: Vec<SeriesWindow>,
}

impl WindowAggregator {
    pub fn new(max_window: usize) -> Self {
        Self {
            max_window,
            windows: Vec::new(),
        }
    }

    pub fn max_window(&self) -> usize {
        self.max_window
    }

    /// Register `series` for display. Registering again resets its data and
    /// trackers but keeps its position.
    pub fn register(
        &mut self,
        series: Series,
        label: impl Into<String>,
        track_peak: bool,
        track_current: bool,
    ) {
        let window = SeriesWindow {
            series,
            label: label.into(),
            data: VecDeque::with_capacity(self.max_window),
            peak: Tracker::new(track_peak),
            current: Tracker::new(track_current),
        };
        match self.windows.iter_mut().find(|w| w.series == series) {
            Some(existing) => *existing = window,
            None => self.windows.push(window),
        }
    }

    pub fn is_registered(&self, series: Series) -> bool {
        self.windows.iter().any(|w| w.series == series)
    }

    /// Append a value, evicting the oldest entries first.
    ///
    /// Eviction runs while `len + 1 >= max_window`, so after the append the
    /// window holds at most `max_window - 1` values.
    pub fn append(&mut self, series: Series, value: f64) -> Result<()> {
        let limit = self.max_window.saturating_sub(1);
        let window = self
            .windows
            .iter_mut()
            .find(|w| w.series == series)
            .ok_or(Error::UnknownSeries(series))?;

        while !window.data.is_empty() && window.data.len() + 1 >= self.max_window {
            window.data.pop_front();
        }
        if window.data.len() < limit {
            window.data.push_back(value);
        }

        window.peak.observe_max(value);
        window.current.observe_latest(value);
        Ok(())
    }

    /// Current renderable state, in registration order.
    pub fn frame(&self) -> Vec<SeriesFrame> {
        self.windows
            .iter()
            .map(|w| SeriesFrame {
                series: w.series,
                label: w.label.clone(),
                data: w.data.iter().copied().collect(),
                peak: w.peak.value,
                current: w.current.value,
            })
            .collect()
    }

    /// Peak tracker for one series.
    pub fn peak(&self, series: Series) -> Option<Tracker> {
        self.windows
            .iter()
            .find(|w| w.series == series)
            .map(|w| w.peak)
    }

    /// Current-value tracker for one series.
    pub fn current(&self, series: Series) -> Option<Tracker> {
        self.windows
            .iter()
            .find(|w| w.series == series)
            .map(|w| w.current)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WINDOW)
    }
}
