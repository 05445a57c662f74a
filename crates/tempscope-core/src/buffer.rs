//! In-memory sample buffer with threshold-triggered CSV flushes.
//!
//! Samples are accumulated per series in arrival order. Once the total number
//! of buffered values across all series reaches the flush threshold the buffer
//! is written to the output file as aligned rows and cleared.
//!
//! # Storage Format
//!
//! The output is a comma-separated UTF-8 file opened in append mode:
//! - header row: sorted series names, written only when the file is new
//! - one data row per aligned sample batch, columns in the same order
//!
//! A failed write leaves the buffer untouched so the same samples are offered
//! again on the next flush (at-least-once delivery).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::series::Series;

/// Buffered values that trigger a flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 50;

/// How a flush treats series of unequal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentPolicy {
    /// Write `pending_count / series` rows (clamped to the shortest series)
    /// and drop whatever is left over.
    ///
    /// Rows pair values by position, not by cycle. After a missed reading
    /// the threshold can be reached partway through a cycle, so the rest of
    /// that cycle opens the next buffer and later rows stay shifted by one
    /// cycle between series until another gap realigns them.
    #[default]
    Truncate,
    /// Refuse to write unless every series holds the same number of values.
    Lockstep,
}

/// Outcome of one successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Data rows appended to the file.
    pub rows: usize,
    /// Buffered values discarded because they did not complete a row.
    pub dropped: usize,
}

/// Accumulates samples and writes them out in aligned rows.
#[derive(Debug)]
pub struct SampleBuffer {
    output: Option<PathBuf>,
    threshold: usize,
    policy: AlignmentPolicy,
    pending: BTreeMap<Series, Vec<f64>>,
    pending_count: usize,
    rows_written: u64,
    flushes: u64,
}

impl SampleBuffer {
    /// Create a buffer writing to `output`. With `None` every call is a no-op.
    pub fn new(output: Option<PathBuf>, threshold: usize, policy: AlignmentPolicy) -> Self {
        Self {
            output,
            threshold: threshold.max(1),
            policy,
            pending: BTreeMap::new(),
            pending_count: 0,
            rows_written: 0,
            flushes: 0,
        }
    }

    /// A buffer with no output destination.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_FLUSH_THRESHOLD, AlignmentPolicy::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    /// Buffer one value; flush synchronously if the threshold is reached.
    ///
    /// Returns the flush report when this call triggered a successful flush.
    /// A failed flush returns the error with the buffer left intact, including
    /// the value just recorded.
    pub fn record(&mut self, series: Series, value: f64) -> Result<Option<FlushReport>> {
        if self.output.is_none() {
            return Ok(None);
        }

        self.pending.entry(series).or_default().push(value);
        self.pending_count += 1;

        if self.pending_count >= self.threshold {
            return self.flush().map(Some);
        }
        Ok(None)
    }

    /// Write every complete row to the output file and clear the buffer.
    pub fn flush(&mut self) -> Result<FlushReport> {
        let Some(path) = self.output.clone() else {
            return Ok(FlushReport::default());
        };
        if self.pending.is_empty() {
            return Ok(FlushReport::default());
        }

        let columns: Vec<Series> = self.pending.keys().copied().collect();
        let shortest = self.pending.values().map(Vec::len).min().unwrap_or(0);

        if self.policy == AlignmentPolicy::Lockstep
            && self.pending.values().any(|v| v.len() != shortest)
        {
            return Err(Error::MisalignedSeries {
                counts: self.describe_counts(),
            });
        }

        let rows = (self.pending_count / columns.len()).min(shortest);
        let payload = self.render_rows(&columns, rows, needs_header(&path));

        append(&path, &payload).map_err(|source| Error::Persistence {
            path: path.clone(),
            source,
        })?;

        let dropped = self.pending_count - rows * columns.len();
        if dropped > 0 {
            log::warn!(
                "{} buffered value(s) did not form complete rows and were dropped ({})",
                dropped,
                self.describe_counts()
            );
        }
        log::info!("flushed {rows} row(s) to {}", path.display());

        self.pending.clear();
        self.pending_count = 0;
        self.rows_written += rows as u64;
        self.flushes += 1;

        Ok(FlushReport { rows, dropped })
    }

    /// Best-effort final flush, regardless of the threshold. Call on shutdown.
    pub fn finish(&mut self) -> Result<FlushReport> {
        if self.pending_count > 0 {
            log::info!("final flush of {} buffered value(s)", self.pending_count);
        }
        self.flush()
    }

    fn render_rows(&self, columns: &[Series], rows: usize, header: bool) -> String {
        let mut out = String::new();
        if header {
            let names: Vec<&str> = columns.iter().map(|s| s.name()).collect();
            out.push_str(&names.join(","));
            out.push('\n');
        }
        for i in 0..rows {
            for (c, series) in columns.iter().enumerate() {
                if c > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}", self.pending[series][i]);
            }
            out.push('\n');
        }
        out
    }

    fn describe_counts(&self) -> String {
        self.pending
            .iter()
            .map(|(s, v)| format!("{s}={}", v.len()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Total values buffered since the last successful flush.
    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    /// Buffered values for one series.
    pub fn pending(&self, series: Series) -> &[f64] {
        self.pending.get(&series).map_or(&[], Vec::as_slice)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Data rows written over the lifetime of the buffer.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Successful flushes over the lifetime of the buffer.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

/// A header is due when the file is missing or was left empty by an earlier
/// failed write.
fn needs_header(path: &Path) -> bool {
    fs::metadata(path).map_or(true, |m| m.len() == 0)
}

fn append(path: &Path, payload: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(payload.as_bytes())?;
    writer.flush()
}
