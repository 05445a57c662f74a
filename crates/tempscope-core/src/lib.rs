//! # tempscope-core
//!
//! **Watch your CPU and GPU heat up, one sample at a time.**
//!
//! `tempscope-core` is the sampling pipeline behind the `tempscope` terminal
//! monitor: it probes temperature sensors once at startup, polls them at a
//! fixed cadence, keeps a bounded rolling window per series for display, and
//! optionally persists every reading to a CSV file in aligned rows.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tempscope_core::{MonitorConfig, MonitorOptions, SystemSensors};
//!
//! let sensors = SystemSensors::detect();
//! let options = MonitorOptions {
//!     output: Some("stats.csv".into()),
//!     track_peak: true,
//!     ..Default::default()
//! };
//! let config = MonitorConfig::resolve(&options, &sensors).expect("valid options");
//! println!("polling {:?} every {:?}", config.series, config.interval);
//! ```
//!
//! ## Architecture
//!
//! Sensors → Monitor loop → { SampleBuffer (CSV), WindowAggregator (chart) } → Frontend
//!
//! - [`SampleBuffer`] counts values across all series and flushes once the
//!   threshold is reached; a failed write keeps everything for the next try.
//! - [`WindowAggregator`] evicts before inserting so each series shows at most
//!   `max_window - 1` points, with optional peak and current trackers.
//! - [`Monitor`] drives both and hands each frame to a [`Frontend`].

pub mod buffer;
pub mod config;
pub mod error;
pub mod monitor;
pub mod sensor;
pub mod series;
pub mod units;
pub mod window;

pub use buffer::{AlignmentPolicy, DEFAULT_FLUSH_THRESHOLD, FlushReport, SampleBuffer};
pub use config::{MonitorConfig, MonitorOptions, normalize_interval, validate_output_path};
pub use error::{Error, Result};
pub use monitor::{
    CycleReport, Decision, Frontend, Interrupt, LoopState, Monitor, RunSummary, View,
};
pub use sensor::{CpuDriver, GpuVendor, SensorSource, SystemSensors};
pub use series::{Series, parse_module_list};
pub use units::TemperatureUnit;
pub use window::{DEFAULT_MAX_WINDOW, SeriesFrame, Tracker, WindowAggregator};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
