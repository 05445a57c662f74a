//! Run configuration.
//!
//! Raw command-line values ([`MonitorOptions`]) are resolved once into an
//! immutable [`MonitorConfig`]. Resolution checks the output path before it
//! touches any sensor, so a bad destination never costs a hardware probe.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::buffer::{AlignmentPolicy, DEFAULT_FLUSH_THRESHOLD};
use crate::error::{Error, Result};
use crate::sensor::SensorSource;
use crate::series::{Series, parse_module_list};
use crate::units::TemperatureUnit;
use crate::window::DEFAULT_MAX_WINDOW;

/// Required extension for the output file.
pub const OUTPUT_EXTENSION: &str = ".csv";

/// Options as the user supplied them.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Polling cadence in seconds; the sign is ignored.
    pub interval_secs: i64,
    pub output: Option<String>,
    pub fahrenheit: bool,
    /// Comma-separated module names (`cpu,gpu`).
    pub modules: String,
    pub track_peak: bool,
    pub track_current: bool,
    pub max_window: usize,
    pub flush_threshold: usize,
    pub alignment: AlignmentPolicy,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            output: None,
            fahrenheit: false,
            modules: "cpu,gpu".to_string(),
            track_peak: false,
            track_current: false,
            max_window: DEFAULT_MAX_WINDOW,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            alignment: AlignmentPolicy::Truncate,
        }
    }
}

/// Fully resolved configuration, fixed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub output: Option<PathBuf>,
    pub unit: TemperatureUnit,
    /// Active series, sorted by name.
    pub series: Vec<Series>,
    pub track_peak: bool,
    pub track_current: bool,
    pub max_window: usize,
    pub flush_threshold: usize,
    pub alignment: AlignmentPolicy,
}

impl MonitorConfig {
    /// Validate `options` and narrow the module list to what `sensors` offers.
    pub fn resolve(options: &MonitorOptions, sensors: &dyn SensorSource) -> Result<Self> {
        let output = options
            .output
            .as_deref()
            .map(validate_output_path)
            .transpose()?;

        let requested = parse_module_list(&options.modules);
        let available = sensors.available();
        let series: Vec<Series> = requested
            .iter()
            .copied()
            .filter(|s| available.contains(s))
            .collect();

        for s in requested.iter().filter(|s| !series.contains(s)) {
            log::warn!("{}", Error::SensorUnavailable { series: *s });
        }
        if series.is_empty() {
            return Err(Error::Config(format!(
                "none of the requested modules ({}) has a supported sensor on this machine",
                options.modules
            )));
        }

        Ok(Self {
            interval: normalize_interval(options.interval_secs),
            output,
            unit: TemperatureUnit::from_flag(options.fahrenheit),
            series,
            track_peak: options.track_peak,
            track_current: options.track_current,
            max_window: options.max_window,
            flush_threshold: options.flush_threshold,
            alignment: options.alignment,
        })
    }
}

/// Accept only paths ending in `.csv`.
pub fn validate_output_path(path: &str) -> Result<PathBuf> {
    if !path.ends_with(OUTPUT_EXTENSION) {
        return Err(Error::Config(format!(
            "output file '{path}' needs to be a {OUTPUT_EXTENSION} file"
        )));
    }
    Ok(Path::new(path).to_path_buf())
}

/// Negative intervals are treated as their absolute value.
pub fn normalize_interval(secs: i64) -> Duration {
    Duration::from_secs(secs.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSensors {
        available: Vec<Series>,
        calls: Cell<usize>,
    }

    impl SensorSource for CountingSensors {
        fn available(&self) -> Vec<Series> {
            self.calls.set(self.calls.get() + 1);
            self.available.clone()
        }

        fn read(&self, _series: Series) -> Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(0.0)
        }
    }

    fn sensors(available: &[Series]) -> CountingSensors {
        CountingSensors {
            available: available.to_vec(),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn non_csv_output_rejected_before_sensor_io() {
        let s = sensors(&Series::ALL);
        let options = MonitorOptions {
            output: Some("stats.txt".into()),
            ..Default::default()
        };
        let err = MonitorConfig::resolve(&options, &s).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(s.calls.get(), 0);
    }

    #[test]
    fn csv_output_accepted() {
        let s = sensors(&Series::ALL);
        let options = MonitorOptions {
            output: Some("runs/stats.csv".into()),
            ..Default::default()
        };
        let config = MonitorConfig::resolve(&options, &s).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("runs/stats.csv")));
    }

    #[test]
    fn negative_interval_is_normalized() {
        assert_eq!(normalize_interval(-3), Duration::from_secs(3));
        assert_eq!(normalize_interval(0), Duration::ZERO);
        assert_eq!(normalize_interval(2), Duration::from_secs(2));
        assert_eq!(normalize_interval(i64::MIN), Duration::from_secs(1 << 63));
    }

    #[test]
    fn modules_filtered_against_available() {
        let s = sensors(&[Series::CpuTemp]);
        let options = MonitorOptions {
            modules: "gpu,cpu,fan".into(),
            ..Default::default()
        };
        let config = MonitorConfig::resolve(&options, &s).unwrap();
        assert_eq!(config.series, vec![Series::CpuTemp]);
    }

    #[test]
    fn no_usable_series_is_a_config_error() {
        let s = sensors(&[]);
        let err = MonitorConfig::resolve(&MonitorOptions::default(), &s).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_resolve() {
        let s = sensors(&Series::ALL);
        let options = MonitorOptions {
            fahrenheit: true,
            ..Default::default()
        };
        let config = MonitorConfig::resolve(&options, &s).unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.output, None);
        assert_eq!(config.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.series, vec![Series::CpuTemp, Series::GpuTemp]);
        assert_eq!(config.max_window, 20);
        assert_eq!(config.flush_threshold, 50);
    }
}
