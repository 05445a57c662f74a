//! Temperature sensor probing and reads.
//!
//! Hardware detection runs once at startup ([`SystemSensors::detect`]) and the
//! result is kept for the lifetime of the process. CPU temperatures come from
//! the Linux hwmon sysfs tree (`k10temp` or `coretemp` drivers); GPU
//! temperatures come from a single `nvidia-smi` query.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::series::Series;

/// Root of the hwmon class directory on Linux.
pub const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Anything that can produce one Celsius reading per series.
pub trait SensorSource {
    /// Series this source can read on the current machine.
    fn available(&self) -> Vec<Series>;

    /// Read the current temperature of `series` in degrees Celsius.
    fn read(&self, series: Series) -> Result<f64>;
}

// ---------------------------------------------------------------------------
// CPU (hwmon)
// ---------------------------------------------------------------------------

/// CPU temperature drivers we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuDriver {
    /// AMD family 17h+ (`Tctl`).
    K10temp,
    /// Intel package / core sensors.
    Coretemp,
}

impl CpuDriver {
    pub const SUPPORTED: [CpuDriver; 2] = [CpuDriver::K10temp, CpuDriver::Coretemp];

    /// Name the driver reports in `hwmonN/name`.
    pub fn hwmon_name(self) -> &'static str {
        match self {
            Self::K10temp => "k10temp",
            Self::Coretemp => "coretemp",
        }
    }

    fn from_hwmon_name(name: &str) -> Option<Self> {
        Self::SUPPORTED
            .into_iter()
            .find(|d| d.hwmon_name() == name.trim())
    }
}

/// A detected hwmon chip belonging to a supported CPU driver.
#[derive(Debug, Clone)]
pub struct HwmonSensor {
    pub driver: CpuDriver,
    pub dir: PathBuf,
}

impl HwmonSensor {
    /// Scan `root` for the first chip driven by a supported CPU driver.
    pub fn find(root: &Path) -> Option<Self> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(root)
            .ok()?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        dirs.sort();

        dirs.into_iter().find_map(|dir| {
            let name = fs::read_to_string(dir.join("name")).ok()?;
            let driver = CpuDriver::from_hwmon_name(&name)?;
            Some(Self { driver, dir })
        })
    }

    /// First temperature input of the chip, rounded to one decimal.
    pub fn read_celsius(&self) -> std::io::Result<f64> {
        let input = first_temp_input(&self.dir).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no temp*_input under {}", self.dir.display()),
            )
        })?;
        let raw = fs::read_to_string(&input)?;
        let millis: f64 = raw.trim().parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unparseable reading '{}' in {}", raw.trim(), input.display()),
            )
        })?;
        Ok((millis / 100.0).round() / 10.0)
    }
}

/// Lowest-numbered `tempN_input` file in a hwmon chip directory.
fn first_temp_input(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let index: u32 = name.strip_prefix("temp")?.strip_suffix("_input")?.parse().ok()?;
            Some((index, e.path()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, path)| path)
}

// ---------------------------------------------------------------------------
// GPU (vendor tool)
// ---------------------------------------------------------------------------

/// GPU vendors with a supported query tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
}

impl GpuVendor {
    /// Detect a vendor by running its query tool once.
    pub fn detect() -> Option<Self> {
        command_succeeds("nvidia-smi", &[]).then_some(Self::Nvidia)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nvidia => "nvidia",
        }
    }

    fn read_celsius(self) -> std::result::Result<f64, String> {
        match self {
            Self::Nvidia => {
                let stdout = run_command(
                    "nvidia-smi",
                    &["--query-gpu=temperature.gpu", "--format=csv,noheader"],
                )?;
                parse_nvidia_temp(&stdout)
                    .ok_or_else(|| format!("could not parse nvidia-smi output '{}'", stdout.trim()))
            }
        }
    }
}

/// Parse `nvidia-smi --query-gpu=temperature.gpu` output. With several GPUs
/// the first line wins.
pub fn parse_nvidia_temp(stdout: &str) -> Option<f64> {
    stdout.lines().next()?.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Shared command utilities
// ---------------------------------------------------------------------------

fn command_succeeds(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a command and return its stdout, or a description of why it failed.
fn run_command(program: &str, args: &[&str]) -> std::result::Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{program}: {e}"))?;
    if !output.status.success() {
        return Err(format!("{program} exited with {}", output.status));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// SystemSensors
// ---------------------------------------------------------------------------

/// Hardware detected at startup. Immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct SystemSensors {
    cpu: Option<HwmonSensor>,
    gpu: Option<GpuVendor>,
}

impl SystemSensors {
    /// Probe the running machine.
    pub fn detect() -> Self {
        let sensors = Self {
            cpu: HwmonSensor::find(Path::new(HWMON_ROOT)),
            gpu: GpuVendor::detect(),
        };
        log::info!("hardware detected: {}", sensors.describe());
        sensors
    }

    /// Probe only the hwmon tree under `root`; no GPU.
    pub fn from_hwmon_root(root: &Path) -> Self {
        Self {
            cpu: HwmonSensor::find(root),
            gpu: None,
        }
    }

    pub fn cpu_driver(&self) -> Option<CpuDriver> {
        self.cpu.as_ref().map(|c| c.driver)
    }

    pub fn gpu_vendor(&self) -> Option<GpuVendor> {
        self.gpu
    }

    /// One-line summary, e.g. `CPU: k10temp, GPU: nvidia`.
    pub fn describe(&self) -> String {
        format!(
            "CPU: {}, GPU: {}",
            self.cpu_driver().map_or("unsupported", CpuDriver::hwmon_name),
            self.gpu.map_or("unsupported", GpuVendor::name),
        )
    }
}

impl SensorSource for SystemSensors {
    fn available(&self) -> Vec<Series> {
        let mut out = Vec::new();
        if self.cpu.is_some() {
            out.push(Series::CpuTemp);
        }
        if self.gpu.is_some() {
            out.push(Series::GpuTemp);
        }
        out
    }

    fn read(&self, series: Series) -> Result<f64> {
        match series {
            Series::CpuTemp => {
                let cpu = self
                    .cpu
                    .as_ref()
                    .ok_or(Error::SensorUnavailable { series })?;
                cpu.read_celsius().map_err(|e| Error::TransientRead {
                    series,
                    reason: e.to_string(),
                })
            }
            Series::GpuTemp => {
                let gpu = self.gpu.ok_or(Error::SensorUnavailable { series })?;
                gpu.read_celsius()
                    .map_err(|reason| Error::TransientRead { series, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip(root: &Path, dir: &str, name: &str, inputs: &[(&str, &str)]) {
        let d = root.join(dir);
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join("name"), format!("{name}\n")).unwrap();
        for (file, value) in inputs {
            fs::write(d.join(file), format!("{value}\n")).unwrap();
        }
    }

    #[test]
    fn finds_supported_cpu_driver() {
        let tmp = tempfile::tempdir().unwrap();
        chip(tmp.path(), "hwmon0", "acpitz", &[("temp1_input", "30000")]);
        chip(tmp.path(), "hwmon1", "k10temp", &[("temp1_input", "45312")]);

        let sensors = SystemSensors::from_hwmon_root(tmp.path());
        assert_eq!(sensors.cpu_driver(), Some(CpuDriver::K10temp));
        assert_eq!(sensors.available(), vec![Series::CpuTemp]);
        assert_eq!(sensors.read(Series::CpuTemp).unwrap(), 45.3);
    }

    #[test]
    fn reads_lowest_numbered_input() {
        let tmp = tempfile::tempdir().unwrap();
        chip(
            tmp.path(),
            "hwmon3",
            "coretemp",
            &[("temp2_input", "61000"), ("temp10_input", "70000"), ("temp1_input", "58000")],
        );
        let sensors = SystemSensors::from_hwmon_root(tmp.path());
        assert_eq!(sensors.cpu_driver(), Some(CpuDriver::Coretemp));
        assert_eq!(sensors.read(Series::CpuTemp).unwrap(), 58.0);
    }

    #[test]
    fn zero_degree_reading_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        chip(tmp.path(), "hwmon0", "coretemp", &[("temp1_input", "0")]);
        let sensors = SystemSensors::from_hwmon_root(tmp.path());
        assert_eq!(sensors.read(Series::CpuTemp).unwrap(), 0.0);
    }

    #[test]
    fn garbage_reading_is_transient() {
        let tmp = tempfile::tempdir().unwrap();
        chip(tmp.path(), "hwmon0", "k10temp", &[("temp1_input", "n/a")]);
        let sensors = SystemSensors::from_hwmon_root(tmp.path());
        assert!(matches!(
            sensors.read(Series::CpuTemp),
            Err(Error::TransientRead { series: Series::CpuTemp, .. })
        ));
    }

    #[test]
    fn missing_hardware_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        chip(tmp.path(), "hwmon0", "nvme", &[("temp1_input", "40000")]);
        let sensors = SystemSensors::from_hwmon_root(tmp.path());
        assert!(sensors.available().is_empty());
        assert!(matches!(
            sensors.read(Series::CpuTemp),
            Err(Error::SensorUnavailable { .. })
        ));
        assert!(matches!(
            sensors.read(Series::GpuTemp),
            Err(Error::SensorUnavailable { .. })
        ));
        assert_eq!(sensors.describe(), "CPU: unsupported, GPU: unsupported");
    }

    #[test]
    fn missing_root_detects_nothing() {
        let sensors = SystemSensors::from_hwmon_root(Path::new("/nonexistent/hwmon"));
        assert!(sensors.cpu_driver().is_none());
    }

    #[test]
    fn parses_nvidia_output() {
        assert_eq!(parse_nvidia_temp("54\n"), Some(54.0));
        assert_eq!(parse_nvidia_temp("61\n48\n"), Some(61.0));
        assert_eq!(parse_nvidia_temp("[N/A]\n"), None);
        assert_eq!(parse_nvidia_temp(""), None);
    }
}
