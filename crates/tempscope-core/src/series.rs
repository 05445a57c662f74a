//! Telemetry channels and their stable names.
//!
//! A [`Series`] is identified by its name (`cpu_temp`, `gpu_temp`). Ordering
//! follows the name so that maps keyed by `Series` iterate in the same column
//! order the CSV writer uses.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A named temperature channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    CpuTemp,
    GpuTemp,
}

impl Series {
    /// Every series the tool knows how to poll.
    pub const ALL: [Series; 2] = [Series::CpuTemp, Series::GpuTemp];

    /// Stable column / map key name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CpuTemp => "cpu_temp",
            Self::GpuTemp => "gpu_temp",
        }
    }

    /// Short module name accepted by `--modules`.
    pub fn module(self) -> &'static str {
        match self {
            Self::CpuTemp => "cpu",
            Self::GpuTemp => "gpu",
        }
    }

    /// Chart legend label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CpuTemp => "CPU",
            Self::GpuTemp => "GPU",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Ord for Series {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl PartialOrd for Series {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Series {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" | "cpu_temp" => Ok(Self::CpuTemp),
            "gpu" | "gpu_temp" => Ok(Self::GpuTemp),
            other => Err(format!("unknown module '{other}'")),
        }
    }
}

/// Parse a comma-separated module list, dropping unknown names and duplicates.
///
/// The result is sorted by series name.
pub fn parse_module_list(list: &str) -> Vec<Series> {
    let mut out: Vec<Series> = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| match s.parse::<Series>() {
            Ok(series) => Some(series),
            Err(e) => {
                log::debug!("ignoring {e}");
                None
            }
        })
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_names() {
        let mut v = vec![Series::GpuTemp, Series::CpuTemp];
        v.sort();
        assert_eq!(v, vec![Series::CpuTemp, Series::GpuTemp]);
        assert!(Series::CpuTemp.name() < Series::GpuTemp.name());
    }

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("cpu".parse::<Series>().unwrap(), Series::CpuTemp);
        assert_eq!(" GPU_temp ".parse::<Series>().unwrap(), Series::GpuTemp);
        assert!("fan".parse::<Series>().is_err());
    }

    #[test]
    fn module_list_filters_unknown_and_duplicates() {
        assert_eq!(
            parse_module_list("gpu,fan,cpu,cpu_temp,"),
            vec![Series::CpuTemp, Series::GpuTemp]
        );
        assert!(parse_module_list("disk,,net").is_empty());
    }

    #[test]
    fn display_is_column_name() {
        assert_eq!(Series::CpuTemp.to_string(), "cpu_temp");
        assert_eq!(Series::GpuTemp.to_string(), "gpu_temp");
    }
}
