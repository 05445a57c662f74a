//! Error taxonomy shared by the sampling pipeline and its frontends.

use std::path::PathBuf;

use thiserror::Error;

use crate::series::Series;

/// Everything that can go wrong between argument resolution and shutdown.
///
/// Only [`Error::Config`], [`Error::MisalignedSeries`] and [`Error::Terminal`]
/// end a run. Sensor and persistence errors are contained to the cycle that
/// produced them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{series}: no supported sensor driver detected")]
    SensorUnavailable { series: Series },

    #[error("{series}: read failed: {reason}")]
    TransientRead { series: Series, reason: String },

    #[error("could not write buffered samples to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("series are out of step ({counts}); refusing to write misaligned rows")]
    MisalignedSeries { counts: String },

    #[error("{0} is not registered for display")]
    UnknownSeries(Series),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl Error {
    /// Whether the error should stop the monitor loop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MisalignedSeries { .. } | Self::Terminal(_)
        )
    }

    /// Process exit code for an error that reached `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_two() {
        let e = Error::Config("bad".into());
        assert_eq!(e.exit_code(), 2);
        assert!(e.is_fatal());
    }

    #[test]
    fn cycle_errors_are_not_fatal() {
        let transient = Error::TransientRead {
            series: Series::GpuTemp,
            reason: "timeout".into(),
        };
        assert!(!transient.is_fatal());
        assert_eq!(transient.exit_code(), 1);

        let persistence = Error::Persistence {
            path: PathBuf::from("out.csv"),
            source: std::io::Error::other("disk full"),
        };
        assert!(!persistence.is_fatal());
        assert!(persistence.to_string().contains("out.csv"));
    }

    #[test]
    fn display_names_the_series() {
        let e = Error::SensorUnavailable {
            series: Series::CpuTemp,
        };
        assert_eq!(e.to_string(), "cpu_temp: no supported sensor driver detected");
    }
}
