//! Temperature units.

use std::fmt;

use serde::Serialize;

/// Unit applied uniformly to every series for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_flag(fahrenheit: bool) -> Self {
        if fahrenheit {
            Self::Fahrenheit
        } else {
            Self::Celsius
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius => write!(f, "celsius"),
            Self::Fahrenheit => write!(f, "fahrenheit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_is_identity() {
        assert_eq!(TemperatureUnit::Celsius.convert(42.5), 42.5);
    }

    #[test]
    fn fahrenheit_conversion() {
        let f = TemperatureUnit::Fahrenheit;
        assert_eq!(f.convert(0.0), 32.0);
        assert_eq!(f.convert(100.0), 212.0);
        assert_eq!(f.convert(-40.0), -40.0);
    }

    #[test]
    fn flag_selects_unit() {
        assert_eq!(TemperatureUnit::from_flag(true), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::from_flag(false), TemperatureUnit::Celsius);
    }
}
