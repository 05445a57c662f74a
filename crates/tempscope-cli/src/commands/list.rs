//! `--list-modules` and `--list-themes`.

use tempscope_core::{SensorSource, Series, SystemSensors};

use crate::tui::theme::Theme;

pub fn modules() -> i32 {
    let sensors = SystemSensors::detect();
    let available = sensors.available();

    println!("{}", sensors.describe());
    println!();
    println!("{:<8} {:<10} STATUS", "MODULE", "COLUMN");
    for series in Series::ALL {
        let status = if available.contains(&series) {
            "available"
        } else {
            "unsupported"
        };
        println!("{:<8} {:<10} {status}", series.module(), series.name());
    }
    0
}

pub fn themes() -> i32 {
    for theme in Theme::ALL {
        let marker = if theme == Theme::default() { " (default)" } else { "" };
        println!("{theme}{marker}");
    }
    0
}
